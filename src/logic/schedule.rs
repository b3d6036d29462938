//! Regular round: round-robin generation per group and saving the schedule.

use crate::models::{Group, LeagueFixture, Match, Stage, StageLabel, ValidationError};
use uuid::Uuid;

/// Upper bound on regular-round repetitions.
pub const MAX_ROUNDS: u32 = 20;

/// Rounds from the operator's free-text input: `max(1, floor(x))` capped at
/// `MAX_ROUNDS`, and 1 for anything that is not a number.
pub fn parse_round_count(input: &str) -> u32 {
    match input.trim().parse::<f64>() {
        Ok(x) if x.is_finite() && x >= 1.0 => x.floor().min(MAX_ROUNDS as f64) as u32,
        _ => 1,
    }
}

/// Generate every regular-round match for `groups`.
///
/// For each group, each round `r` pairs every `(i, j)` with `i < j` once. Even rounds
/// put `team[i]` at home, odd rounds swap home and away. Groups with fewer than two
/// teams produce nothing. Output order: groups as given, rounds ascending, pairs in
/// `(i, j)` order.
///
/// The result is a proposal with empty date, time and location. Match ids are derived
/// from the group, round and pair, so the same input always yields the same list.
pub fn generate_regular_round(groups: &[Group], total_rounds: u32) -> Vec<Match> {
    let total_rounds = total_rounds.clamp(1, MAX_ROUNDS);
    let mut matches = Vec::new();

    for group in groups {
        let teams = &group.teams;
        let n = teams.len();
        if n < 2 {
            log::debug!("Group {} has {} team(s), skipping", group.name, n);
            continue;
        }
        for round in 0..total_rounds {
            let label = format!("{} - Round {}", group.name, round + 1);
            for i in 0..n {
                for j in (i + 1)..n {
                    let (home, away) = if round % 2 == 0 {
                        (teams[i], teams[j])
                    } else {
                        (teams[j], teams[i])
                    };
                    let id = Uuid::new_v5(&group.id, format!("{round}:{i}:{j}").as_bytes());
                    matches.push(Match::pairing(
                        id,
                        home,
                        away,
                        StageLabel::RegularRound,
                        label.clone(),
                    ));
                }
            }
        }
    }

    log::debug!(
        "Generated {} regular round matches for {} group(s), {} round(s)",
        matches.len(),
        groups.len(),
        total_rounds
    );
    matches
}

/// Reject the batch if it is empty or any match is missing date, time or location.
pub fn validate_schedule(matches: &[Match]) -> Result<(), ValidationError> {
    if matches.is_empty() {
        return Err(ValidationError::NoMatches);
    }
    if let Some(m) = matches.iter().find(|m| m.team1 == m.team2) {
        return Err(ValidationError::SameTeam(m.team1));
    }
    let incomplete: Vec<String> = matches
        .iter()
        .enumerate()
        .filter_map(|(i, m)| {
            let missing = m.details.missing_fields();
            (!missing.is_empty()).then(|| {
                format!("Match {} ({}): missing {}", i + 1, m.label, missing.join(", "))
            })
        })
        .collect();
    if !incomplete.is_empty() {
        return Err(ValidationError::IncompleteMatches(incomplete));
    }
    Ok(())
}

/// Every match must be an unplayed regular-round pairing of two teams from the same
/// group of `fixture`.
fn check_pairings(fixture: &LeagueFixture, matches: &[Match]) -> Result<(), ValidationError> {
    for m in matches {
        if m.stage_label != StageLabel::RegularRound {
            return Err(ValidationError::WrongStageLabel {
                expected: StageLabel::RegularRound,
                found: m.stage_label,
            });
        }
        if m.winner.is_some() {
            return Err(ValidationError::ResultAlreadyRecorded(m.id));
        }
        if !fixture
            .groups
            .iter()
            .any(|g| g.contains(m.team1) && g.contains(m.team2))
        {
            return Err(ValidationError::TeamsNotInSameGroup {
                team1: m.team1,
                team2: m.team2,
            });
        }
    }
    Ok(())
}

/// Store the completed regular-round schedule. Saving happens once.
pub fn save_regular_round(
    fixture: &mut LeagueFixture,
    matches: Vec<Match>,
) -> Result<(), ValidationError> {
    fixture.require_stage(Stage::RegularRound)?;
    if !fixture.regular_round_matches.is_empty() {
        return Err(ValidationError::ScheduleAlreadySaved);
    }
    validate_schedule(&matches)?;
    check_pairings(fixture, &matches)?;
    fixture.regular_round_matches = matches;
    Ok(())
}
