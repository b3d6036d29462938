//! Carrying winners forward: quarter-final winners become semi-final candidates,
//! semi-final winners play the final, the final's winner is the champion.

use crate::logic::stage::advance;
use crate::models::{
    LeagueFixture, Match, MatchDetails, MatchId, Stage, StageLabel, TeamId, ValidationError,
};

/// Winners of every match, in match order, if all `expected` matches are decided.
fn decided_winners(matches: &[Match], expected: usize) -> Option<Vec<TeamId>> {
    if matches.len() != expected {
        return None;
    }
    matches.iter().map(|m| m.winner).collect()
}

/// The four quarter-final winners: the exact semi-final candidate set.
pub fn quarter_final_winners(fixture: &LeagueFixture) -> Result<Vec<TeamId>, ValidationError> {
    decided_winners(&fixture.quarter_final_matches, 4)
        .ok_or(ValidationError::ResultsPending(StageLabel::QuarterFinal))
}

/// The two semi-final winners, who meet in the final.
pub fn final_pairing(fixture: &LeagueFixture) -> Result<(TeamId, TeamId), ValidationError> {
    match decided_winners(&fixture.semi_final_matches, 2).as_deref() {
        Some(&[a, b]) => Ok((a, b)),
        _ => Err(ValidationError::ResultsPending(StageLabel::SemiFinal)),
    }
}

/// SemiFinals -> Finals with the single final match.
pub fn start_finals(
    fixture: &mut LeagueFixture,
    details: MatchDetails,
) -> Result<Match, ValidationError> {
    fixture.require_stage(Stage::SemiFinals)?;
    let (team1, team2) = final_pairing(fixture)?;
    let missing = details.missing_fields();
    if !missing.is_empty() {
        return Err(ValidationError::IncompleteMatches(vec![format!(
            "Final: missing {}",
            missing.join(", ")
        )]));
    }
    let m = Match::new(team1, team2, StageLabel::Final, details)?;
    fixture.final_match = Some(m.clone());
    advance(fixture, Stage::Finals.index())?;
    Ok(m)
}

/// Finals -> Completed once the final has a winner. Returns the champion.
pub fn complete_if_decided(fixture: &mut LeagueFixture) -> Option<TeamId> {
    if let Stage::Completed { winner } = fixture.stage {
        return Some(winner);
    }
    if fixture.stage != Stage::Finals {
        return None;
    }
    let winner = fixture.final_match.as_ref()?.winner?;
    log::info!("League {}: champion is {}", fixture.league_id, winner);
    fixture.stage = Stage::Completed { winner };
    Some(winner)
}

/// Record the result of any match of the league, then complete the league if this
/// decided the final. Knockout results are locked once the next round has started.
pub fn record_result(
    fixture: &mut LeagueFixture,
    match_id: MatchId,
    winner: TeamId,
) -> Result<(), ValidationError> {
    if fixture.stage.is_completed() {
        return Err(ValidationError::LeagueCompleted);
    }
    let current = fixture.stage.index();
    let m = fixture
        .regular_round_matches
        .iter_mut()
        .chain(fixture.quarter_final_matches.iter_mut())
        .chain(fixture.semi_final_matches.iter_mut())
        .chain(fixture.final_match.iter_mut())
        .find(|m| m.id == match_id)
        .ok_or(ValidationError::MatchNotFound(match_id))?;
    let closed_after = match m.stage_label {
        StageLabel::QuarterFinal => Some(Stage::QuarterFinals),
        StageLabel::SemiFinal => Some(Stage::SemiFinals),
        StageLabel::RegularRound | StageLabel::Final => None,
    };
    if closed_after.is_some_and(|stage| current > stage.index()) {
        return Err(ValidationError::RoundClosed(m.stage_label));
    }
    m.record_winner(winner)?;
    complete_if_decided(fixture);
    Ok(())
}
