//! Stage pointer: forward-only transitions, snapshot reconciliation and the
//! screen an operator should see for the current state.

use crate::logic::propagation::{final_pairing, quarter_final_winners};
use crate::logic::team_assignment::assignment_complete;
use crate::models::{
    FixtureSnapshot, LeagueFixture, Stage, StageFlags, StageLabel, TeamId, ValidationError,
};
use serde::Serialize;

/// Move the stage pointer to `new_index`. Only `current + 1` is accepted; anything
/// else leaves the fixture untouched.
pub fn advance(fixture: &mut LeagueFixture, new_index: u8) -> Result<(), ValidationError> {
    if fixture.stage.is_completed() {
        return Err(ValidationError::LeagueCompleted);
    }
    let current = fixture.stage.index();
    let next = match Stage::from_index(new_index) {
        Some(stage) if new_index == current + 1 => stage,
        _ => {
            return Err(ValidationError::StageOrder {
                current,
                requested: new_index,
            })
        }
    };
    log::info!(
        "League {}: stage {} -> {} ({})",
        fixture.league_id,
        current,
        new_index,
        next
    );
    fixture.stage = next;
    Ok(())
}

/// Stage from a stored pointer and its per-stage flags. When the two disagree the
/// flags win, and the mismatch is logged. A record with no flag set at all keeps its
/// pointer.
pub fn reconcile_stage(pointer: u8, flags: &StageFlags) -> Stage {
    if *flags == StageFlags::default() {
        return Stage::from_index(pointer).unwrap_or_default();
    }
    let flagged = flags.highest_entered();
    if flagged != pointer {
        log::warn!(
            "Stale fixture state: stage pointer is {} but stage flags say {}; using flags",
            pointer,
            flagged
        );
    }
    Stage::from_index(flagged).unwrap_or_default()
}

/// Build the local fixture from a backend snapshot.
pub fn fixture_from_snapshot(snapshot: FixtureSnapshot) -> LeagueFixture {
    let mut stage = reconcile_stage(snapshot.stage, &snapshot.flags);
    let decided = snapshot
        .winner
        .or_else(|| snapshot.final_match.as_ref().and_then(|m| m.winner));
    if let (Stage::Finals, Some(winner)) = (stage, decided) {
        stage = Stage::Completed { winner };
    }
    LeagueFixture {
        league_id: snapshot.league,
        fixture_id: snapshot.id,
        stage,
        teams: snapshot.teams,
        groups: snapshot.groups,
        regular_round_matches: snapshot.regular_round_matches,
        quarter_final_matches: snapshot.quarter_final_matches,
        semi_final_matches: snapshot.semi_final_matches,
        final_match: snapshot.final_match,
    }
}

/// Which screen the operator is on.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "view")]
pub enum StageView {
    Registration,
    CreateGroups,
    /// `complete` is false while teams are still unassigned or a group is empty.
    AssignTeams { complete: bool },
    GenerateSchedule,
    RegularRoundSaved,
    AssignQuarterFinals,
    /// Holding screen until every match of `stage` has a winner.
    AwaitingResults { stage: StageLabel },
    AssignSemiFinals,
    ScheduleFinal { team1: TeamId, team2: TeamId },
    Champion { winner: TeamId },
}

/// Derive the current screen from the fixture alone.
pub fn current_view(fixture: &LeagueFixture) -> StageView {
    match fixture.stage {
        Stage::Registration => StageView::Registration,
        Stage::GroupCreation => StageView::CreateGroups,
        Stage::TeamAssignment => StageView::AssignTeams {
            complete: assignment_complete(fixture),
        },
        Stage::RegularRound if fixture.regular_round_matches.is_empty() => {
            StageView::GenerateSchedule
        }
        Stage::RegularRound => StageView::RegularRoundSaved,
        Stage::QuarterFinals if fixture.quarter_final_matches.is_empty() => {
            StageView::AssignQuarterFinals
        }
        Stage::QuarterFinals => match quarter_final_winners(fixture) {
            Ok(_) => StageView::AssignSemiFinals,
            Err(_) => StageView::AwaitingResults {
                stage: StageLabel::QuarterFinal,
            },
        },
        Stage::SemiFinals => match final_pairing(fixture) {
            Ok((team1, team2)) => StageView::ScheduleFinal { team1, team2 },
            Err(_) => StageView::AwaitingResults {
                stage: StageLabel::SemiFinal,
            },
        },
        Stage::Finals => StageView::AwaitingResults {
            stage: StageLabel::Final,
        },
        Stage::Completed { winner } => StageView::Champion { winner },
    }
}
