//! Registration: approving teams and starting the regular rounds.

use crate::logic::stage::advance;
use crate::models::{ApprovalStatus, LeagueFixture, Stage, TeamId, ValidationError};

/// Approved teams needed before regular rounds can start (one pairing).
pub const MIN_APPROVED_TEAMS: usize = 2;

/// Move a team into the approved set (Registration only).
pub fn approve(fixture: &mut LeagueFixture, team: TeamId) -> Result<(), ValidationError> {
    set_status(fixture, team, ApprovalStatus::Approved)
}

/// Move a team back to the not-approved set (Registration only).
pub fn unapprove(fixture: &mut LeagueFixture, team: TeamId) -> Result<(), ValidationError> {
    set_status(fixture, team, ApprovalStatus::NotApproved)
}

fn set_status(
    fixture: &mut LeagueFixture,
    team: TeamId,
    status: ApprovalStatus,
) -> Result<(), ValidationError> {
    if fixture.stage != Stage::Registration {
        return Err(ValidationError::ApprovalFrozen);
    }
    let entry = fixture
        .team_mut(team)
        .ok_or(ValidationError::TeamNotFound(team))?;
    entry.status = status;
    Ok(())
}

/// Registration -> GroupCreation. Freezes approval.
pub fn start_regular_round(fixture: &mut LeagueFixture) -> Result<(), ValidationError> {
    fixture.require_stage(Stage::Registration)?;
    let approved = fixture.approved_count();
    if approved < MIN_APPROVED_TEAMS {
        return Err(ValidationError::NotEnoughApprovedTeams {
            required: MIN_APPROVED_TEAMS,
            approved,
        });
    }
    advance(fixture, Stage::GroupCreation.index())
}
