//! Putting approved teams into groups, one group per team.

use crate::logic::stage::advance;
use crate::models::{GroupId, LeagueFixture, Stage, TeamId, ValidationError};

/// Approved teams that are not yet in any group, in roster order.
pub fn unassigned_teams(fixture: &LeagueFixture) -> Vec<TeamId> {
    fixture
        .approved_teams()
        .map(|t| t.id)
        .filter(|&id| !fixture.groups.iter().any(|g| g.contains(id)))
        .collect()
}

/// True when every group has a team and no approved team is left over.
pub fn assignment_complete(fixture: &LeagueFixture) -> bool {
    !fixture.groups.is_empty()
        && fixture.groups.iter().all(|g| !g.teams.is_empty())
        && unassigned_teams(fixture).is_empty()
}

/// Move a team from the unassigned pool into a group.
pub fn assign_team(
    fixture: &mut LeagueFixture,
    group: GroupId,
    team: TeamId,
) -> Result<(), ValidationError> {
    fixture.require_stage(Stage::TeamAssignment)?;
    let entry = fixture.team(team).ok_or(ValidationError::TeamNotFound(team))?;
    if !entry.is_approved() {
        return Err(ValidationError::TeamNotApproved(team));
    }
    if fixture.groups.iter().any(|g| g.contains(team)) {
        return Err(ValidationError::TeamAlreadyInGroup(team));
    }
    fixture
        .group_mut(group)
        .ok_or(ValidationError::GroupNotFound(group))?
        .teams
        .push(team);
    Ok(())
}

/// Take a team out of a group and return it to the unassigned pool.
pub fn unassign_team(
    fixture: &mut LeagueFixture,
    group: GroupId,
    team: TeamId,
) -> Result<(), ValidationError> {
    fixture.require_stage(Stage::TeamAssignment)?;
    let g = fixture
        .group_mut(group)
        .ok_or(ValidationError::GroupNotFound(group))?;
    let idx = g
        .teams
        .iter()
        .position(|&t| t == team)
        .ok_or(ValidationError::TeamNotInGroup { team, group })?;
    g.teams.remove(idx);
    Ok(())
}

/// TeamAssignment -> RegularRound, once the assignment is complete.
pub fn finish_team_assignment(fixture: &mut LeagueFixture) -> Result<(), ValidationError> {
    fixture.require_stage(Stage::TeamAssignment)?;
    if !assignment_complete(fixture) {
        return Err(ValidationError::AssignmentIncomplete {
            unassigned: unassigned_teams(fixture).len(),
            empty_groups: fixture.groups.iter().filter(|g| g.teams.is_empty()).count(),
        });
    }
    advance(fixture, Stage::RegularRound.index())
}
