//! Group creation: the operator names `N` groups for the approved teams.

use crate::logic::stage::advance;
use crate::models::{Group, LeagueFixture, Stage, ValidationError};

/// Check the entered names against the requested group count and return them trimmed.
///
/// Rules: at least one group, exactly `group_number` names, no more groups than
/// approved teams, no blank names, no duplicates (case-insensitive).
pub fn validate_group_names(
    fixture: &LeagueFixture,
    group_number: usize,
    names: &[String],
) -> Result<Vec<String>, ValidationError> {
    if group_number == 0 {
        return Err(ValidationError::NoGroups);
    }
    if names.len() != group_number {
        return Err(ValidationError::GroupCountMismatch {
            expected: group_number,
            entered: names.len(),
        });
    }
    let approved = fixture.approved_count();
    if group_number > approved {
        return Err(ValidationError::TooManyGroups {
            groups: group_number,
            approved,
        });
    }

    let mut trimmed: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyGroupName);
        }
        if trimmed.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            return Err(ValidationError::DuplicateGroupName(name.to_string()));
        }
        trimmed.push(name.to_string());
    }
    Ok(trimmed)
}

/// GroupCreation -> TeamAssignment. Every group starts empty.
pub fn create_groups(
    fixture: &mut LeagueFixture,
    group_number: usize,
    names: &[String],
) -> Result<(), ValidationError> {
    fixture.require_stage(Stage::GroupCreation)?;
    let names = validate_group_names(fixture, group_number, names)?;
    fixture.groups = names.into_iter().map(Group::new).collect();
    advance(fixture, Stage::TeamAssignment.index())
}
