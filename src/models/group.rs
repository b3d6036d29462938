//! Named group of teams for the regular round.

use crate::models::team::TeamId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a group.
pub type GroupId = Uuid;

/// A group: name plus its teams in assignment order. Team ids are unique
/// across all groups of a league.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    #[serde(default)]
    pub teams: Vec<TeamId>,
}

impl Group {
    /// Create an empty group with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            teams: Vec::new(),
        }
    }

    pub fn contains(&self, team: TeamId) -> bool {
        self.teams.contains(&team)
    }
}
