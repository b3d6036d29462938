//! Team references and registration entries.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a team (used in groups, matches and lookups).
pub type TeamId = Uuid;

/// A team as referenced from a league: id plus display name.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct TeamRef {
    pub id: TeamId,
    pub name: String,
}

impl TeamRef {
    /// Create a team reference with a fresh id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Registration status of a team in the league.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApprovalStatus {
    Approved,
    #[default]
    NotApproved,
}

/// One row of the league roster. A team is in exactly one of the approved
/// and not-approved sets because the status is a single field.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamEntry {
    pub team: TeamRef,
    #[serde(default)]
    pub status: ApprovalStatus,
}

impl TeamEntry {
    /// Newly registered teams start unapproved.
    pub fn registered(team: TeamRef) -> Self {
        Self {
            team,
            status: ApprovalStatus::NotApproved,
        }
    }

    pub fn id(&self) -> TeamId {
        self.team.id
    }

    pub fn is_approved(&self) -> bool {
        self.status == ApprovalStatus::Approved
    }
}
