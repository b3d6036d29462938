//! LeagueFixture and Stage.

use crate::models::error::ValidationError;
use crate::models::game::Match;
use crate::models::group::{Group, GroupId};
use crate::models::team::{TeamEntry, TeamId, TeamRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a league.
pub type LeagueId = Uuid;

/// Unique identifier for the backend fixture record of a league.
pub type FixtureId = Uuid;

/// Current phase of the league. Stages only move forward.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "name")]
pub enum Stage {
    /// Approving registered teams.
    #[default]
    Registration,
    /// Regular rounds started; defining groups.
    GroupCreation,
    /// Groups exist; putting approved teams into them.
    TeamAssignment,
    /// Every team is in a group; scheduling the regular round.
    RegularRound,
    /// Assigning and playing the four quarter-final matches.
    QuarterFinals,
    /// Two semi-final matches started.
    SemiFinals,
    /// Final match started.
    Finals,
    /// Final result recorded.
    Completed { winner: TeamId },
}

impl Stage {
    /// Position of the stage pointer: 0 (registration) to 6 (finals). A completed
    /// league stays at 6.
    pub fn index(&self) -> u8 {
        match self {
            Stage::Registration => 0,
            Stage::GroupCreation => 1,
            Stage::TeamAssignment => 2,
            Stage::RegularRound => 3,
            Stage::QuarterFinals => 4,
            Stage::SemiFinals => 5,
            Stage::Finals | Stage::Completed { .. } => 6,
        }
    }

    /// Stage for a pointer value. `Completed` is never produced from a bare index.
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Stage::Registration),
            1 => Some(Stage::GroupCreation),
            2 => Some(Stage::TeamAssignment),
            3 => Some(Stage::RegularRound),
            4 => Some(Stage::QuarterFinals),
            5 => Some(Stage::SemiFinals),
            6 => Some(Stage::Finals),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Stage::Completed { .. })
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Registration => "registration",
            Stage::GroupCreation => "group creation",
            Stage::TeamAssignment => "team assignment",
            Stage::RegularRound => "regular round",
            Stage::QuarterFinals => "quarter-final",
            Stage::SemiFinals => "semi-final",
            Stage::Finals => "final",
            Stage::Completed { .. } => "completed",
        };
        f.write_str(name)
    }
}

/// One league's tournament run: roster, groups, every match and the stage pointer.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LeagueFixture {
    pub league_id: LeagueId,
    pub fixture_id: FixtureId,
    pub stage: Stage,
    pub teams: Vec<TeamEntry>,
    pub groups: Vec<Group>,
    pub regular_round_matches: Vec<Match>,
    /// Exactly 4 once quarter-finals are submitted.
    pub quarter_final_matches: Vec<Match>,
    /// Exactly 2 once semi-finals are submitted.
    pub semi_final_matches: Vec<Match>,
    pub final_match: Option<Match>,
}

impl LeagueFixture {
    /// Create a fixture in Registration with no teams.
    pub fn new(league_id: LeagueId) -> Self {
        Self {
            league_id,
            fixture_id: Uuid::new_v4(),
            stage: Stage::Registration,
            teams: Vec::new(),
            groups: Vec::new(),
            regular_round_matches: Vec::new(),
            quarter_final_matches: Vec::new(),
            semi_final_matches: Vec::new(),
            final_match: None,
        }
    }

    /// Create a fixture with registered (not yet approved) teams.
    pub fn with_teams(league_id: LeagueId, teams: Vec<TeamRef>) -> Self {
        Self {
            teams: teams.into_iter().map(TeamEntry::registered).collect(),
            ..Self::new(league_id)
        }
    }

    /// The champion, once the final has been decided.
    pub fn winner(&self) -> Option<TeamId> {
        match self.stage {
            Stage::Completed { winner } => Some(winner),
            _ => None,
        }
    }

    pub fn team(&self, id: TeamId) -> Option<&TeamEntry> {
        self.teams.iter().find(|t| t.id() == id)
    }

    pub fn team_mut(&mut self, id: TeamId) -> Option<&mut TeamEntry> {
        self.teams.iter_mut().find(|t| t.id() == id)
    }

    /// Approved teams in roster order.
    pub fn approved_teams(&self) -> impl Iterator<Item = &TeamRef> {
        self.teams.iter().filter(|t| t.is_approved()).map(|t| &t.team)
    }

    pub fn approved_count(&self) -> usize {
        self.teams.iter().filter(|t| t.is_approved()).count()
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.id == id)
    }

    /// Fails unless the league is currently in `expected`.
    pub fn require_stage(&self, expected: Stage) -> Result<(), ValidationError> {
        if self.stage.is_completed() {
            return Err(ValidationError::LeagueCompleted);
        }
        if self.stage != expected {
            return Err(ValidationError::WrongStage {
                expected,
                actual: self.stage,
            });
        }
        Ok(())
    }
}
