//! Errors that can occur while driving a league through its stages.

use crate::models::fixture::Stage;
use crate::models::game::{MatchId, StageLabel};
use crate::models::group::GroupId;
use crate::models::team::TeamId;
use thiserror::Error;

/// Local, pre-network rejection. The operation is aborted before any backend call.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum ValidationError {
    /// Stage pointer may only move to the next stage.
    #[error("Cannot move from stage {current} to stage {requested}")]
    StageOrder { current: u8, requested: u8 },
    /// League is not in the stage this action belongs to.
    #[error("This action needs the {expected} stage (league is in {actual})")]
    WrongStage { expected: Stage, actual: Stage },
    #[error("The league is completed")]
    LeagueCompleted,
    /// Approval is frozen once regular rounds have started.
    #[error("Team approval is frozen once regular rounds have started")]
    ApprovalFrozen,
    #[error("Team {0} is not registered in this league")]
    TeamNotFound(TeamId),
    #[error("Team {0} is not approved")]
    TeamNotApproved(TeamId),
    #[error("Need at least {required} approved teams (have {approved})")]
    NotEnoughApprovedTeams { required: usize, approved: usize },
    #[error("At least one group is required")]
    NoGroups,
    #[error("Expected {expected} group names, got {entered}")]
    GroupCountMismatch { expected: usize, entered: usize },
    #[error("Cannot create {groups} groups with only {approved} approved teams")]
    TooManyGroups { groups: usize, approved: usize },
    #[error("Group names cannot be empty")]
    EmptyGroupName,
    #[error("Group name \"{0}\" is used more than once")]
    DuplicateGroupName(String),
    #[error("Group {0} not found")]
    GroupNotFound(GroupId),
    #[error("Team {0} is already in a group")]
    TeamAlreadyInGroup(TeamId),
    #[error("Team {team} is not in group {group}")]
    TeamNotInGroup { team: TeamId, group: GroupId },
    /// A form field (group, team, slot) was left unselected.
    #[error("Select a {0}")]
    MissingSelection(&'static str),
    #[error("{unassigned} teams are not in a group and {empty_groups} groups are empty")]
    AssignmentIncomplete { unassigned: usize, empty_groups: usize },
    #[error("There are no matches to save")]
    NoMatches,
    #[error("Regular round matches are already saved")]
    ScheduleAlreadySaved,
    #[error("Regular round matches have not been saved")]
    ScheduleNotSaved,
    /// One entry per incomplete match, e.g. "Match 3: missing date, location".
    #[error("Incomplete matches: {}", .0.join("; "))]
    IncompleteMatches(Vec<String>),
    #[error("Match {0} is already full")]
    SlotFull(usize),
    #[error("Match {0} does not exist")]
    SlotNotFound(usize),
    #[error("No team at position {occupant} in match {slot}")]
    OccupantNotFound { slot: usize, occupant: usize },
    #[error("Team {0} is already assigned to a match")]
    AlreadyAssigned(TeamId),
    #[error("Team {0} cannot be picked for this round")]
    NotACandidate(TeamId),
    #[error("{0} results are not yet calculated")]
    ResultsPending(StageLabel),
    #[error("{0} matches are already scheduled")]
    AlreadyScheduled(StageLabel),
    #[error("Match {0} not found")]
    MatchNotFound(MatchId),
    #[error("Expected a {expected} match, got {found}")]
    WrongStageLabel { expected: StageLabel, found: StageLabel },
    #[error("Teams {team1} and {team2} are not in the same group")]
    TeamsNotInSameGroup { team1: TeamId, team2: TeamId },
    /// Results only come from the scoring service, once per match.
    #[error("Match {0} already has a result")]
    ResultAlreadyRecorded(MatchId),
    #[error("{0} results can no longer change")]
    RoundClosed(StageLabel),
    #[error("A team cannot play itself ({0})")]
    SameTeam(TeamId),
    #[error("Team {team} did not play in {label}")]
    NotAParticipant { team: TeamId, label: String },
}

/// The backend failed or rejected the request.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Backend unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Backend sent an unreadable response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("League {0} not found")]
    LeagueNotFound(uuid::Uuid),
    #[error("Backend API key is not a valid header value")]
    InvalidApiKey,
}

/// Any failure of a league command. Every variant is shown to the operator as a
/// single message; none is fatal.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl FixtureError {
    pub fn is_validation(&self) -> bool {
        matches!(self, FixtureError::Validation(_))
    }

    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            FixtureError::Validation(e) => Some(e),
            FixtureError::Remote(_) => None,
        }
    }
}
