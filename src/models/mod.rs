//! Data structures for a league fixture: teams, groups, matches, stage and wire types.

mod error;
mod fixture;
mod game;
mod group;
mod snapshot;
mod team;

pub use error::{FixtureError, RemoteError, ValidationError};
pub use fixture::{FixtureId, LeagueFixture, LeagueId, Stage};
pub use game::{Match, MatchDetails, MatchId, MatchTime, StageLabel};
pub use group::{Group, GroupId};
pub use snapshot::{
    CreatedGroups, FinalsStarted, FixturePatch, FixtureSnapshot, NumberedMatches,
    QuarterFinalsStarted, SemiFinalsStarted, StageFlags,
};
pub use team::{ApprovalStatus, TeamEntry, TeamId, TeamRef};
