//! League administration: library with the fixture model, stage rules, bracket
//! assignment and the backend client.

pub mod backend;
pub mod config;
pub mod logic;
pub mod models;
pub mod session;

pub use backend::{Backend, FixtureBackend, HttpBackend, MemoryBackend};
pub use config::{AppConfig, BackendConfig};
pub use logic::{
    generate_regular_round, parse_round_count, BracketSlotAssigner, OpenBracket,
    QuarterFinalAssigner, SemiFinalAssigner, StageView,
};
pub use models::{
    ApprovalStatus, FixtureError, FixtureSnapshot, Group, GroupId, LeagueFixture, LeagueId, Match,
    MatchDetails, MatchId, MatchTime, RemoteError, Stage, StageLabel, TeamEntry, TeamId, TeamRef,
    ValidationError,
};
pub use session::LeagueSession;
