//! The persistence backend that stores fixtures: an HTTP client for the remote
//! service and an in-process store.

mod http;
mod memory;

pub use http::HttpBackend;
pub use memory::MemoryBackend;

use crate::config::BackendConfig;
use crate::models::{
    CreatedGroups, FinalsStarted, FixtureId, FixturePatch, FixtureSnapshot, Group, LeagueId,
    Match, QuarterFinalsStarted, RemoteError, SemiFinalsStarted,
};

/// Commands and queries the league engine sends to the backend. Every call is a
/// single request/response; nothing is retried.
#[allow(async_fn_in_trait)]
pub trait FixtureBackend {
    async fn fetch_fixture(&self, league: LeagueId) -> Result<FixtureSnapshot, RemoteError>;

    /// Update stage flags, the team status array or the groups array.
    async fn patch_fixture(
        &self,
        league: LeagueId,
        patch: &FixturePatch,
    ) -> Result<FixtureSnapshot, RemoteError>;

    async fn create_groups(
        &self,
        fixture: FixtureId,
        group_names: &[String],
    ) -> Result<CreatedGroups, RemoteError>;

    async fn add_teams_to_groups(&self, groups: &[Group]) -> Result<(), RemoteError>;

    async fn save_regular_round_matches(
        &self,
        league: LeagueId,
        fixture: FixtureId,
        matches: &[Match],
    ) -> Result<(), RemoteError>;

    /// Stage flag flip only.
    async fn start_quarter_finals(&self, league: LeagueId) -> Result<(), RemoteError>;

    async fn start_quarter_final_matches(
        &self,
        league: LeagueId,
        matches: &[Match],
    ) -> Result<QuarterFinalsStarted, RemoteError>;

    async fn start_semi_final_matches(
        &self,
        league: LeagueId,
        matches: &[Match],
    ) -> Result<SemiFinalsStarted, RemoteError>;

    async fn start_finals(
        &self,
        league: LeagueId,
        final_match: &Match,
    ) -> Result<FinalsStarted, RemoteError>;
}

/// Backend picked from configuration: remote when a URL is set, otherwise in-process.
#[derive(Clone, Debug)]
pub enum Backend {
    Http(HttpBackend),
    Memory(MemoryBackend),
}

impl Backend {
    pub fn from_config(config: &BackendConfig) -> Result<Self, RemoteError> {
        match &config.url {
            Some(url) => Ok(Backend::Http(HttpBackend::new(
                url,
                &config.api_key,
                config.timeout_secs,
            )?)),
            None => Ok(Backend::Memory(MemoryBackend::new())),
        }
    }
}

impl FixtureBackend for Backend {
    async fn fetch_fixture(&self, league: LeagueId) -> Result<FixtureSnapshot, RemoteError> {
        match self {
            Backend::Http(b) => b.fetch_fixture(league).await,
            Backend::Memory(b) => b.fetch_fixture(league).await,
        }
    }

    async fn patch_fixture(
        &self,
        league: LeagueId,
        patch: &FixturePatch,
    ) -> Result<FixtureSnapshot, RemoteError> {
        match self {
            Backend::Http(b) => b.patch_fixture(league, patch).await,
            Backend::Memory(b) => b.patch_fixture(league, patch).await,
        }
    }

    async fn create_groups(
        &self,
        fixture: FixtureId,
        group_names: &[String],
    ) -> Result<CreatedGroups, RemoteError> {
        match self {
            Backend::Http(b) => b.create_groups(fixture, group_names).await,
            Backend::Memory(b) => b.create_groups(fixture, group_names).await,
        }
    }

    async fn add_teams_to_groups(&self, groups: &[Group]) -> Result<(), RemoteError> {
        match self {
            Backend::Http(b) => b.add_teams_to_groups(groups).await,
            Backend::Memory(b) => b.add_teams_to_groups(groups).await,
        }
    }

    async fn save_regular_round_matches(
        &self,
        league: LeagueId,
        fixture: FixtureId,
        matches: &[Match],
    ) -> Result<(), RemoteError> {
        match self {
            Backend::Http(b) => b.save_regular_round_matches(league, fixture, matches).await,
            Backend::Memory(b) => b.save_regular_round_matches(league, fixture, matches).await,
        }
    }

    async fn start_quarter_finals(&self, league: LeagueId) -> Result<(), RemoteError> {
        match self {
            Backend::Http(b) => b.start_quarter_finals(league).await,
            Backend::Memory(b) => b.start_quarter_finals(league).await,
        }
    }

    async fn start_quarter_final_matches(
        &self,
        league: LeagueId,
        matches: &[Match],
    ) -> Result<QuarterFinalsStarted, RemoteError> {
        match self {
            Backend::Http(b) => b.start_quarter_final_matches(league, matches).await,
            Backend::Memory(b) => b.start_quarter_final_matches(league, matches).await,
        }
    }

    async fn start_semi_final_matches(
        &self,
        league: LeagueId,
        matches: &[Match],
    ) -> Result<SemiFinalsStarted, RemoteError> {
        match self {
            Backend::Http(b) => b.start_semi_final_matches(league, matches).await,
            Backend::Memory(b) => b.start_semi_final_matches(league, matches).await,
        }
    }

    async fn start_finals(
        &self,
        league: LeagueId,
        final_match: &Match,
    ) -> Result<FinalsStarted, RemoteError> {
        match self {
            Backend::Http(b) => b.start_finals(league, final_match).await,
            Backend::Memory(b) => b.start_finals(league, final_match).await,
        }
    }
}
