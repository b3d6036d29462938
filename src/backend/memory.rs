//! In-process fixture store with the same contract as the remote service. Used when
//! no backend URL is configured and in tests.

use crate::backend::FixtureBackend;
use crate::logic::{fixture_from_snapshot, record_result};
use crate::models::{
    CreatedGroups, FinalsStarted, FixtureError, FixtureId, FixturePatch, FixtureSnapshot, Group,
    LeagueFixture, LeagueId, Match, MatchId, QuarterFinalsStarted, RemoteError,
    SemiFinalsStarted, Stage, StageFlags, TeamId, TeamRef,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Default)]
struct Store {
    fixtures: HashMap<LeagueId, FixtureSnapshot>,
    /// Message for the next request to fail with.
    fail_next: Option<String>,
}

/// Cloning shares the same store.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    store: Arc<Mutex<Store>>,
}

const CONFLICT: u16 = 409;

fn conflict(message: impl Into<String>) -> RemoteError {
    RemoteError::Rejected {
        status: CONFLICT,
        message: message.into(),
    }
}

fn set_stage(snapshot: &mut FixtureSnapshot, stage: Stage) -> Result<(), RemoteError> {
    if stage.index() < snapshot.stage {
        return Err(conflict(format!(
            "Stage cannot go back from {} to {}",
            snapshot.stage,
            stage.index()
        )));
    }
    snapshot.stage = stage.index();
    snapshot.flags = StageFlags::for_stage(stage);
    Ok(())
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>, RemoteError> {
        self.store.lock().map_err(|_| RemoteError::Rejected {
            status: 500,
            message: "store lock poisoned".to_string(),
        })
    }

    /// Run `f` against one league's snapshot, honouring a pending injected failure.
    fn with_league<T>(
        &self,
        league: LeagueId,
        f: impl FnOnce(&mut FixtureSnapshot) -> Result<T, RemoteError>,
    ) -> Result<T, RemoteError> {
        let mut store = self.lock()?;
        if let Some(message) = store.fail_next.take() {
            return Err(RemoteError::Rejected {
                status: 503,
                message,
            });
        }
        let snapshot = store
            .fixtures
            .get_mut(&league)
            .ok_or(RemoteError::LeagueNotFound(league))?;
        f(snapshot)
    }

    fn league_where(
        &self,
        pred: impl Fn(&FixtureSnapshot) -> bool,
    ) -> Result<LeagueId, RemoteError> {
        let store = self.lock()?;
        store
            .fixtures
            .values()
            .find(|s| pred(s))
            .map(|s| s.league)
            .ok_or(RemoteError::Rejected {
                status: 404,
                message: "fixture not found".to_string(),
            })
    }

    /// Register a league with the given (unapproved) teams. Returns its id.
    pub fn register_league(&self, teams: Vec<TeamRef>) -> Result<LeagueId, RemoteError> {
        let fixture = LeagueFixture::with_teams(Uuid::new_v4(), teams);
        let league = fixture.league_id;
        self.insert(FixtureSnapshot::from(&fixture))?;
        Ok(league)
    }

    /// Store a snapshot as-is, replacing any fixture of the same league.
    pub fn insert(&self, snapshot: FixtureSnapshot) -> Result<(), RemoteError> {
        self.lock()?.fixtures.insert(snapshot.league, snapshot);
        Ok(())
    }

    pub fn snapshot(&self, league: LeagueId) -> Option<FixtureSnapshot> {
        self.lock().ok()?.fixtures.get(&league).cloned()
    }

    /// Make the next request fail with a backend rejection.
    pub fn fail_next(&self, message: impl Into<String>) {
        if let Ok(mut store) = self.lock() {
            store.fail_next = Some(message.into());
        }
    }

    /// Scoring hook: record a match winner as the external scoring service would.
    pub fn record_result(
        &self,
        league: LeagueId,
        match_id: MatchId,
        winner: TeamId,
    ) -> Result<(), FixtureError> {
        let mut store = self.lock()?;
        let snapshot = store
            .fixtures
            .get_mut(&league)
            .ok_or(RemoteError::LeagueNotFound(league))?;
        let mut fixture = fixture_from_snapshot(snapshot.clone());
        record_result(&mut fixture, match_id, winner)?;
        *snapshot = FixtureSnapshot::from(&fixture);
        Ok(())
    }
}

impl FixtureBackend for MemoryBackend {
    async fn fetch_fixture(&self, league: LeagueId) -> Result<FixtureSnapshot, RemoteError> {
        self.with_league(league, |s| Ok(s.clone()))
    }

    async fn patch_fixture(
        &self,
        league: LeagueId,
        patch: &FixturePatch,
    ) -> Result<FixtureSnapshot, RemoteError> {
        self.with_league(league, |s| {
            if let Some(stage) = patch.stage {
                if stage < s.stage {
                    return Err(conflict(format!(
                        "Stage cannot go back from {} to {}",
                        s.stage, stage
                    )));
                }
                s.stage = stage;
            }
            if let Some(flags) = patch.flags {
                s.flags = flags;
            }
            if let Some(teams) = &patch.teams {
                s.teams = teams.clone();
            }
            if let Some(groups) = &patch.groups {
                s.groups = groups.clone();
            }
            Ok(s.clone())
        })
    }

    async fn create_groups(
        &self,
        fixture: FixtureId,
        group_names: &[String],
    ) -> Result<CreatedGroups, RemoteError> {
        let league = self.league_where(|s| s.id == fixture)?;
        self.with_league(league, |s| {
            if s.stage != Stage::GroupCreation.index() {
                return Err(conflict("Groups can only be created once regular rounds start"));
            }
            s.groups = group_names.iter().map(Group::new).collect();
            set_stage(s, Stage::TeamAssignment)?;
            Ok(CreatedGroups {
                groups: s.groups.clone(),
                new_stage: s.stage,
            })
        })
    }

    async fn add_teams_to_groups(&self, groups: &[Group]) -> Result<(), RemoteError> {
        let Some(first) = groups.first() else {
            return Ok(());
        };
        let first_id = first.id;
        let league = self.league_where(|s| s.groups.iter().any(|g| g.id == first_id))?;
        self.with_league(league, |s| {
            let mut seen = HashSet::new();
            for team in groups.iter().flat_map(|g| g.teams.iter()) {
                if !seen.insert(*team) {
                    return Err(conflict(format!("Team {team} is already in a group")));
                }
            }
            for group in groups {
                if let Some(stored) = s.groups.iter_mut().find(|g| g.id == group.id) {
                    stored.teams = group.teams.clone();
                }
            }
            Ok(())
        })
    }

    async fn save_regular_round_matches(
        &self,
        league: LeagueId,
        fixture: FixtureId,
        matches: &[Match],
    ) -> Result<(), RemoteError> {
        self.with_league(league, |s| {
            if s.id != fixture {
                return Err(conflict("Fixture does not belong to this league"));
            }
            s.regular_round_matches = matches.to_vec();
            Ok(())
        })
    }

    async fn start_quarter_finals(&self, league: LeagueId) -> Result<(), RemoteError> {
        self.with_league(league, |s| set_stage(s, Stage::QuarterFinals))
    }

    async fn start_quarter_final_matches(
        &self,
        league: LeagueId,
        matches: &[Match],
    ) -> Result<QuarterFinalsStarted, RemoteError> {
        self.with_league(league, |s| {
            s.quarter_final_matches = matches.to_vec();
            Ok(QuarterFinalsStarted {
                quarter_final_matches: s.quarter_final_matches.clone(),
                quarter_finals_started: s.flags.quarter_finals_started,
            })
        })
    }

    async fn start_semi_final_matches(
        &self,
        league: LeagueId,
        matches: &[Match],
    ) -> Result<SemiFinalsStarted, RemoteError> {
        self.with_league(league, |s| {
            s.semi_final_matches = matches.to_vec();
            set_stage(s, Stage::SemiFinals)?;
            Ok(SemiFinalsStarted {
                semi_finals_started: true,
            })
        })
    }

    async fn start_finals(
        &self,
        league: LeagueId,
        final_match: &Match,
    ) -> Result<FinalsStarted, RemoteError> {
        self.with_league(league, |s| {
            s.final_match = Some(final_match.clone());
            set_stage(s, Stage::Finals)?;
            Ok(FinalsStarted {
                finals_started: true,
            })
        })
    }
}
