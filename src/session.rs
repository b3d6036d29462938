//! One operator driving one league. Each command validates and applies its change to
//! a copy of the fixture, sends it to the backend, and only replaces the local
//! fixture once the backend accepted it. A failed call leaves local state as it was.

use crate::backend::FixtureBackend;
use crate::logic::{self, OpenBracket, StageView};
use crate::models::{
    FixtureError, FixturePatch, GroupId, LeagueFixture, LeagueId, Match, MatchDetails, Stage,
    StageLabel, TeamId, ValidationError,
};

pub struct LeagueSession<B> {
    backend: B,
    fixture: LeagueFixture,
}

/// Log a backend failure on its way to the operator.
fn remote_failure<E: Into<FixtureError>>(
    league: LeagueId,
    action: &str,
) -> impl FnOnce(E) -> FixtureError + '_ {
    move |e| {
        let e = e.into();
        log::warn!("League {}: {} failed: {}", league, action, e);
        e
    }
}

impl<B: FixtureBackend> LeagueSession<B> {
    /// Fetch the league's fixture and open a session on it.
    pub async fn load(backend: B, league: LeagueId) -> Result<Self, FixtureError> {
        let snapshot = backend
            .fetch_fixture(league)
            .await
            .map_err(remote_failure(league, "load"))?;
        let mut fixture = logic::fixture_from_snapshot(snapshot);
        logic::complete_if_decided(&mut fixture);
        log::info!("League {} loaded at stage {}", league, fixture.stage);
        Ok(Self { backend, fixture })
    }

    pub fn fixture(&self) -> &LeagueFixture {
        &self.fixture
    }

    pub fn league_id(&self) -> LeagueId {
        self.fixture.league_id
    }

    pub fn view(&self) -> StageView {
        logic::current_view(&self.fixture)
    }

    /// Re-fetch to pick up results entered by the scoring service.
    pub async fn refresh(&mut self) -> Result<(), FixtureError> {
        let league = self.league_id();
        let snapshot = self
            .backend
            .fetch_fixture(league)
            .await
            .map_err(remote_failure(league, "refresh"))?;
        let mut fixture = logic::fixture_from_snapshot(snapshot);
        logic::complete_if_decided(&mut fixture);
        self.fixture = fixture;
        Ok(())
    }

    /// Move the stage pointer to `new_index`, which must be the next stage.
    pub async fn advance(&mut self, new_index: u8) -> Result<(), FixtureError> {
        let mut next = self.fixture.clone();
        logic::advance(&mut next, new_index)?;
        self.patch_and_commit(next, |f| FixturePatch::stage(f.stage), "advance")
            .await
    }

    pub async fn approve(&mut self, team: TeamId) -> Result<(), FixtureError> {
        let mut next = self.fixture.clone();
        logic::approve(&mut next, team)?;
        self.patch_and_commit(next, |f| FixturePatch::teams(&f.teams), "approve")
            .await
    }

    pub async fn unapprove(&mut self, team: TeamId) -> Result<(), FixtureError> {
        let mut next = self.fixture.clone();
        logic::unapprove(&mut next, team)?;
        self.patch_and_commit(next, |f| FixturePatch::teams(&f.teams), "unapprove")
            .await
    }

    pub async fn start_regular_round(&mut self) -> Result<(), FixtureError> {
        let mut next = self.fixture.clone();
        logic::start_regular_round(&mut next)?;
        self.patch_and_commit(next, |f| FixturePatch::stage(f.stage), "start regular round")
            .await
    }

    /// Create the named groups. The backend assigns the group ids.
    pub async fn create_groups(
        &mut self,
        group_number: usize,
        group_names: &[String],
    ) -> Result<(), FixtureError> {
        let league = self.league_id();
        let mut next = self.fixture.clone();
        logic::create_groups(&mut next, group_number, group_names)?;
        let names: Vec<String> = next.groups.iter().map(|g| g.name.clone()).collect();
        let created = self
            .backend
            .create_groups(next.fixture_id, &names)
            .await
            .map_err(remote_failure(league, "create groups"))?;
        if created.new_stage != next.stage.index() {
            log::warn!(
                "League {}: backend reports stage {} after creating groups, expected {}",
                league,
                created.new_stage,
                next.stage.index()
            );
        }
        next.groups = created.groups;
        self.fixture = next;
        Ok(())
    }

    pub async fn assign_team(&mut self, group: GroupId, team: TeamId) -> Result<(), FixtureError> {
        let mut next = self.fixture.clone();
        logic::assign_team(&mut next, group, team)?;
        self.save_groups(next, "assign team").await
    }

    pub async fn unassign_team(&mut self, group: GroupId, team: TeamId) -> Result<(), FixtureError> {
        let mut next = self.fixture.clone();
        logic::unassign_team(&mut next, group, team)?;
        self.save_groups(next, "unassign team").await
    }

    pub async fn finish_team_assignment(&mut self) -> Result<(), FixtureError> {
        let mut next = self.fixture.clone();
        logic::finish_team_assignment(&mut next)?;
        self.patch_and_commit(next, |f| FixturePatch::stage(f.stage), "finish team assignment")
            .await
    }

    /// Propose the regular-round schedule. Nothing is stored; generating again
    /// gives the same list. Not offered once a schedule is saved.
    pub fn generate_schedule(&self, rounds_input: &str) -> Result<Vec<Match>, FixtureError> {
        self.fixture.require_stage(Stage::RegularRound)?;
        if !self.fixture.regular_round_matches.is_empty() {
            return Err(ValidationError::ScheduleAlreadySaved.into());
        }
        let rounds = logic::parse_round_count(rounds_input);
        Ok(logic::generate_regular_round(&self.fixture.groups, rounds))
    }

    /// Save the operator-completed regular-round schedule.
    pub async fn save_regular_round(&mut self, matches: Vec<Match>) -> Result<(), FixtureError> {
        let league = self.league_id();
        let mut next = self.fixture.clone();
        logic::save_regular_round(&mut next, matches)?;
        self.backend
            .save_regular_round_matches(league, next.fixture_id, &next.regular_round_matches)
            .await
            .map_err(remote_failure(league, "save regular round"))?;
        log::info!(
            "League {}: saved {} regular round matches",
            league,
            next.regular_round_matches.len()
        );
        self.fixture = next;
        Ok(())
    }

    pub async fn start_quarter_finals(&mut self) -> Result<(), FixtureError> {
        let league = self.league_id();
        let mut next = self.fixture.clone();
        logic::start_quarter_finals(&mut next)?;
        self.backend
            .start_quarter_finals(league)
            .await
            .map_err(remote_failure(league, "start quarter-finals"))?;
        self.fixture = next;
        Ok(())
    }

    /// Open the bracket screen for the current state: quarter-finals with every
    /// approved team, or semi-finals with the quarter-final winners.
    pub fn open_bracket(&self) -> Result<OpenBracket, FixtureError> {
        match self.view() {
            StageView::AssignQuarterFinals => Ok(OpenBracket::QuarterFinals(
                logic::quarter_final_bracket(&self.fixture)?,
            )),
            StageView::AssignSemiFinals => Ok(OpenBracket::SemiFinals(logic::semi_final_bracket(
                &self.fixture,
            )?)),
            StageView::AwaitingResults { stage } => {
                Err(ValidationError::ResultsPending(stage).into())
            }
            _ => Err(ValidationError::WrongStage {
                expected: Stage::QuarterFinals,
                actual: self.fixture.stage,
            }
            .into()),
        }
    }

    /// Submit a filled bracket as one batch of matches.
    pub async fn submit_bracket(&mut self, bracket: &OpenBracket) -> Result<Vec<Match>, FixtureError> {
        let league = self.league_id();
        let mut next = self.fixture.clone();
        let matches = match bracket {
            OpenBracket::QuarterFinals(assigner) => {
                let matches = logic::submit_quarter_finals(&mut next, assigner)?;
                let started = self
                    .backend
                    .start_quarter_final_matches(league, &matches)
                    .await
                    .map_err(remote_failure(league, "start quarter-final matches"))?;
                if started.quarter_final_matches.len() == matches.len() {
                    next.quarter_final_matches = started.quarter_final_matches;
                }
                matches
            }
            OpenBracket::SemiFinals(assigner) => {
                let matches = logic::submit_semi_finals(&mut next, assigner)?;
                self.backend
                    .start_semi_final_matches(league, &matches)
                    .await
                    .map_err(remote_failure(league, "start semi-final matches"))?;
                matches
            }
        };
        log::info!(
            "League {}: {} matches submitted ({})",
            league,
            bracket.label(),
            matches.len()
        );
        self.fixture = next;
        Ok(matches)
    }

    /// Schedule the final between the two semi-final winners.
    pub async fn start_finals(&mut self, details: MatchDetails) -> Result<Match, FixtureError> {
        let league = self.league_id();
        let mut next = self.fixture.clone();
        let final_match = logic::start_finals(&mut next, details)?;
        self.backend
            .start_finals(league, &final_match)
            .await
            .map_err(remote_failure(league, "start finals"))?;
        log::info!("League {}: {} scheduled", league, StageLabel::Final);
        self.fixture = next;
        Ok(final_match)
    }

    async fn save_groups(&mut self, next: LeagueFixture, action: &str) -> Result<(), FixtureError> {
        let league = self.league_id();
        self.backend
            .add_teams_to_groups(&next.groups)
            .await
            .map_err(remote_failure(league, action))?;
        self.fixture = next;
        Ok(())
    }

    async fn patch_and_commit(
        &mut self,
        next: LeagueFixture,
        patch: impl FnOnce(&LeagueFixture) -> FixturePatch,
        action: &str,
    ) -> Result<(), FixtureError> {
        let league = self.league_id();
        self.backend
            .patch_fixture(league, &patch(&next))
            .await
            .map_err(remote_failure(league, action))?;
        self.fixture = next;
        Ok(())
    }
}
