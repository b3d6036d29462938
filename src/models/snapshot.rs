//! Backend wire types: the fixture snapshot, partial updates and command replies.

use crate::models::fixture::{FixtureId, LeagueFixture, LeagueId, Stage};
use crate::models::game::Match;
use crate::models::group::Group;
use crate::models::team::{TeamEntry, TeamId};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Per-stage booleans stored next to the stage pointer. Flag k is set once
/// stage k has been entered.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StageFlags {
    pub regular_round_started: bool,
    pub groups_created: bool,
    pub teams_assigned_to_groups: bool,
    pub quarter_finals_started: bool,
    pub semi_finals_started: bool,
    pub finals_started: bool,
}

impl StageFlags {
    /// Flags consistent with `stage`: the first `stage.index()` flags are set.
    pub fn for_stage(stage: Stage) -> Self {
        let i = stage.index();
        Self {
            regular_round_started: i >= 1,
            groups_created: i >= 2,
            teams_assigned_to_groups: i >= 3,
            quarter_finals_started: i >= 4,
            semi_finals_started: i >= 5,
            finals_started: i >= 6,
        }
    }

    /// Index of the furthest stage whose flag is set (0 when none are).
    pub fn highest_entered(&self) -> u8 {
        let ordered = [
            self.regular_round_started,
            self.groups_created,
            self.teams_assigned_to_groups,
            self.quarter_finals_started,
            self.semi_finals_started,
            self.finals_started,
        ];
        ordered
            .iter()
            .rposition(|&set| set)
            .map(|i| i as u8 + 1)
            .unwrap_or(0)
    }
}

/// Full fixture record as the backend stores it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureSnapshot {
    pub id: FixtureId,
    pub league: LeagueId,
    pub stage: u8,
    #[serde(default)]
    pub teams: Vec<TeamEntry>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub regular_round_matches: Vec<Match>,
    #[serde(default)]
    pub quarter_final_matches: Vec<Match>,
    #[serde(default)]
    pub semi_final_matches: Vec<Match>,
    #[serde(default)]
    pub final_match: Option<Match>,
    #[serde(default)]
    pub winner: Option<TeamId>,
    #[serde(flatten)]
    pub flags: StageFlags,
}

impl From<&LeagueFixture> for FixtureSnapshot {
    fn from(f: &LeagueFixture) -> Self {
        Self {
            id: f.fixture_id,
            league: f.league_id,
            stage: f.stage.index(),
            teams: f.teams.clone(),
            groups: f.groups.clone(),
            regular_round_matches: f.regular_round_matches.clone(),
            quarter_final_matches: f.quarter_final_matches.clone(),
            semi_final_matches: f.semi_final_matches.clone(),
            final_match: f.final_match.clone(),
            winner: f.winner(),
            flags: StageFlags::for_stage(f.stage),
        }
    }
}

/// Partial update for `patchFixture`. Absent fields are left untouched.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixturePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<u8>,
    #[serde(flatten)]
    pub flags: Option<StageFlags>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teams: Option<Vec<TeamEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<Group>>,
}

impl FixturePatch {
    /// Stage pointer plus its matching flags.
    pub fn stage(stage: Stage) -> Self {
        Self {
            stage: Some(stage.index()),
            flags: Some(StageFlags::for_stage(stage)),
            ..Self::default()
        }
    }

    pub fn teams(teams: &[TeamEntry]) -> Self {
        Self {
            teams: Some(teams.to_vec()),
            ..Self::default()
        }
    }
}

/// Reply to `createGroups`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedGroups {
    pub groups: Vec<Group>,
    pub new_stage: u8,
}

/// Reply to `startQuarterFinalMatches`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterFinalsStarted {
    pub quarter_final_matches: Vec<Match>,
    #[serde(default)]
    pub quarter_finals_started: bool,
}

/// Reply to `startSemiFinalMatches`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemiFinalsStarted {
    pub semi_finals_started: bool,
}

/// Reply to `startFinals`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalsStarted {
    pub finals_started: bool,
}

/// Knockout batch body: `{ "Match1": {..}, "Match2": {..}, .. }`.
pub struct NumberedMatches<'a>(pub &'a [Match]);

impl Serialize for NumberedMatches<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (i, m) in self.0.iter().enumerate() {
            map.serialize_entry(&format!("Match{}", i + 1), m)?;
        }
        map.end()
    }
}
