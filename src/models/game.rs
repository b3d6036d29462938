//! Match, its scheduling details, and the stage label it is tagged with.

use crate::models::error::ValidationError;
use crate::models::team::TeamId;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Phase of the tournament a match belongs to.
///
/// The serialized names are the labels the backend stores with each match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum StageLabel {
    #[serde(rename = "Regular-round")]
    RegularRound,
    #[serde(rename = "Quater-final")]
    QuarterFinal,
    #[serde(rename = "Semi-final")]
    SemiFinal,
    #[serde(rename = "Final")]
    Final,
}

impl fmt::Display for StageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageLabel::RegularRound => write!(f, "Regular-round"),
            StageLabel::QuarterFinal => write!(f, "Quater-final"),
            StageLabel::SemiFinal => write!(f, "Semi-final"),
            StageLabel::Final => write!(f, "Final"),
        }
    }
}

/// Start and end of the match window.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchTime {
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
}

/// When and where a match is played. Empty until an operator fills it in.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchDetails {
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: MatchTime,
    #[serde(default)]
    pub location: String,
}

impl MatchDetails {
    pub fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime, location: impl Into<String>) -> Self {
        Self {
            date: Some(date),
            time: MatchTime {
                start: Some(start),
                end: Some(end),
            },
            location: location.into(),
        }
    }

    /// Names of the fields an operator still has to fill in, in form order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.date.is_none() {
            missing.push("date");
        }
        if self.time.start.is_none() {
            missing.push("start time");
        }
        if self.time.end.is_none() {
            missing.push("end time");
        }
        if self.location.trim().is_empty() {
            missing.push("location");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

/// A single two-team match.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub team1: TeamId,
    pub team2: TeamId,
    #[serde(flatten)]
    pub details: MatchDetails,
    pub stage_label: StageLabel,
    /// Display label, e.g. "Group A - Round 2".
    pub label: String,
    /// None until the scoring subsystem records a result.
    #[serde(default)]
    pub winner: Option<TeamId>,
}

impl Match {
    /// Create a match with a fresh id. Both sides must be different teams.
    pub fn new(
        team1: TeamId,
        team2: TeamId,
        stage_label: StageLabel,
        details: MatchDetails,
    ) -> Result<Self, ValidationError> {
        if team1 == team2 {
            return Err(ValidationError::SameTeam(team1));
        }
        let mut m = Self::pairing(Uuid::new_v4(), team1, team2, stage_label, stage_label.to_string());
        m.details = details;
        Ok(m)
    }

    /// Unchecked constructor for callers that already guarantee distinct teams.
    pub(crate) fn pairing(
        id: MatchId,
        team1: TeamId,
        team2: TeamId,
        stage_label: StageLabel,
        label: String,
    ) -> Self {
        debug_assert_ne!(team1, team2);
        Self {
            id,
            team1,
            team2,
            details: MatchDetails::default(),
            stage_label,
            label,
            winner: None,
        }
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.team1 == team || self.team2 == team
    }

    /// Record the result. The winner must be one of the two participants, and a
    /// recorded result is final.
    pub fn record_winner(&mut self, team: TeamId) -> Result<(), ValidationError> {
        if self.winner.is_some() {
            return Err(ValidationError::ResultAlreadyRecorded(self.id));
        }
        if !self.involves(team) {
            return Err(ValidationError::NotAParticipant {
                team,
                label: self.label.clone(),
            });
        }
        self.winner = Some(team);
        Ok(())
    }
}
