//! Knockout bracket assignment: a candidate pool placed into fixed two-team match
//! slots. The same assigner runs the 4 quarter-final and 2 semi-final slots.

use crate::logic::propagation::quarter_final_winners;
use crate::logic::stage::advance;
use crate::models::{
    LeagueFixture, Match, MatchDetails, Stage, StageLabel, TeamId, ValidationError,
};
use serde::Serialize;

/// Teams per match slot.
pub const SLOT_CAPACITY: usize = 2;
pub const QUARTER_FINAL_SLOTS: usize = 4;
pub const SEMI_FINAL_SLOTS: usize = 2;

/// One match placeholder. `slot_id` is 1-based.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BracketSlot {
    pub slot_id: usize,
    pub occupants: Vec<TeamId>,
    pub details: MatchDetails,
}

impl BracketSlot {
    fn new(slot_id: usize) -> Self {
        Self {
            slot_id,
            occupants: Vec::with_capacity(SLOT_CAPACITY),
            details: MatchDetails::default(),
        }
    }

    pub fn is_full(&self) -> bool {
        self.occupants.len() >= SLOT_CAPACITY
    }
}

/// `N` slots of capacity 2 filled from a fixed candidate pool. A candidate sits in at
/// most one slot at a time. Lives only for one assignment screen.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct BracketSlotAssigner<const N: usize> {
    label: StageLabel,
    candidates: Vec<TeamId>,
    slots: Vec<BracketSlot>,
}

pub type QuarterFinalAssigner = BracketSlotAssigner<QUARTER_FINAL_SLOTS>;
pub type SemiFinalAssigner = BracketSlotAssigner<SEMI_FINAL_SLOTS>;

impl<const N: usize> BracketSlotAssigner<N> {
    pub fn new(label: StageLabel, candidates: Vec<TeamId>) -> Self {
        Self {
            label,
            candidates,
            slots: (1..=N).map(BracketSlot::new).collect(),
        }
    }

    pub fn label(&self) -> StageLabel {
        self.label
    }

    pub fn candidates(&self) -> &[TeamId] {
        &self.candidates
    }

    pub fn slots(&self) -> &[BracketSlot] {
        &self.slots
    }

    /// Candidates not sitting in any slot, in candidate order.
    pub fn pool(&self) -> Vec<TeamId> {
        self.candidates
            .iter()
            .copied()
            .filter(|&t| !self.is_assigned(t))
            .collect()
    }

    pub fn is_assigned(&self, team: TeamId) -> bool {
        self.slots.iter().any(|s| s.occupants.contains(&team))
    }

    fn slot_mut(&mut self, slot_id: usize) -> Result<&mut BracketSlot, ValidationError> {
        slot_id
            .checked_sub(1)
            .and_then(|i| self.slots.get_mut(i))
            .ok_or(ValidationError::SlotNotFound(slot_id))
    }

    /// Put a candidate into a slot. Fails without changes if the slot is full or the
    /// team already sits in any slot.
    pub fn assign_to_slot(&mut self, slot_id: usize, team: TeamId) -> Result<(), ValidationError> {
        if !self.candidates.contains(&team) {
            return Err(ValidationError::NotACandidate(team));
        }
        let already = self.is_assigned(team);
        let slot = self.slot_mut(slot_id)?;
        if slot.is_full() {
            return Err(ValidationError::SlotFull(slot_id));
        }
        if already {
            return Err(ValidationError::AlreadyAssigned(team));
        }
        slot.occupants.push(team);
        log::debug!("{} slot {}: assigned {}", self.label, slot_id, team);
        Ok(())
    }

    /// Remove the occupant at `occupant` (0 or 1) and return it to the pool.
    pub fn unassign_from_slot(
        &mut self,
        slot_id: usize,
        occupant: usize,
    ) -> Result<TeamId, ValidationError> {
        let slot = self.slot_mut(slot_id)?;
        if occupant >= slot.occupants.len() {
            return Err(ValidationError::OccupantNotFound {
                slot: slot_id,
                occupant,
            });
        }
        let team = slot.occupants.remove(occupant);
        log::debug!("{} slot {}: removed {}", self.label, slot_id, team);
        Ok(team)
    }

    pub fn set_details(
        &mut self,
        slot_id: usize,
        details: MatchDetails,
    ) -> Result<(), ValidationError> {
        self.slot_mut(slot_id)?.details = details;
        Ok(())
    }

    /// Turn the slots into matches. Every slot needs two teams and complete details;
    /// otherwise the error names what each slot is missing.
    pub fn submit(&self) -> Result<Vec<Match>, ValidationError> {
        let incomplete: Vec<String> = self
            .slots
            .iter()
            .filter_map(|slot| {
                let mut missing: Vec<&str> = Vec::new();
                if slot.occupants.is_empty() {
                    missing.push("team 1");
                }
                if slot.occupants.len() < SLOT_CAPACITY {
                    missing.push("team 2");
                }
                missing.extend(slot.details.missing_fields());
                (!missing.is_empty())
                    .then(|| format!("Match {}: missing {}", slot.slot_id, missing.join(", ")))
            })
            .collect();
        if !incomplete.is_empty() {
            return Err(ValidationError::IncompleteMatches(incomplete));
        }

        self.slots
            .iter()
            .map(|slot| {
                Match::new(
                    slot.occupants[0],
                    slot.occupants[1],
                    self.label,
                    slot.details.clone(),
                )
            })
            .collect()
    }
}

/// The bracket screen currently open for a league.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "round")]
pub enum OpenBracket {
    QuarterFinals(QuarterFinalAssigner),
    SemiFinals(SemiFinalAssigner),
}

impl OpenBracket {
    pub fn label(&self) -> StageLabel {
        match self {
            OpenBracket::QuarterFinals(a) => a.label(),
            OpenBracket::SemiFinals(a) => a.label(),
        }
    }

    pub fn pool(&self) -> Vec<TeamId> {
        match self {
            OpenBracket::QuarterFinals(a) => a.pool(),
            OpenBracket::SemiFinals(a) => a.pool(),
        }
    }

    pub fn assign_to_slot(&mut self, slot_id: usize, team: TeamId) -> Result<(), ValidationError> {
        match self {
            OpenBracket::QuarterFinals(a) => a.assign_to_slot(slot_id, team),
            OpenBracket::SemiFinals(a) => a.assign_to_slot(slot_id, team),
        }
    }

    pub fn unassign_from_slot(
        &mut self,
        slot_id: usize,
        occupant: usize,
    ) -> Result<TeamId, ValidationError> {
        match self {
            OpenBracket::QuarterFinals(a) => a.unassign_from_slot(slot_id, occupant),
            OpenBracket::SemiFinals(a) => a.unassign_from_slot(slot_id, occupant),
        }
    }

    pub fn set_details(
        &mut self,
        slot_id: usize,
        details: MatchDetails,
    ) -> Result<(), ValidationError> {
        match self {
            OpenBracket::QuarterFinals(a) => a.set_details(slot_id, details),
            OpenBracket::SemiFinals(a) => a.set_details(slot_id, details),
        }
    }
}

/// RegularRound -> QuarterFinals, once the regular round is saved.
pub fn start_quarter_finals(fixture: &mut LeagueFixture) -> Result<(), ValidationError> {
    fixture.require_stage(Stage::RegularRound)?;
    if fixture.regular_round_matches.is_empty() {
        return Err(ValidationError::ScheduleNotSaved);
    }
    advance(fixture, Stage::QuarterFinals.index())
}

/// Fresh quarter-final screen: every approved team is a candidate.
pub fn quarter_final_bracket(fixture: &LeagueFixture) -> Result<QuarterFinalAssigner, ValidationError> {
    fixture.require_stage(Stage::QuarterFinals)?;
    if !fixture.quarter_final_matches.is_empty() {
        return Err(ValidationError::AlreadyScheduled(StageLabel::QuarterFinal));
    }
    let candidates = fixture.approved_teams().map(|t| t.id).collect();
    Ok(QuarterFinalAssigner::new(StageLabel::QuarterFinal, candidates))
}

/// Store the four quarter-final matches. The stage stays at quarter-finals until
/// their results are in.
pub fn submit_quarter_finals(
    fixture: &mut LeagueFixture,
    assigner: &QuarterFinalAssigner,
) -> Result<Vec<Match>, ValidationError> {
    fixture.require_stage(Stage::QuarterFinals)?;
    if !fixture.quarter_final_matches.is_empty() {
        return Err(ValidationError::AlreadyScheduled(StageLabel::QuarterFinal));
    }
    let matches = assigner.submit()?;
    fixture.quarter_final_matches = matches.clone();
    Ok(matches)
}

/// Fresh semi-final screen: the quarter-final winners are the candidates.
pub fn semi_final_bracket(fixture: &LeagueFixture) -> Result<SemiFinalAssigner, ValidationError> {
    fixture.require_stage(Stage::QuarterFinals)?;
    let winners = quarter_final_winners(fixture)?;
    Ok(SemiFinalAssigner::new(StageLabel::SemiFinal, winners))
}

/// QuarterFinals -> SemiFinals with the two semi-final matches.
pub fn submit_semi_finals(
    fixture: &mut LeagueFixture,
    assigner: &SemiFinalAssigner,
) -> Result<Vec<Match>, ValidationError> {
    fixture.require_stage(Stage::QuarterFinals)?;
    let winners = quarter_final_winners(fixture)?;
    let matches = assigner.submit()?;
    for m in &matches {
        for team in [m.team1, m.team2] {
            if !winners.contains(&team) {
                return Err(ValidationError::NotACandidate(team));
            }
        }
    }
    fixture.semi_final_matches = matches.clone();
    advance(fixture, Stage::SemiFinals.index())?;
    Ok(matches)
}
