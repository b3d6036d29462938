//! League progression rules: registration, groups, regular round, knockout brackets.

mod bracket;
mod groups;
mod propagation;
mod registration;
mod schedule;
mod stage;
mod team_assignment;

pub use bracket::{
    quarter_final_bracket, semi_final_bracket, start_quarter_finals, submit_quarter_finals,
    submit_semi_finals, BracketSlot, BracketSlotAssigner, OpenBracket, QuarterFinalAssigner,
    SemiFinalAssigner, QUARTER_FINAL_SLOTS, SEMI_FINAL_SLOTS, SLOT_CAPACITY,
};
pub use groups::{create_groups, validate_group_names};
pub use propagation::{
    complete_if_decided, final_pairing, quarter_final_winners, record_result, start_finals,
};
pub use registration::{approve, start_regular_round, unapprove, MIN_APPROVED_TEAMS};
pub use schedule::{
    generate_regular_round, parse_round_count, save_regular_round, validate_schedule, MAX_ROUNDS,
};
pub use stage::{advance, current_view, fixture_from_snapshot, reconcile_stage, StageView};
pub use team_assignment::{
    assign_team, assignment_complete, finish_team_assignment, unassign_team, unassigned_teams,
};

use crate::models::ValidationError;

/// Unwrap a form selection, failing with a validation error naming the empty field.
pub fn selected<T>(value: Option<T>, field: &'static str) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingSelection(field))
}
