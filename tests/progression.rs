//! Integration tests for stage progression: registration, groups, team assignment,
//! knockout rounds and winner propagation.

use chrono::{NaiveDate, NaiveTime};
use league_fixture_admin::logic::{
    advance, approve, assign_team, create_groups, current_view, finish_team_assignment,
    fixture_from_snapshot, quarter_final_bracket, quarter_final_winners, reconcile_stage,
    record_result, save_regular_round, semi_final_bracket, start_finals, start_quarter_finals,
    start_regular_round, submit_quarter_finals, submit_semi_finals, unapprove, unassign_team,
    unassigned_teams, validate_group_names,
};
use league_fixture_admin::models::StageFlags;
use league_fixture_admin::{
    generate_regular_round, FixtureSnapshot, LeagueFixture, MatchDetails, Stage, StageLabel,
    StageView, TeamId, TeamRef, ValidationError,
};
use uuid::Uuid;

fn details() -> MatchDetails {
    MatchDetails::new(
        NaiveDate::from_ymd_opt(2026, 4, 18).unwrap(),
        NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        "Main field",
    )
}

fn league(n: usize) -> LeagueFixture {
    let teams = (0..n).map(|i| TeamRef::new(format!("Team {i}"))).collect();
    LeagueFixture::with_teams(Uuid::new_v4(), teams)
}

fn ids(fixture: &LeagueFixture) -> Vec<TeamId> {
    fixture.teams.iter().map(|t| t.id()).collect()
}

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// Eight approved teams split into two groups, schedule saved, quarter-finals started.
fn league_at_quarter_finals() -> LeagueFixture {
    let mut f = league(8);
    for id in ids(&f) {
        approve(&mut f, id).unwrap();
    }
    start_regular_round(&mut f).unwrap();
    create_groups(&mut f, 2, &names(&["North", "South"])).unwrap();
    let (north, south) = (f.groups[0].id, f.groups[1].id);
    for (i, id) in ids(&f).into_iter().enumerate() {
        assign_team(&mut f, if i < 4 { north } else { south }, id).unwrap();
    }
    finish_team_assignment(&mut f).unwrap();

    let mut matches = generate_regular_round(&f.groups, 1);
    for m in &mut matches {
        m.details = details();
    }
    save_regular_round(&mut f, matches).unwrap();
    start_quarter_finals(&mut f).unwrap();
    f
}

/// Submit quarter-finals pairing roster teams (0,1), (2,3), (4,5), (6,7).
fn submit_default_quarter_finals(f: &mut LeagueFixture) {
    let t = ids(f);
    let mut qf = quarter_final_bracket(f).unwrap();
    for slot in 1..=4 {
        qf.assign_to_slot(slot, t[2 * (slot - 1)]).unwrap();
        qf.assign_to_slot(slot, t[2 * (slot - 1) + 1]).unwrap();
        qf.set_details(slot, details()).unwrap();
    }
    submit_quarter_finals(f, &qf).unwrap();
}

#[test]
fn approval_toggles_only_during_registration() {
    let mut f = league(3);
    let t = ids(&f);
    approve(&mut f, t[0]).unwrap();
    approve(&mut f, t[1]).unwrap();
    approve(&mut f, t[2]).unwrap();
    unapprove(&mut f, t[2]).unwrap();
    assert_eq!(f.approved_count(), 2);

    let stranger = Uuid::new_v4();
    assert_eq!(approve(&mut f, stranger), Err(ValidationError::TeamNotFound(stranger)));

    start_regular_round(&mut f).unwrap();
    assert_eq!(f.stage, Stage::GroupCreation);
    let before = f.clone();
    assert_eq!(approve(&mut f, t[2]), Err(ValidationError::ApprovalFrozen));
    assert_eq!(unapprove(&mut f, t[0]), Err(ValidationError::ApprovalFrozen));
    assert_eq!(f, before);
}

#[test]
fn regular_round_needs_two_approved_teams() {
    let mut f = league(4);
    let t = ids(&f);
    approve(&mut f, t[0]).unwrap();
    assert_eq!(
        start_regular_round(&mut f),
        Err(ValidationError::NotEnoughApprovedTeams {
            required: 2,
            approved: 1
        })
    );
    assert_eq!(f.stage, Stage::Registration);
}

#[test]
fn group_names_are_checked_in_order() {
    let mut f = league(4);
    for id in ids(&f).into_iter().take(3) {
        approve(&mut f, id).unwrap();
    }
    assert_eq!(validate_group_names(&f, 0, &[]), Err(ValidationError::NoGroups));
    assert_eq!(
        validate_group_names(&f, 2, &names(&["A"])),
        Err(ValidationError::GroupCountMismatch {
            expected: 2,
            entered: 1
        })
    );
    assert_eq!(
        validate_group_names(&f, 4, &names(&["A", "B", "C", "D"])),
        Err(ValidationError::TooManyGroups {
            groups: 4,
            approved: 3
        })
    );
    assert_eq!(
        validate_group_names(&f, 2, &names(&["A", "   "])),
        Err(ValidationError::EmptyGroupName)
    );
    assert_eq!(
        validate_group_names(&f, 2, &names(&["Group A", " group a "])),
        Err(ValidationError::DuplicateGroupName("group a".to_string()))
    );
    assert_eq!(
        validate_group_names(&f, 2, &names(&[" East ", "West"])),
        Ok(names(&["East", "West"]))
    );
}

#[test]
fn groups_are_created_once_regular_rounds_start() {
    let mut f = league(4);
    for id in ids(&f) {
        approve(&mut f, id).unwrap();
    }
    assert!(matches!(
        create_groups(&mut f, 2, &names(&["A", "B"])),
        Err(ValidationError::WrongStage { .. })
    ));
    start_regular_round(&mut f).unwrap();
    create_groups(&mut f, 2, &names(&["A", "B"])).unwrap();
    assert_eq!(f.stage, Stage::TeamAssignment);
    assert_eq!(f.groups.len(), 2);
    assert!(f.groups.iter().all(|g| g.teams.is_empty()));
    assert_eq!(current_view(&f), StageView::AssignTeams { complete: false });
}

#[test]
fn team_assignment_keeps_teams_in_one_group() {
    let mut f = league(5);
    let t = ids(&f);
    for &id in &t[..4] {
        approve(&mut f, id).unwrap();
    }
    start_regular_round(&mut f).unwrap();
    create_groups(&mut f, 2, &names(&["A", "B"])).unwrap();
    let (a, b) = (f.groups[0].id, f.groups[1].id);

    assert_eq!(assign_team(&mut f, a, t[4]), Err(ValidationError::TeamNotApproved(t[4])));
    assign_team(&mut f, a, t[0]).unwrap();
    assert_eq!(assign_team(&mut f, b, t[0]), Err(ValidationError::TeamAlreadyInGroup(t[0])));
    let missing = Uuid::new_v4();
    assert_eq!(assign_team(&mut f, missing, t[1]), Err(ValidationError::GroupNotFound(missing)));

    assert_eq!(
        finish_team_assignment(&mut f),
        Err(ValidationError::AssignmentIncomplete {
            unassigned: 3,
            empty_groups: 1
        })
    );

    assign_team(&mut f, a, t[1]).unwrap();
    assign_team(&mut f, b, t[2]).unwrap();
    assign_team(&mut f, b, t[3]).unwrap();
    unassign_team(&mut f, b, t[3]).unwrap();
    assert_eq!(unassigned_teams(&f), vec![t[3]]);
    assert_eq!(
        unassign_team(&mut f, a, t[3]),
        Err(ValidationError::TeamNotInGroup { team: t[3], group: a })
    );
    assign_team(&mut f, a, t[3]).unwrap();

    assert_eq!(current_view(&f), StageView::AssignTeams { complete: true });
    finish_team_assignment(&mut f).unwrap();
    assert_eq!(f.stage, Stage::RegularRound);
    assert_eq!(current_view(&f), StageView::GenerateSchedule);
}

#[test]
fn stage_only_moves_one_step_forward() {
    let mut f = league(2);
    assert_eq!(
        advance(&mut f, 3),
        Err(ValidationError::StageOrder {
            current: 0,
            requested: 3
        })
    );
    advance(&mut f, 1).unwrap();
    advance(&mut f, 2).unwrap();
    assert_eq!(
        advance(&mut f, 1),
        Err(ValidationError::StageOrder {
            current: 2,
            requested: 1
        })
    );
    assert_eq!(
        advance(&mut f, 9),
        Err(ValidationError::StageOrder {
            current: 2,
            requested: 9
        })
    );
    assert_eq!(f.stage, Stage::TeamAssignment);
}

#[test]
fn stage_flags_win_over_a_stale_pointer() {
    let flags = StageFlags::for_stage(Stage::QuarterFinals);
    assert_eq!(flags.highest_entered(), 4);
    assert_eq!(reconcile_stage(2, &flags), Stage::QuarterFinals);
    assert_eq!(reconcile_stage(4, &flags), Stage::QuarterFinals);
    assert_eq!(reconcile_stage(3, &StageFlags::default()), Stage::RegularRound);
    let mut stale = StageFlags::default();
    stale.regular_round_started = true;
    assert_eq!(reconcile_stage(3, &stale), Stage::GroupCreation);
}

#[test]
fn record_without_flags_keeps_its_pointer() {
    let f = league(2);
    let mut snapshot = FixtureSnapshot::from(&f);
    snapshot.stage = 3;
    snapshot.flags = StageFlags::default();
    let loaded = fixture_from_snapshot(snapshot);
    assert_eq!(loaded.stage, Stage::RegularRound);

    let mut loaded = loaded;
    let t = ids(&loaded);
    assert_eq!(approve(&mut loaded, t[0]), Err(ValidationError::ApprovalFrozen));
}

#[test]
fn decided_final_in_snapshot_loads_as_completed() {
    let f = league(2);
    let t = ids(&f);
    let mut snapshot = FixtureSnapshot::from(&f);
    snapshot.stage = 6;
    snapshot.flags = StageFlags::for_stage(Stage::Finals);
    snapshot.winner = Some(t[1]);

    let loaded = fixture_from_snapshot(snapshot);
    assert_eq!(loaded.stage, Stage::Completed { winner: t[1] });
    assert_eq!(loaded.winner(), Some(t[1]));
    assert_eq!(current_view(&loaded), StageView::Champion { winner: t[1] });
}

#[test]
fn quarter_finals_need_a_saved_schedule() {
    let mut f = league_at_quarter_finals();
    assert_eq!(f.stage, Stage::QuarterFinals);
    assert_eq!(current_view(&f), StageView::AssignQuarterFinals);

    let mut unsaved = f.clone();
    unsaved.stage = Stage::RegularRound;
    unsaved.regular_round_matches.clear();
    assert_eq!(start_quarter_finals(&mut unsaved), Err(ValidationError::ScheduleNotSaved));

    submit_default_quarter_finals(&mut f);
    assert_eq!(f.quarter_final_matches.len(), 4);
    assert_eq!(f.stage, Stage::QuarterFinals);
    assert_eq!(
        quarter_final_bracket(&f),
        Err(ValidationError::AlreadyScheduled(StageLabel::QuarterFinal))
    );
}

#[test]
fn quarter_final_winners_are_exactly_the_semi_final_candidates() {
    let mut f = league_at_quarter_finals();
    submit_default_quarter_finals(&mut f);
    let t = ids(&f);

    assert_eq!(
        semi_final_bracket(&f),
        Err(ValidationError::ResultsPending(StageLabel::QuarterFinal))
    );
    assert_eq!(
        current_view(&f),
        StageView::AwaitingResults {
            stage: StageLabel::QuarterFinal
        }
    );

    // Winners A, B, C, D in match order.
    let expected = vec![t[1], t[2], t[5], t[6]];
    let qf: Vec<_> = f.quarter_final_matches.iter().map(|m| m.id).collect();
    for (id, &winner) in qf.iter().zip(&expected) {
        record_result(&mut f, *id, winner).unwrap();
    }
    assert_eq!(quarter_final_winners(&f), Ok(expected.clone()));
    assert_eq!(current_view(&f), StageView::AssignSemiFinals);

    let mut sf = semi_final_bracket(&f).unwrap();
    assert_eq!(sf.candidates(), expected.as_slice());
    assert_eq!(sf.pool(), expected);
    assert_eq!(sf.assign_to_slot(1, t[0]), Err(ValidationError::NotACandidate(t[0])));
}

#[test]
fn winners_carry_through_to_the_champion() {
    let mut f = league_at_quarter_finals();
    submit_default_quarter_finals(&mut f);
    let t = ids(&f);
    let qf: Vec<_> = f.quarter_final_matches.iter().map(|m| m.id).collect();
    for (id, winner) in qf.iter().zip([t[0], t[3], t[4], t[7]]) {
        record_result(&mut f, *id, winner).unwrap();
    }

    let mut sf = semi_final_bracket(&f).unwrap();
    sf.assign_to_slot(1, t[0]).unwrap();
    sf.assign_to_slot(1, t[7]).unwrap();
    sf.assign_to_slot(2, t[3]).unwrap();
    sf.assign_to_slot(2, t[4]).unwrap();
    sf.set_details(1, details()).unwrap();
    sf.set_details(2, details()).unwrap();
    submit_semi_finals(&mut f, &sf).unwrap();
    assert_eq!(f.stage, Stage::SemiFinals);
    assert_eq!(
        current_view(&f),
        StageView::AwaitingResults {
            stage: StageLabel::SemiFinal
        }
    );

    let sf_ids: Vec<_> = f.semi_final_matches.iter().map(|m| m.id).collect();
    record_result(&mut f, sf_ids[0], t[7]).unwrap();
    assert_eq!(
        record_result(&mut f, sf_ids[1], t[0]),
        Err(ValidationError::NotAParticipant {
            team: t[0],
            label: "Semi-final".to_string()
        })
    );
    record_result(&mut f, sf_ids[1], t[3]).unwrap();
    assert_eq!(
        current_view(&f),
        StageView::ScheduleFinal {
            team1: t[7],
            team2: t[3]
        }
    );

    let mut incomplete = details();
    incomplete.location.clear();
    assert_eq!(
        start_finals(&mut f, incomplete),
        Err(ValidationError::IncompleteMatches(vec![
            "Final: missing location".to_string()
        ]))
    );
    assert_eq!(f.stage, Stage::SemiFinals);

    let final_match = start_finals(&mut f, details()).unwrap();
    assert_eq!((final_match.team1, final_match.team2), (t[7], t[3]));
    assert_eq!(f.stage, Stage::Finals);

    record_result(&mut f, final_match.id, t[3]).unwrap();
    assert_eq!(f.stage, Stage::Completed { winner: t[3] });
    assert_eq!(advance(&mut f, 7), Err(ValidationError::LeagueCompleted));
    assert_eq!(
        record_result(&mut f, final_match.id, t[7]),
        Err(ValidationError::LeagueCompleted)
    );
}

#[test]
fn stage_index_never_decreases_through_a_full_run() {
    let mut f = league_at_quarter_finals();
    let mut last = f.stage.index();
    submit_default_quarter_finals(&mut f);
    assert!(f.stage.index() >= last);
    last = f.stage.index();

    let t = ids(&f);
    let qf: Vec<_> = f.quarter_final_matches.iter().map(|m| m.id).collect();
    for (id, winner) in qf.iter().zip([t[0], t[2], t[4], t[6]]) {
        record_result(&mut f, *id, winner).unwrap();
        assert!(f.stage.index() >= last);
    }
    assert!(matches!(
        submit_quarter_finals(&mut f, &quarter_final_bracket(&league_at_quarter_finals()).unwrap()),
        Err(ValidationError::AlreadyScheduled(StageLabel::QuarterFinal))
    ));
    assert!(f.stage.index() >= last);
}

#[test]
fn knockout_results_are_final_once_recorded() {
    let mut f = league_at_quarter_finals();
    submit_default_quarter_finals(&mut f);
    let t = ids(&f);
    let qf: Vec<_> = f.quarter_final_matches.iter().map(|m| m.id).collect();
    for (id, winner) in qf.iter().zip([t[0], t[2], t[4], t[6]]) {
        record_result(&mut f, *id, winner).unwrap();
    }
    assert_eq!(
        record_result(&mut f, qf[0], t[1]),
        Err(ValidationError::ResultAlreadyRecorded(qf[0]))
    );

    let mut sf = semi_final_bracket(&f).unwrap();
    sf.assign_to_slot(1, t[0]).unwrap();
    sf.assign_to_slot(1, t[2]).unwrap();
    sf.assign_to_slot(2, t[4]).unwrap();
    sf.assign_to_slot(2, t[6]).unwrap();
    sf.set_details(1, details()).unwrap();
    sf.set_details(2, details()).unwrap();
    submit_semi_finals(&mut f, &sf).unwrap();

    assert_eq!(
        record_result(&mut f, qf[0], t[1]),
        Err(ValidationError::RoundClosed(StageLabel::QuarterFinal))
    );
    assert_eq!(f.quarter_final_matches[0].winner, Some(t[0]));
    f.quarter_final_matches[0].winner = None;
    assert_eq!(
        record_result(&mut f, qf[0], t[1]),
        Err(ValidationError::RoundClosed(StageLabel::QuarterFinal))
    );
    assert_eq!(f.quarter_final_matches[0].winner, None);
    for m in &f.semi_final_matches {
        assert!([t[0], t[2], t[4], t[6]].contains(&m.team1));
        assert!([t[0], t[2], t[4], t[6]].contains(&m.team2));
    }
}
