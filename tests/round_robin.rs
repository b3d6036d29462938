//! Integration tests for regular-round generation and schedule saving.

use chrono::{NaiveDate, NaiveTime};
use league_fixture_admin::logic::{save_regular_round, validate_schedule, MAX_ROUNDS};
use league_fixture_admin::{
    generate_regular_round, parse_round_count, Group, LeagueFixture, MatchDetails, Stage,
    StageLabel, TeamId, ValidationError,
};
use std::collections::HashMap;
use uuid::Uuid;

fn group(name: &str, n: usize) -> Group {
    let mut g = Group::new(name);
    g.teams = (0..n).map(|_| Uuid::new_v4()).collect();
    g
}

fn details() -> MatchDetails {
    MatchDetails::new(
        NaiveDate::from_ymd_opt(2026, 5, 2).unwrap(),
        NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
        "Court 1",
    )
}

#[test]
fn three_groups_of_four_over_two_rounds_gives_36_matches() {
    let groups = vec![group("Group A", 4), group("Group B", 4), group("Group C", 4)];
    let matches = generate_regular_round(&groups, 2);
    // 3 groups * 2 rounds * C(4,2)
    assert_eq!(matches.len(), 36);
    for g in &groups {
        let in_group: Vec<_> = matches.iter().filter(|m| g.contains(m.team1)).collect();
        assert_eq!(in_group.len(), 12);
        let round1 = format!("{} - Round 1", g.name);
        assert_eq!(in_group.iter().filter(|m| m.label == round1).count(), 6);
    }
    assert!(matches.iter().all(|m| m.stage_label == StageLabel::RegularRound));
    assert!(matches.iter().all(|m| m.winner.is_none()));
    assert!(matches.iter().all(|m| !m.details.is_complete()));
    assert_eq!(matches[0].label, "Group A - Round 1");
    assert_eq!(matches[6].label, "Group A - Round 2");
    assert_eq!(matches[12].label, "Group B - Round 1");
}

#[test]
fn every_pair_meets_once_per_round() {
    let g = group("Group A", 5);
    let matches = generate_regular_round(std::slice::from_ref(&g), 2);
    assert_eq!(matches.len(), 20);

    let mut meetings: HashMap<(TeamId, TeamId), usize> = HashMap::new();
    for m in &matches {
        assert_ne!(m.team1, m.team2);
        assert!(g.contains(m.team1) && g.contains(m.team2));
        let key = if m.team1 < m.team2 {
            (m.team1, m.team2)
        } else {
            (m.team2, m.team1)
        };
        *meetings.entry(key).or_default() += 1;
    }
    assert_eq!(meetings.len(), 10);
    assert!(meetings.values().all(|&count| count == 2));
}

#[test]
fn home_and_away_swap_each_round() {
    let g = group("Group A", 3);
    let matches = generate_regular_round(std::slice::from_ref(&g), 3);
    let (a, b, c) = (g.teams[0], g.teams[1], g.teams[2]);

    let round1: Vec<_> = matches[0..3].iter().map(|m| (m.team1, m.team2)).collect();
    let round2: Vec<_> = matches[3..6].iter().map(|m| (m.team1, m.team2)).collect();
    let round3: Vec<_> = matches[6..9].iter().map(|m| (m.team1, m.team2)).collect();
    assert_eq!(round1, vec![(a, b), (a, c), (b, c)]);
    assert_eq!(round2, vec![(b, a), (c, a), (c, b)]);
    assert_eq!(round3, round1);
}

#[test]
fn generation_is_deterministic() {
    let groups = vec![group("Group A", 4), group("Group B", 3)];
    let first = generate_regular_round(&groups, 2);
    let second = generate_regular_round(&groups, 2);
    assert_eq!(first, second);

    let mut ids: Vec<_> = first.iter().map(|m| m.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), first.len());
}

#[test]
fn groups_with_fewer_than_two_teams_are_skipped() {
    let groups = vec![group("Solo", 1), group("Empty", 0), group("Pair", 2)];
    let matches = generate_regular_round(&groups, 1);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].label, "Pair - Round 1");
}

#[test]
fn round_count_input_is_forgiving() {
    assert_eq!(parse_round_count("3"), 3);
    assert_eq!(parse_round_count(" 4 "), 4);
    assert_eq!(parse_round_count("2.7"), 2);
    assert_eq!(parse_round_count("0"), 1);
    assert_eq!(parse_round_count("-5"), 1);
    assert_eq!(parse_round_count("two"), 1);
    assert_eq!(parse_round_count(""), 1);
    assert_eq!(parse_round_count("NaN"), 1);
    assert_eq!(parse_round_count("20"), MAX_ROUNDS);
    assert_eq!(parse_round_count("1000000000"), MAX_ROUNDS);
    assert_eq!(parse_round_count("1e300"), MAX_ROUNDS);
}

#[test]
fn generation_stops_at_the_round_cap() {
    let groups = vec![group("Group A", 2)];
    assert_eq!(
        generate_regular_round(&groups, u32::MAX).len(),
        MAX_ROUNDS as usize
    );
}

#[test]
fn zero_rounds_still_generates_one() {
    let groups = vec![group("Group A", 3)];
    assert_eq!(generate_regular_round(&groups, 0).len(), 3);
}

#[test]
fn validation_names_each_incomplete_match() {
    let groups = vec![group("Group A", 3)];
    let mut matches = generate_regular_round(&groups, 1);
    assert_eq!(validate_schedule(&[]), Err(ValidationError::NoMatches));

    matches[0].details = details();
    matches[2].details = details();
    matches[2].details.location = "  ".to_string();
    matches[1].details.date = Some(NaiveDate::from_ymd_opt(2026, 5, 3).unwrap());

    let err = validate_schedule(&matches).unwrap_err();
    assert_eq!(
        err,
        ValidationError::IncompleteMatches(vec![
            "Match 2 (Group A - Round 1): missing start time, end time, location".to_string(),
            "Match 3 (Group A - Round 1): missing location".to_string(),
        ])
    );
}

#[test]
fn schedule_is_saved_once_in_regular_round() {
    let g = group("Group A", 2);
    let mut fixture = LeagueFixture::new(Uuid::new_v4());
    fixture.groups = vec![g.clone()];

    let mut matches = generate_regular_round(&fixture.groups, 1);
    matches[0].details = details();

    assert!(matches!(
        save_regular_round(&mut fixture, matches.clone()),
        Err(ValidationError::WrongStage {
            expected: Stage::RegularRound,
            ..
        })
    ));

    fixture.stage = Stage::RegularRound;
    save_regular_round(&mut fixture, matches.clone()).unwrap();
    assert_eq!(fixture.regular_round_matches, matches);
    assert_eq!(
        save_regular_round(&mut fixture, matches),
        Err(ValidationError::ScheduleAlreadySaved)
    );
}

fn fixture_in_regular_round(groups: Vec<Group>) -> LeagueFixture {
    let mut fixture = LeagueFixture::new(Uuid::new_v4());
    fixture.groups = groups;
    fixture.stage = Stage::RegularRound;
    fixture
}

fn completed_schedule(fixture: &LeagueFixture) -> Vec<league_fixture_admin::Match> {
    let mut matches = generate_regular_round(&fixture.groups, 1);
    for m in &mut matches {
        m.details = details();
    }
    matches
}

#[test]
fn saved_matches_must_be_regular_round_pairings() {
    let mut fixture = fixture_in_regular_round(vec![group("Group A", 3)]);
    let mut matches = completed_schedule(&fixture);
    matches[1].stage_label = StageLabel::Final;

    assert_eq!(
        save_regular_round(&mut fixture, matches),
        Err(ValidationError::WrongStageLabel {
            expected: StageLabel::RegularRound,
            found: StageLabel::Final
        })
    );
    assert!(fixture.regular_round_matches.is_empty());
}

#[test]
fn saved_matches_cannot_carry_a_result() {
    let mut fixture = fixture_in_regular_round(vec![group("Group A", 3)]);
    let mut matches = completed_schedule(&fixture);
    matches[0].winner = Some(matches[0].team1);
    let id = matches[0].id;

    assert_eq!(
        save_regular_round(&mut fixture, matches),
        Err(ValidationError::ResultAlreadyRecorded(id))
    );
    assert!(fixture.regular_round_matches.is_empty());
}

#[test]
fn saved_matches_pair_teams_from_one_group() {
    let mut fixture = fixture_in_regular_round(vec![group("Group A", 2), group("Group B", 2)]);
    let (a, b) = (fixture.groups[0].teams[0], fixture.groups[1].teams[0]);

    let mut across = completed_schedule(&fixture);
    across[0].team2 = b;
    assert_eq!(
        save_regular_round(&mut fixture, across),
        Err(ValidationError::TeamsNotInSameGroup { team1: a, team2: b })
    );

    let outsider = Uuid::new_v4();
    let mut stranger = completed_schedule(&fixture);
    stranger[1].team1 = outsider;
    let team2 = stranger[1].team2;
    assert_eq!(
        save_regular_round(&mut fixture, stranger),
        Err(ValidationError::TeamsNotInSameGroup {
            team1: outsider,
            team2
        })
    );
    assert!(fixture.regular_round_matches.is_empty());

    let schedule = completed_schedule(&fixture);
    save_regular_round(&mut fixture, schedule).unwrap();
    assert_eq!(fixture.regular_round_matches.len(), 2);
}
