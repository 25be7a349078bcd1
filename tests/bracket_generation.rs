//! Integration tests for bracket generation: shape, seeding and next-match pointers.

use std::collections::HashSet;

use bracket_engine::{
    generate, generate_with_rng, matches_by_round, BracketError, MatchStatus, Round, Team,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

fn teams(n: usize) -> Vec<Team> {
    (0..n).map(|i| Team::new(format!("T{i}"))).collect()
}

#[test]
fn every_supported_size_has_team_count_minus_one_matches() {
    for n in [2, 4, 8, 16, 32] {
        let bracket = generate(teams(n)).unwrap();
        assert_eq!(bracket.matches().len(), n - 1, "{n} teams");
        assert_eq!(bracket.team_count() as usize, n);
    }
}

#[test]
fn round_sizes_halve_down_to_the_final() {
    let bracket = generate(teams(32)).unwrap();
    let sizes: Vec<usize> = bracket
        .rounds()
        .map(|r| matches_by_round(&bracket, r).len())
        .collect();
    assert_eq!(sizes, vec![16, 8, 4, 2, 1]);
}

#[test]
fn opening_round_follows_team_count() {
    let cases = [
        (2, Round::Final),
        (4, Round::Semifinals),
        (8, Round::RoundOf8),
        (16, Round::RoundOf16),
        (32, Round::RoundOf32),
    ];
    for (n, round) in cases {
        let bracket = generate(teams(n)).unwrap();
        assert_eq!(bracket.initial_round(), round);
        assert_eq!(bracket.rounds().last(), Some(Round::Final));
    }
}

#[test]
fn unsupported_team_counts_are_rejected() {
    for n in [0, 1, 3, 5, 6, 7, 12, 33, 64] {
        assert_eq!(
            generate(teams(n)),
            Err(BracketError::InvalidTeamCount { count: n }),
            "{n} teams"
        );
    }
}

#[test]
fn duplicate_team_ids_are_rejected() {
    let mut entries = teams(4);
    entries[3] = Team::with_id(entries[0].id, "Copy of T0");
    assert_eq!(
        generate(entries.clone()),
        Err(BracketError::DuplicateTeam(entries[0].id))
    );
}

#[test]
fn next_match_number_is_ceil_half_and_in_range() {
    for n in [2, 4, 8, 16, 32] {
        let bracket = generate(teams(n)).unwrap();
        for m in bracket.matches() {
            match m.round().next() {
                Some(next) => {
                    let target = m.next_match_number().unwrap();
                    assert_eq!(target, m.match_number().div_ceil(2));
                    assert!(target >= 1 && target <= next.match_count());
                    assert!(bracket.find(next, target).is_some());
                }
                None => assert_eq!(m.next_match_number(), None),
            }
        }
    }
}

#[test]
fn quarterfinal_pointers_never_point_at_match_zero() {
    let bracket = generate(teams(8)).unwrap();
    let pointers: Vec<Option<u32>> = matches_by_round(&bracket, Round::RoundOf8)
        .iter()
        .map(|m| m.next_match_number())
        .collect();
    assert_eq!(pointers, vec![Some(1), Some(1), Some(2), Some(2)]);
}

#[test]
fn only_opening_round_is_seeded() {
    let bracket = generate(teams(16)).unwrap();
    for m in bracket.matches() {
        if m.round() == Round::RoundOf16 {
            assert_eq!(m.status(), MatchStatus::Ready);
        } else {
            assert_eq!(m.status(), MatchStatus::Unscheduled);
            assert!(m.team_1().is_none() && m.team_2().is_none());
        }
        assert!(m.winner().is_none());
    }
}

#[test]
fn consecutive_shuffled_teams_are_paired() {
    let entries = teams(8);
    let mut expected: Vec<_> = entries.iter().map(|t| t.id).collect();
    expected.shuffle(&mut StdRng::seed_from_u64(7));

    let bracket = generate_with_rng(entries, &mut StdRng::seed_from_u64(7)).unwrap();
    for (i, m) in matches_by_round(&bracket, Round::RoundOf8).iter().enumerate() {
        assert_eq!(m.match_number() as usize, i + 1);
        assert_eq!(m.team_1().unwrap().id, expected[2 * i]);
        assert_eq!(m.team_2().unwrap().id, expected[2 * i + 1]);
    }
}

#[test]
fn every_team_is_seeded_exactly_once() {
    let entries = teams(32);
    let ids: HashSet<_> = entries.iter().map(|t| t.id).collect();
    let bracket = generate(entries).unwrap();
    let seeded: Vec<_> = matches_by_round(&bracket, Round::RoundOf32)
        .iter()
        .flat_map(|m| [m.team_1().unwrap().id, m.team_2().unwrap().id])
        .collect();
    assert_eq!(seeded.len(), 32);
    assert_eq!(seeded.into_iter().collect::<HashSet<_>>(), ids);
}

#[test]
fn match_ids_are_unique() {
    let bracket = generate(teams(32)).unwrap();
    let ids: HashSet<_> = bracket.matches().iter().map(|m| m.id()).collect();
    assert_eq!(ids.len(), 31);
}

#[test]
fn team_visuals_are_carried_through() {
    let jersey = serde_json::json!({ "primary": "#ff0000", "number_font": "block" });
    let entries = vec![
        Team::new("Reds").with_visuals(jersey.clone()),
        Team::new("Blues"),
    ];
    let bracket = generate(entries).unwrap();
    let m = &bracket.matches()[0];
    let reds = [m.team_1().unwrap(), m.team_2().unwrap()]
        .into_iter()
        .find(|t| t.name == "Reds")
        .unwrap();
    assert_eq!(reds.visuals, jersey);
}
