//! Seek determinism across whole matches.
//!
//! Every path to a round (stepping, backward jumps, snapshot restore, timed
//! playback) must land on the same fingerprint.

use std::sync::Arc;

use proptest::prelude::*;

use playback::core::vec2::{Direction, Vector};
use playback::playback::{KindTable, Match, PlaybackConfig, PlaybackMode, ReplayError};
use playback::schema::{
    ActionRecord, Event, MapRecord, MatchHeader, RobotKind, RoundDelta, SpawnRecord, TurnRecord,
};
use playback::testkit::{synthetic_events, synthetic_match, SyntheticOptions};
use playback::Game;

fn complete_match(rounds: u32, snapshot_every: u32) -> Match {
    let config = PlaybackConfig { snapshot_every, ..Default::default() };
    let mut game_match = synthetic_match(&SyntheticOptions { rounds, config, ..Default::default() }).unwrap();
    game_match.mark_stream_complete();
    game_match
}

#[test]
fn test_repeated_seek_is_idempotent() {
    let mut game_match = complete_match(80, 40);
    game_match.jump_to_round(57).unwrap();
    let first = game_match.fingerprint().unwrap();

    game_match.jump_to_round(57).unwrap();
    assert_eq!(game_match.fingerprint().unwrap(), first);
    assert_eq!(game_match.current_round().turn_number(), 0);
}

#[test]
fn test_snapshot_restore_matches_forward_replay() {
    let mut forward = complete_match(120, 40);
    let mut fingerprints = Vec::new();
    for round in 1..=121 {
        forward.jump_to_round(round).unwrap();
        fingerprints.push(forward.fingerprint().unwrap());
    }
    assert_eq!(forward.snapshot_rounds(), vec![1, 41, 81, 121]);

    // Backward jumps restore from snapshots; compare against the stepped run.
    for round in (1..=121).rev().step_by(7) {
        forward.jump_to_round(round).unwrap();
        assert_eq!(forward.fingerprint().unwrap(), fingerprints[round as usize - 1], "round {}", round);
    }
}

#[test]
fn test_stats_do_not_change_once_computed() {
    let mut game_match = complete_match(70, 40);
    game_match.jump_to_round(60).unwrap();
    let before: Vec<_> = (0..=60).map(|r| game_match.stat(r).cloned().unwrap()).collect();
    assert!(before.iter().all(|s| s.is_completed()));

    game_match.jump_to_round(5).unwrap();
    game_match.jump_to_round(71).unwrap();
    game_match.jump_to_round(33).unwrap();
    for (round, stat) in before.iter().enumerate() {
        assert_eq!(game_match.stat(round as u32), Some(stat), "round {}", round);
    }
}

#[test]
fn test_streaming_match_holds_back_last_rounds() {
    let options = SyntheticOptions { rounds: 30, ..Default::default() };
    let events = synthetic_events(&options);

    // Header plus the rounds, no footers.
    let streamed: Vec<Event> = events.iter().take(2 + 30).cloned().collect();
    let mut game = Game::from_events(streamed, PlaybackConfig::default()).unwrap();
    let game_match = game.current_match_mut().unwrap();
    assert!(!game_match.is_complete());
    game_match.jump_to_end().unwrap();
    assert_eq!(game_match.current_round().round_number(), 31 - 2);

    let mut game = Game::from_events(events, PlaybackConfig::default()).unwrap();
    let game_match = game.current_match_mut().unwrap();
    game_match.jump_to_end().unwrap();
    assert_eq!(game_match.current_round().round_number(), 31);
}

#[test]
fn test_seek_before_any_round_fails() {
    let mut game_match = synthetic_match(&SyntheticOptions { rounds: 0, ..Default::default() }).unwrap();
    assert_eq!(game_match.jump_to_round(1), Err(ReplayError::NoSnapshot));
}

#[test]
fn test_timed_playback_matches_seek() {
    let mut played = complete_match(20, 40);
    played.jump_to_start().unwrap();
    for _ in 0..9 {
        played.step_simulation_by_time(1.0).unwrap();
    }
    // Settle onto turn 0 the way a seek leaves it.
    played.set_playback_mode(PlaybackMode::PerRound).unwrap();
    assert_eq!(played.current_round().round_number(), 10);

    let mut seeked = complete_match(20, 40);
    seeked.jump_to_round(10).unwrap();
    assert_eq!(played.fingerprint().unwrap(), seeked.fingerprint().unwrap());
}

// =============================================================================
// TURN ORDER
// =============================================================================

const CHEESE_CELL: Vector = Vector { x: 2, y: 1 };

fn two_rat_header() -> MatchHeader {
    let rat = |id, team, x| SpawnRecord {
        id,
        team,
        kind: RobotKind::Rat,
        pos: Vector::new(x, 1),
        dir: Direction::East,
        chirality: 0,
    };
    MatchHeader {
        map: MapRecord {
            name: "duel".into(),
            random_seed: 1,
            symmetry: 0,
            width: 5,
            height: 3,
            walls: vec![0; 15],
            dirt: vec![0; 15],
            cheese_mines: vec![],
            cat_waypoints: Default::default(),
        },
        initial_bodies: vec![rat(1, 1, 1), rat(2, 2, 3)],
        max_rounds: 2,
    }
}

fn race_for_cheese(first: u32, second: u32) -> Match {
    let mut game_match =
        Match::new(&two_rat_header(), Arc::new(KindTable::default()), PlaybackConfig::default()).unwrap();

    let spawn = RoundDelta {
        round_id: 1,
        turns: vec![
            TurnRecord::idle(1, Vector::new(1, 1), 100)
                .with_action(ActionRecord::CheeseSpawn { loc: CHEESE_CELL, amount: 7 }),
            TurnRecord::idle(2, Vector::new(3, 1), 100),
        ],
        ..Default::default()
    };
    let race = RoundDelta {
        round_id: 2,
        turns: vec![
            TurnRecord::idle(first, CHEESE_CELL, 100).with_action(ActionRecord::CheesePickup { loc: CHEESE_CELL }),
            TurnRecord::idle(second, CHEESE_CELL, 100).with_action(ActionRecord::CheesePickup { loc: CHEESE_CELL }),
        ],
        ..Default::default()
    };
    game_match.add_new_round(spawn).unwrap();
    game_match.add_new_round(race).unwrap();
    game_match.mark_stream_complete();

    game_match.jump_to_round(2).unwrap();
    game_match.jump_to_turn(2).unwrap();
    game_match
}

#[test]
fn test_first_mover_takes_the_cheese() {
    let rat_one_first = race_for_cheese(1, 2);
    let bodies = rat_one_first.current_round().bodies();
    assert_eq!(bodies.get(1).unwrap().cheese, 7);
    assert_eq!(bodies.get(2).unwrap().cheese, 0);
    assert_eq!(rat_one_first.current_round().map().cheese_at(CHEESE_CELL).unwrap(), 0);

    let rat_two_first = race_for_cheese(2, 1);
    let bodies = rat_two_first.current_round().bodies();
    assert_eq!(bodies.get(1).unwrap().cheese, 0);
    assert_eq!(bodies.get(2).unwrap().cheese, 7);

    assert_ne!(rat_one_first.fingerprint().unwrap(), rat_two_first.fingerprint().unwrap());
}

#[test]
fn test_pickup_rewinds_within_round() {
    let mut game_match = race_for_cheese(1, 2);
    game_match.jump_to_turn(0).unwrap();
    assert_eq!(game_match.current_round().map().cheese_at(CHEESE_CELL).unwrap(), 7);
    assert_eq!(game_match.current_round().bodies().get(1).unwrap().cheese, 0);

    game_match.jump_to_turn(1).unwrap();
    assert_eq!(game_match.current_round().bodies().get(1).unwrap().cheese, 7);
    assert_eq!(game_match.current_round().last_stepped_robot_id(), Some(1));
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_seek_path_does_not_matter(
        path in prop::collection::vec(1u32..=61, 1..8),
        target in 1u32..=61,
    ) {
        let mut direct = complete_match(60, 10);
        direct.jump_to_round(target).unwrap();
        let expected = direct.fingerprint().unwrap();

        let mut wandering = complete_match(60, 10);
        for round in path {
            wandering.jump_to_round(round).unwrap();
        }
        wandering.jump_to_round(target).unwrap();
        prop_assert_eq!(wandering.fingerprint().unwrap(), expected);
    }

    #[test]
    fn prop_turn_seek_is_reversible(round in 1u32..=30, turn_a in 0u32..6, turn_b in 0u32..6) {
        let mut game_match = complete_match(30, 40);
        game_match.set_playback_mode(PlaybackMode::PerTurn).unwrap();
        game_match.jump_to_round(round).unwrap();
        let turns = game_match.current_round().turns_len();
        let (a, b) = (turn_a.min(turns), turn_b.min(turns));

        game_match.jump_to_turn(a).unwrap();
        let at_a = game_match.fingerprint().unwrap();
        game_match.jump_to_turn(b).unwrap();
        game_match.jump_to_turn(a).unwrap();
        prop_assert_eq!(game_match.fingerprint().unwrap(), at_a);
    }
}
