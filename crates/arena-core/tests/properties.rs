//! World invariants under randomized play
//!
//! Seeded matches between the built-in bots, checking after every round that
//! the board stays consistent.

use std::collections::{HashMap, HashSet};

use arena_core::bots::{RandomBot, TargetBot};
use arena_core::{RoundReport, TurnEngine};
use arena_events::{Position, RoundEvent, WorldSnapshot, ATTACK_RANGE, STARTING_HEALTH};

fn mixed_engine(seed: u64, board_size: u32) -> TurnEngine {
    let mut engine = TurnEngine::new(board_size, seed);
    engine.register_agent(RandomBot::new("Rand", seed)).unwrap();
    engine.register_agent(RandomBot::new("Rand", seed + 1)).unwrap();
    engine.register_agent(TargetBot::weakest("Weak")).unwrap();
    engine.register_agent(TargetBot::strongest("Strong")).unwrap();
    engine
}

fn assert_consistent(snapshot: &WorldSnapshot) {
    let mut occupied = HashSet::new();
    for agent in &snapshot.agents {
        assert!(
            agent.position.in_bounds(snapshot.board_size),
            "{} left the board at {}",
            agent.name,
            agent.position
        );
        assert!(agent.health <= STARTING_HEALTH);
        assert_eq!(agent.alive, agent.health > 0);
        if agent.alive {
            assert!(
                occupied.insert(agent.position),
                "two living agents share {}",
                agent.position
            );
        }
    }
}

fn assert_progress(before: &WorldSnapshot, report: &RoundReport) {
    let after = &report.snapshot;
    assert_eq!(after.round, before.round + 1);

    for agent in &after.agents {
        let previous = before.agent(&agent.name).unwrap();
        assert!(agent.health <= previous.health, "{} regained health", agent.name);
        let hits = report
            .events
            .iter()
            .filter(|e| matches!(e, RoundEvent::Attacked { target, .. } if *target == agent.name))
            .count() as u32;
        assert_eq!(previous.health - agent.health, hits.min(previous.health));
        if !previous.alive {
            assert_eq!(agent.position, previous.position, "defeated agent moved");
        }
    }
}

#[test]
fn test_randomized_matches_keep_invariants() {
    for seed in 0..20u64 {
        let mut engine = mixed_engine(seed, 5);
        assert_consistent(&engine.snapshot());

        let mut rounds = 0;
        while !engine.is_match_over() && rounds < 500 {
            let before = engine.snapshot();
            let report = engine.resolve_round();
            assert_consistent(&report.snapshot);
            assert_progress(&before, &report);
            rounds += 1;
        }
    }
}

#[test]
fn test_accepted_attacks_are_in_range() {
    for seed in 0..10u64 {
        let mut engine = mixed_engine(seed, 7);
        let mut rounds = 0;
        while !engine.is_match_over() && rounds < 300 {
            let before = engine.snapshot();
            let report = engine.resolve_round();

            // Replay the round in turn order to recover positions at each attack
            let mut positions: HashMap<String, Position> = before
                .agents
                .iter()
                .map(|a| (a.name.clone(), a.position))
                .collect();
            for event in &report.events {
                match event {
                    RoundEvent::Moved { agent, from, to, .. } => {
                        assert_eq!(positions[agent], *from);
                        assert_eq!(from.manhattan_distance(*to), 1);
                        positions.insert(agent.clone(), *to);
                    }
                    RoundEvent::Attacked { agent, target, .. } => {
                        assert_ne!(agent, target);
                        let distance = positions[agent].manhattan_distance(positions[target]);
                        assert!(distance <= ATTACK_RANGE, "{} hit {} from {} away", agent, target, distance);
                    }
                    _ => {}
                }
            }
            rounds += 1;
        }
    }
}

#[test]
fn test_attack_only_touches_its_target() {
    for seed in 0..10u64 {
        let mut engine = mixed_engine(seed, 5);
        let mut rounds = 0;
        while !engine.is_match_over() && rounds < 300 {
            let before = engine.snapshot();
            let report = engine.resolve_round();

            let targets: HashSet<&str> = report
                .events
                .iter()
                .filter_map(|e| match e {
                    RoundEvent::Attacked { target, .. } => Some(target.as_str()),
                    _ => None,
                })
                .collect();
            for agent in &report.snapshot.agents {
                if !targets.contains(agent.name.as_str()) {
                    assert_eq!(agent.health, before.agent(&agent.name).unwrap().health);
                }
            }
            rounds += 1;
        }
    }
}
