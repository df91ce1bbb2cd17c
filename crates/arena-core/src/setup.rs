//! Arena Setup
//!
//! Builds an engine from configuration and places the starting roster.

use tracing::info;

use crate::bots::{BotOptions, BotRegistry};
use crate::config::{ArenaConfig, BotSpec};
use crate::engine::TurnEngine;
use crate::ArenaError;

/// Seed for the bot at `index` in the roster, derived from the arena seed
pub fn bot_seed(arena_seed: u64, index: usize) -> u64 {
    arena_seed.wrapping_add(1).wrapping_add(index as u64)
}

/// Options for building the bot described by `spec`
pub fn bot_options(spec: &BotSpec, seed: u64) -> BotOptions {
    BotOptions {
        name: spec.name.clone(),
        seed,
        script: spec.script.clone(),
    }
}

/// Create an engine for `config` using `seed`, and register every configured
/// bot in order. Fails on the first bot that cannot be built or placed.
pub fn build_engine(
    config: &ArenaConfig,
    registry: &BotRegistry,
    seed: u64,
) -> Result<TurnEngine, ArenaError> {
    let mut engine = TurnEngine::new(config.arena.board_size, seed)
        .with_decision_budget(config.arena.decision_budget());

    for (index, spec) in config.bots.iter().enumerate() {
        let bot = registry.create(&spec.kind, &bot_options(spec, bot_seed(seed, index)))?;
        let name = match spec.position {
            Some(position) => engine.register_agent_at(bot, position)?,
            None => engine.register_agent(bot)?,
        };
        info!(agent = %name, kind = %spec.kind, "spawned");
    }

    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_events::Position;

    #[test]
    fn test_build_engine_places_roster() {
        let mut config = ArenaConfig::default();
        config.bots.push(BotSpec::of_kind("random"));
        config.bots.push(BotSpec::of_kind("random"));
        config.bots.push(BotSpec {
            position: Some(Position::new(2, 2)),
            name: Some("Sentry".to_string()),
            ..BotSpec::of_kind("weakest")
        });

        let engine = build_engine(&config, &BotRegistry::with_builtins(), 11).unwrap();

        assert_eq!(
            engine.world().roster(),
            vec!["RandomBot", "RandomBot_1", "Sentry"]
        );
        assert_eq!(engine.world().agent("Sentry").unwrap().position, Position::new(2, 2));
    }

    #[test]
    fn test_build_engine_unknown_kind() {
        let mut config = ArenaConfig::default();
        config.bots.push(BotSpec::of_kind("psychic"));

        let err = build_engine(&config, &BotRegistry::with_builtins(), 1).unwrap_err();
        assert!(matches!(err, ArenaError::Registry(_)));
    }

    #[test]
    fn test_build_engine_overfull_board() {
        let mut config = ArenaConfig::default();
        config.arena.board_size = 1;
        config.bots.push(BotSpec::of_kind("random"));
        config.bots.push(BotSpec::of_kind("random"));

        let err = build_engine(&config, &BotRegistry::with_builtins(), 1).unwrap_err();
        assert!(matches!(err, ArenaError::World(_)));
    }

    #[test]
    fn test_bot_seeds_differ_per_slot() {
        assert_ne!(bot_seed(42, 0), bot_seed(42, 1));
        assert_eq!(bot_seed(u64::MAX, 0), 0);
    }
}
