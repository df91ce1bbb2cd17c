//! Bot Registry
//!
//! Builds bots by kind name. Stands in for loading decision code at runtime:
//! every strategy is compiled in and registered under a short kind.

use std::collections::BTreeMap;
use std::fmt;

use super::{Bot, RandomBot, ScriptedBot, TargetBot};

/// Errors that can occur when building a bot
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown bot kind '{kind}' (available: {available})")]
    UnknownBot { kind: String, available: String },
}

/// Inputs for constructing a bot
#[derive(Debug, Clone, Default)]
pub struct BotOptions {
    /// Display name; the kind's default name is used when absent
    pub name: Option<String>,
    /// Seed for bots with random behaviour
    pub seed: u64,
    /// Action lines for scripted bots
    pub script: Vec<String>,
}

impl BotOptions {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_script(mut self, script: Vec<String>) -> Self {
        self.script = script;
        self
    }

    fn name_or(&self, default: &str) -> String {
        self.name.clone().unwrap_or_else(|| default.to_string())
    }
}

/// Constructor registered for a bot kind
pub type BotFactory = fn(&BotOptions) -> Box<dyn Bot>;

/// Maps kind names to bot constructors
pub struct BotRegistry {
    factories: BTreeMap<String, BotFactory>,
}

impl fmt::Debug for BotRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

impl Default for BotRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl BotRegistry {
    /// A registry with no kinds
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A registry with the `random`, `weakest`, `strongest` and `scripted` kinds
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register("random", |opts| {
            Box::new(RandomBot::new(opts.name_or(RandomBot::DEFAULT_NAME), opts.seed))
        });
        registry.register("weakest", |opts| {
            Box::new(TargetBot::weakest(opts.name_or("WeakestBot")))
        });
        registry.register("strongest", |opts| {
            Box::new(TargetBot::strongest(opts.name_or("StrongestBot")))
        });
        registry.register("scripted", |opts| {
            Box::new(ScriptedBot::new(
                opts.name_or(ScriptedBot::DEFAULT_NAME),
                opts.script.clone(),
            ))
        });
        registry
    }

    /// Add or replace a kind
    pub fn register(&mut self, kind: impl Into<String>, factory: BotFactory) {
        self.factories.insert(kind.into(), factory);
    }

    /// Registered kind names, sorted
    pub fn kinds(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn create(&self, kind: &str, options: &BotOptions) -> Result<Box<dyn Bot>, RegistryError> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| RegistryError::UnknownBot {
                kind: kind.to_string(),
                available: self.kinds().join(", "),
            })?;
        Ok(factory(options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_kinds() {
        let registry = BotRegistry::with_builtins();
        assert_eq!(registry.kinds(), vec!["random", "scripted", "strongest", "weakest"]);
    }

    #[test]
    fn test_default_and_custom_names() {
        let registry = BotRegistry::with_builtins();
        let bot = registry.create("weakest", &BotOptions::seeded(1)).unwrap();
        assert_eq!(bot.name(), "WeakestBot");

        let bot = registry
            .create("random", &BotOptions::seeded(1).with_name("Rex"))
            .unwrap();
        assert_eq!(bot.name(), "Rex");
    }

    #[test]
    fn test_unknown_kind() {
        let registry = BotRegistry::with_builtins();
        let err = registry
            .create("genius", &BotOptions::default())
            .err()
            .expect("unknown kind should be rejected");
        assert_eq!(
            err.to_string(),
            "unknown bot kind 'genius' (available: random, scripted, strongest, weakest)"
        );
    }
}
