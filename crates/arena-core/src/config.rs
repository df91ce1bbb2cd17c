//! Configuration loading for the arena.
//!
//! Board, seed, pacing and the starting roster are loaded from a TOML file.
//! Every section is optional; missing values fall back to defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use arena_events::{Position, MAX_BOARD_SIZE};
use serde::{Deserialize, Serialize};

/// Complete arena configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Match rules
    #[serde(default)]
    pub arena: ArenaSettings,
    /// Persistent mode settings
    #[serde(default)]
    pub server: ServerSettings,
    /// Bots registered before the first round
    #[serde(default)]
    pub bots: Vec<BotSpec>,
}

impl ArenaConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes this configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks values that parse fine but cannot be run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.arena.board_size == 0 {
            return Err(ConfigError::Invalid("arena.board_size must be at least 1".to_string()));
        }
        if self.arena.board_size > MAX_BOARD_SIZE {
            return Err(ConfigError::Invalid(format!(
                "arena.board_size must be at most {}, got {}",
                MAX_BOARD_SIZE, self.arena.board_size
            )));
        }
        if self.server.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "server.tick_interval_ms must be at least 1".to_string(),
            ));
        }
        if let Some(bot) = self.bots.iter().find(|b| b.kind.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "bot entry {:?} has an empty kind",
                bot.name
            )));
        }
        Ok(())
    }
}

/// Match rule settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    /// Side length of the square board
    pub board_size: u32,
    /// Seed for spawn placement and random bots; drawn from entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Cap on rounds for bounded matches
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rounds: Option<u64>,
    /// Decisions slower than this many milliseconds are discarded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision_budget_ms: Option<u64>,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            board_size: 5,
            seed: None,
            max_rounds: None,
            decision_budget_ms: None,
        }
    }
}

impl ArenaSettings {
    pub fn decision_budget(&self) -> Option<Duration> {
        self.decision_budget_ms.map(Duration::from_millis)
    }
}

/// Persistent mode settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Wall-clock time between rounds
    pub tick_interval_ms: u64,
    /// Append every round's snapshot to this JSONL file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_log: Option<PathBuf>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            snapshot_log: None,
        }
    }
}

impl ServerSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// One bot in the starting roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotSpec {
    /// Registry kind, e.g. `random` or `weakest`
    pub kind: String,
    /// Display name; the kind's default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Fixed spawn cell; a random free cell when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    /// Action lines for `scripted` bots
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub script: Vec<String>,
}

impl BotSpec {
    pub fn of_kind(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: None,
            position: None,
            script: Vec::new(),
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ArenaConfig::from_str("").unwrap();
        assert_eq!(config, ArenaConfig::default());
        assert_eq!(config.arena.board_size, 5);
        assert_eq!(config.server.tick_interval(), Duration::from_secs(1));
        assert!(config.bots.is_empty());
    }

    #[test]
    fn test_full_config() {
        let config = ArenaConfig::from_str(
            r#"
            [arena]
            board_size = 8
            seed = 7
            max_rounds = 500
            decision_budget_ms = 50

            [server]
            tick_interval_ms = 250
            snapshot_log = "output/snapshots.jsonl"

            [[bots]]
            kind = "random"

            [[bots]]
            kind = "scripted"
            name = "Turret"
            position = { x = 3, y = 4 }
            script = ['{"kind":"attack","arg":"RandomBot"}']
            "#,
        )
        .unwrap();

        assert_eq!(config.arena.board_size, 8);
        assert_eq!(config.arena.seed, Some(7));
        assert_eq!(config.arena.max_rounds, Some(500));
        assert_eq!(config.arena.decision_budget(), Some(Duration::from_millis(50)));
        assert_eq!(config.server.tick_interval(), Duration::from_millis(250));
        assert_eq!(
            config.server.snapshot_log,
            Some(PathBuf::from("output/snapshots.jsonl"))
        );
        assert_eq!(config.bots.len(), 2);
        assert_eq!(config.bots[1].name.as_deref(), Some("Turret"));
        assert_eq!(config.bots[1].position, Some(Position::new(3, 4)));
        assert_eq!(config.bots[1].script.len(), 1);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            ArenaConfig::from_str("[arena]\nboard_size = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ArenaConfig::from_str("[arena]\nboard_size = 1025"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ArenaConfig::from_str("[arena]\nboard_size = 4294967295"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(ArenaConfig::from_str("[arena]\nboard_size = 1024").is_ok());
        assert!(matches!(
            ArenaConfig::from_str("[server]\ntick_interval_ms = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ArenaConfig::from_str("[[bots]]\nkind = \"\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ArenaConfig::from_str("[arena]\nboard_size = \"big\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = ArenaConfig::default();
        config.arena.seed = Some(3);
        config.bots.push(BotSpec::of_kind("weakest"));

        let text = config.to_toml().unwrap();
        assert_eq!(ArenaConfig::from_str(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let err = ArenaConfig::from_file(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(err.to_string().starts_with("could not read does/not/exist.toml"));
    }
}
