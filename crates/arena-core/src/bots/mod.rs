//! Bots
//!
//! The decision capability every agent implements, the built-in strategies,
//! and the registry that builds them by kind.

pub mod random;
pub mod registry;
pub mod scripted;
pub mod target;

use arena_events::{Action, Observation};

pub use random::RandomBot;
pub use registry::{BotOptions, BotRegistry, RegistryError};
pub use scripted::ScriptedBot;
pub use target::{TargetBot, TargetPreference};

/// Errors a decision function may return instead of an action
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BotError {
    /// The bot could not come up with an action
    #[error("decision failed: {0}")]
    Failed(String),
    /// The bot produced something that is not a valid action
    #[error("malformed action: {0}")]
    Malformed(String),
}

/// Decision logic driving one agent.
///
/// `act` is called at most once per round with the agent's current view of the
/// world. Errors and panics are treated as "do nothing this round".
pub trait Bot: Send {
    /// Proposed display name. The arena may add a suffix to keep names unique.
    fn name(&self) -> &str;

    fn act(&mut self, observation: &Observation) -> Result<Action, BotError>;
}

impl<B: Bot + ?Sized> Bot for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn act(&mut self, observation: &Observation) -> Result<Action, BotError> {
        (**self).act(observation)
    }
}
