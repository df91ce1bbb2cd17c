//! Bot arena: a turn-based combat game on a square grid.
//!
//! Independent bots, each driven by its own decision logic, move and attack
//! until one is left standing.
//!
//! # Modules
//!
//! - [`world`]: authoritative grid, health and positions
//! - [`adapter`]: observation building and the decision failure boundary
//! - [`rules`]: action validation
//! - [`engine`]: resolution of a single round
//! - [`controller`]: bounded and persistent match drivers
//! - [`sink`]: per-round snapshot delivery
//! - [`bots`]: the `Bot` capability, built-in strategies and registry
//! - [`config`]: TOML configuration
//! - [`setup`]: building an engine from configuration

pub mod adapter;
pub mod bots;
pub mod config;
pub mod controller;
pub mod engine;
pub mod rules;
pub mod setup;
pub mod sink;
pub mod world;

pub use adapter::{AgentAdapter, Decision, DecisionFailure};
pub use bots::{Bot, BotError, BotOptions, BotRegistry, RegistryError};
pub use config::{ArenaConfig, BotSpec, ConfigError};
pub use controller::{MatchController, MatchHandle, PersistentMatch};
pub use engine::{RoundReport, TurnEngine};
pub use sink::{ChannelSink, FanoutSink, JsonlSink, LogSink, NullSink, RoundSink, SinkError};
pub use world::{Agent, WorldError, WorldState};

/// Errors surfaced by arena setup and the command line.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("world error: {0}")]
    World(#[from] WorldError),
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("match task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("need at least two bots to start the game, got {0}")]
    NotEnoughBots(usize),
}
