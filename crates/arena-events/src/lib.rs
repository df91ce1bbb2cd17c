//! Shared data types for the bot arena.
//!
//! This crate contains pure data structures with no simulation logic.
//! Everything here is serializable so observers can consume it directly.

pub mod action;
pub mod event;
pub mod geometry;
pub mod snapshot;

/// Health every agent starts a match with.
pub const STARTING_HEALTH: u32 = 10;

/// Maximum Manhattan distance at which an attack lands.
pub const ATTACK_RANGE: u32 = 3;

/// Largest supported side length. Keeps every coordinate well inside `i32`.
pub const MAX_BOARD_SIZE: u32 = 1024;

pub use action::{Action, EnemyView, Observation};
pub use event::{MatchOutcome, MatchResult, RejectReason, RoundEvent};
pub use geometry::{Direction, Position};
pub use snapshot::{AgentSnapshot, WorldSnapshot};
