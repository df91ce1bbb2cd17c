//! Snapshot Types
//!
//! Immutable copies of the world handed to observers after each round.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Position;

/// Per-agent entry in a world snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub name: String,
    pub health: u32,
    pub position: Position,
    pub alive: bool,
}

/// The complete state of a match after a round.
///
/// Agents are listed in registration order, defeated ones included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub match_id: Uuid,
    pub round: u64,
    pub board_size: u32,
    pub agents: Vec<AgentSnapshot>,
}

impl WorldSnapshot {
    pub fn agent(&self, name: &str) -> Option<&AgentSnapshot> {
        self.agents.iter().find(|a| a.name == name)
    }

    pub fn living(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.agents.iter().filter(|a| a.alive)
    }

    pub fn is_match_over(&self) -> bool {
        self.living().count() <= 1
    }

    /// The sole surviving agent, if exactly one is alive
    pub fn winner(&self) -> Option<&str> {
        let mut living = self.living();
        match (living.next(), living.next()) {
            (Some(agent), None) => Some(agent.name.as_str()),
            _ => None,
        }
    }
}
