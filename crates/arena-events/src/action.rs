//! Actions and Observations
//!
//! What an agent sees before deciding, and what it may decide to do.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::geometry::{Direction, Position};

/// A decision produced by an agent for one round.
///
/// Serialized as `{"kind": "move", "arg": "up"}` or
/// `{"kind": "attack", "arg": "<target name>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "arg", rename_all = "snake_case")]
pub enum Action {
    /// Step one cell in a direction
    Move(Direction),
    /// Hit the named agent for one point of damage
    Attack(String),
}

impl Action {
    pub fn attack(target: impl Into<String>) -> Self {
        Action::Attack(target.into())
    }

    /// Parse an action from its JSON form. Unknown kinds and directions are errors.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move(direction) => write!(f, "move {}", direction),
            Action::Attack(target) => write!(f, "attack {}", target),
        }
    }
}

/// Another living agent as seen by the observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyView {
    pub health: u32,
    pub position: Position,
}

/// Read-only view of the world handed to an agent's decision function.
///
/// Only living agents other than the observer appear in `enemies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub health: u32,
    pub position: Position,
    pub board_size: u32,
    pub enemies: BTreeMap<String, EnemyView>,
}

impl Observation {
    pub fn has_enemies(&self) -> bool {
        !self.enemies.is_empty()
    }

    /// Enemies within `range` of the observer, in name order
    pub fn enemies_within(&self, range: u32) -> impl Iterator<Item = (&String, &EnemyView)> {
        let origin = self.position;
        self.enemies
            .iter()
            .filter(move |(_, enemy)| origin.manhattan_distance(enemy.position) <= range)
    }

    /// Directions whose destination stays on the board
    pub fn legal_directions(&self) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|d| {
                self.position
                    .step(*d)
                    .is_some_and(|to| to.in_bounds(self.board_size))
            })
            .collect()
    }
}
