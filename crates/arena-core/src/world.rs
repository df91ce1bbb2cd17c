//! World State
//!
//! The authoritative grid: every registered agent with its health and position,
//! the board dimension and the round counter.

use std::collections::HashMap;

use arena_events::{AgentSnapshot, Position, WorldSnapshot, MAX_BOARD_SIZE, STARTING_HEALTH};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::warn;
use uuid::Uuid;

/// Random probes for a free cell before falling back to listing every cell
const PLACEMENT_ATTEMPTS: usize = 64;

/// Errors surfaced to the caller of a registration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// Every cell already holds a living agent
    #[error("board is full: no free cell on a {board_size}x{board_size} board")]
    BoardFull { board_size: u32 },
    /// Requested spawn cell lies off the board
    #[error("position {position} is outside a {board_size}x{board_size} board")]
    OutOfBounds { position: Position, board_size: u32 },
    /// Requested spawn cell holds a living agent
    #[error("position {position} is occupied by {occupant}")]
    CellOccupied { position: Position, occupant: String },
}

/// A registered agent. Defeated agents stay in the world with zero health.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Agent {
    pub name: String,
    pub health: u32,
    pub position: Position,
}

impl Agent {
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// Grid, agents and round counter for a single match
#[derive(Debug, Clone)]
pub struct WorldState {
    match_id: Uuid,
    board_size: u32,
    round: u64,
    /// Agents in registration order
    agents: Vec<Agent>,
    /// Maps agent name -> index into `agents`
    index: HashMap<String, usize>,
}

impl WorldState {
    /// An empty world. Sizes above [`MAX_BOARD_SIZE`] are clamped to it.
    pub fn new(board_size: u32) -> Self {
        if board_size > MAX_BOARD_SIZE {
            warn!(board_size, max = MAX_BOARD_SIZE, "board size clamped");
        }
        Self {
            match_id: Uuid::new_v4(),
            board_size: board_size.min(MAX_BOARD_SIZE),
            round: 0,
            agents: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn match_id(&self) -> Uuid {
        self.match_id
    }

    pub fn board_size(&self) -> u32 {
        self.board_size
    }

    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn agent(&self, name: &str) -> Option<&Agent> {
        self.index.get(name).map(|&i| &self.agents[i])
    }

    /// All agents in registration order
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Names of all agents in registration order
    pub fn roster(&self) -> Vec<String> {
        self.agents.iter().map(|a| a.name.clone()).collect()
    }

    pub fn living_count(&self) -> usize {
        self.agents.iter().filter(|a| a.is_alive()).count()
    }

    /// The living agent standing on `position`, if any
    pub fn occupant(&self, position: Position) -> Option<&Agent> {
        self.agents
            .iter()
            .find(|a| a.is_alive() && a.position == position)
    }

    /// True once at most one agent is still alive
    pub fn is_match_over(&self) -> bool {
        self.living_count() <= 1
    }

    /// The sole living agent, if exactly one remains
    pub fn winner(&self) -> Option<&str> {
        let mut living = self.agents.iter().filter(|a| a.is_alive());
        match (living.next(), living.next()) {
            (Some(agent), None) => Some(agent.name.as_str()),
            _ => None,
        }
    }

    /// Number of cells on the board
    pub fn cell_count(&self) -> u64 {
        u64::from(self.board_size) * u64::from(self.board_size)
    }

    /// Cells without a living agent, in row-major order
    pub fn free_cells(&self) -> Vec<Position> {
        let size = self.board_size as i32;
        (0..size)
            .flat_map(|y| (0..size).map(move |x| Position::new(x, y)))
            .filter(|cell| self.occupant(*cell).is_none())
            .collect()
    }

    /// Make `proposed` unique by appending `_1`, `_2`, ... on collision.
    /// Defeated agents still reserve their names.
    pub fn resolve_name(&self, proposed: &str) -> String {
        if !self.index.contains_key(proposed) {
            return proposed.to_string();
        }
        let mut suffix = 1u32;
        loop {
            let candidate = format!("{}_{}", proposed, suffix);
            if !self.index.contains_key(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Register an agent on a uniformly random free cell.
    ///
    /// Returns the name actually assigned, which may carry a numeric suffix.
    pub fn register_agent<R: Rng + ?Sized>(
        &mut self,
        name: &str,
        rng: &mut R,
    ) -> Result<String, WorldError> {
        let position = self
            .random_free_cell(rng)
            .ok_or(WorldError::BoardFull {
                board_size: self.board_size,
            })?;
        Ok(self.insert(name, position))
    }

    /// Uniform pick among free cells. Sparse boards are probed at random
    /// (rejection sampling); dense ones list their free cells.
    fn random_free_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Position> {
        let cells = self.cell_count();
        let living = self.living_count() as u64;
        if living >= cells {
            return None;
        }

        if living * 2 < cells {
            let size = self.board_size as i32;
            for _ in 0..PLACEMENT_ATTEMPTS {
                let cell = Position::new(rng.gen_range(0..size), rng.gen_range(0..size));
                if self.occupant(cell).is_none() {
                    return Some(cell);
                }
            }
        }
        self.free_cells().choose(rng).copied()
    }

    /// Register an agent on a specific cell
    pub fn register_agent_at(
        &mut self,
        name: &str,
        position: Position,
    ) -> Result<String, WorldError> {
        if !position.in_bounds(self.board_size) {
            return Err(WorldError::OutOfBounds {
                position,
                board_size: self.board_size,
            });
        }
        if let Some(occupant) = self.occupant(position) {
            return Err(WorldError::CellOccupied {
                position,
                occupant: occupant.name.clone(),
            });
        }
        Ok(self.insert(name, position))
    }

    fn insert(&mut self, name: &str, position: Position) -> String {
        let name = self.resolve_name(name);
        self.index.insert(name.clone(), self.agents.len());
        self.agents.push(Agent {
            name: name.clone(),
            health: STARTING_HEALTH,
            position,
        });
        name
    }

    /// Immutable copy for external consumption
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            match_id: self.match_id,
            round: self.round,
            board_size: self.board_size,
            agents: self
                .agents
                .iter()
                .map(|a| AgentSnapshot {
                    name: a.name.clone(),
                    health: a.health,
                    position: a.position,
                    alive: a.is_alive(),
                })
                .collect(),
        }
    }

    pub(crate) fn advance_round(&mut self) {
        self.round += 1;
    }

    pub(crate) fn move_agent(&mut self, name: &str, to: Position) {
        if let Some(&i) = self.index.get(name) {
            self.agents[i].position = to;
        }
    }

    /// Remove one health point from `name`, never going below zero.
    /// Returns the remaining health.
    pub(crate) fn damage(&mut self, name: &str) -> u32 {
        match self.index.get(name) {
            Some(&i) => {
                let agent = &mut self.agents[i];
                agent.health = agent.health.saturating_sub(1);
                agent.health
            }
            None => 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn set_health(&mut self, name: &str, health: u32) {
        if let Some(&i) = self.index.get(name) {
            self.agents[i].health = health;
        }
    }
}
