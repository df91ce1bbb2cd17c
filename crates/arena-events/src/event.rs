//! Round Events
//!
//! What happened during a round, and how a match ended.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::action::Action;
use crate::geometry::{Direction, Position};

/// Why a well-formed action was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Destination lies off the board
    OutOfBounds,
    /// Destination holds a living agent
    CellOccupied,
    /// No agent with that name
    UnknownTarget,
    /// Target has no health left
    TargetDefeated,
    /// Agents may not attack themselves
    SelfTarget,
    /// Target is further than the attack range
    OutOfRange,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RejectReason::OutOfBounds => "destination out of bounds",
            RejectReason::CellOccupied => "destination occupied",
            RejectReason::UnknownTarget => "unknown target",
            RejectReason::TargetDefeated => "target already defeated",
            RejectReason::SelfTarget => "cannot target self",
            RejectReason::OutOfRange => "target out of range",
        };
        f.write_str(text)
    }
}

/// A single agent's turn outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoundEvent {
    Moved {
        agent: String,
        direction: Direction,
        from: Position,
        to: Position,
    },
    Attacked {
        agent: String,
        target: String,
        target_health: u32,
        defeated: bool,
    },
    Rejected {
        agent: String,
        action: Action,
        reason: RejectReason,
    },
    DecisionFailed {
        agent: String,
        reason: String,
    },
}

impl RoundEvent {
    /// Name of the agent whose turn produced this event
    pub fn agent(&self) -> &str {
        match self {
            RoundEvent::Moved { agent, .. }
            | RoundEvent::Attacked { agent, .. }
            | RoundEvent::Rejected { agent, .. }
            | RoundEvent::DecisionFailed { agent, .. } => agent,
        }
    }
}

/// How a match ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Exactly one agent is left standing
    Victory { winner: String },
    /// Nobody survived
    NoSurvivors,
    /// The round cap was hit with several agents still alive
    RoundLimit { survivors: Vec<String> },
}

/// Terminal summary of a bounded match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub rounds: u64,
    #[serde(flatten)]
    pub outcome: MatchOutcome,
}

impl MatchResult {
    pub fn winner(&self) -> Option<&str> {
        match &self.outcome {
            MatchOutcome::Victory { winner } => Some(winner.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            MatchOutcome::Victory { winner } => {
                write!(f, "Winner: {} after {} rounds", winner, self.rounds)
            }
            MatchOutcome::NoSurvivors => write!(f, "Winner: None after {} rounds", self.rounds),
            MatchOutcome::RoundLimit { survivors } => write!(
                f,
                "No winner after {} rounds; still standing: {}",
                self.rounds,
                survivors.join(", ")
            ),
        }
    }
}
