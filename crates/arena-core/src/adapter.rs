//! Agent Adapter
//!
//! Read-then-decide boundary around a bot: builds its observation from the
//! world and turns every kind of decision failure into an explicit no-op.

use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use arena_events::{Action, EnemyView, Observation};
use tracing::warn;

use crate::bots::{Bot, BotError};
use crate::world::WorldState;

/// Name used when a bot reports a blank one
pub const FALLBACK_NAME: &str = "bot";

/// Why a bot's turn produced no action
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecisionFailure {
    #[error(transparent)]
    Bot(#[from] BotError),
    #[error("decision panicked: {0}")]
    Panicked(String),
    #[error("decision took {elapsed:?}, budget is {budget:?}")]
    TimedOut { elapsed: Duration, budget: Duration },
}

/// Result of asking a bot for its move
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Act(Action),
    NoOp(DecisionFailure),
}

/// Trim a proposed name, falling back to `fallback` when nothing is left
pub fn normalize_name(raw: &str, fallback: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Wraps an externally supplied bot
pub struct AgentAdapter {
    name: String,
    bot: Box<dyn Bot>,
    /// Calls slower than this are discarded
    budget: Option<Duration>,
}

impl AgentAdapter {
    pub fn new(name: impl Into<String>, bot: Box<dyn Bot>) -> Self {
        Self {
            name: name.into(),
            bot,
            budget: None,
        }
    }

    pub fn with_budget(mut self, budget: Option<Duration>) -> Self {
        self.budget = budget;
        self
    }

    /// The unique name this agent was registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build the view `self_name` gets of the world: its own health and
    /// position plus every other living agent. `None` if no such agent.
    pub fn observe(state: &WorldState, self_name: &str) -> Option<Observation> {
        let me = state.agent(self_name)?;
        let enemies = state
            .agents()
            .iter()
            .filter(|other| other.is_alive() && other.name != self_name)
            .map(|other| {
                (
                    other.name.clone(),
                    EnemyView {
                        health: other.health,
                        position: other.position,
                    },
                )
            })
            .collect();

        Some(Observation {
            health: me.health,
            position: me.position,
            board_size: state.board_size(),
            enemies,
        })
    }

    /// Ask the bot for an action. Errors, panics and overruns become
    /// [`Decision::NoOp`] and are logged; they never propagate.
    pub fn decide(&mut self, observation: &Observation) -> Decision {
        let started = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.bot.act(observation)));
        let elapsed = started.elapsed();

        let failure = match outcome {
            Ok(Ok(action)) => match self.budget {
                Some(budget) if elapsed > budget => DecisionFailure::TimedOut { elapsed, budget },
                _ => return Decision::Act(action),
            },
            Ok(Err(e)) => DecisionFailure::Bot(e),
            Err(payload) => DecisionFailure::Panicked(panic_message(payload.as_ref())),
        };

        warn!(agent = %self.name, error = %failure, "decision failed, skipping turn");
        Decision::NoOp(failure)
    }
}

impl std::fmt::Debug for AgentAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentAdapter")
            .field("name", &self.name)
            .field("budget", &self.budget)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
