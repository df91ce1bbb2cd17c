//! Turn Engine
//!
//! Resolves one round at a time. Agents act one after another in registration
//! order, and every applied action is visible to the agents that act after it
//! in the same round.

use std::collections::HashMap;
use std::time::Duration;

use arena_events::{Action, Position, RoundEvent, WorldSnapshot};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, debug_span, info};

use crate::adapter::{normalize_name, AgentAdapter, Decision, FALLBACK_NAME};
use crate::bots::Bot;
use crate::rules::{self, Effect};
use crate::world::{WorldError, WorldState};

/// Everything that came out of one round
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    /// World state after the round
    pub snapshot: WorldSnapshot,
    /// One entry per agent that got as far as deciding, in turn order
    pub events: Vec<RoundEvent>,
}

/// Owns the world and the bots that drive it
pub struct TurnEngine {
    world: WorldState,
    adapters: HashMap<String, AgentAdapter>,
    /// Used for spawn placement only
    rng: SmallRng,
    decision_budget: Option<Duration>,
}

impl TurnEngine {
    pub fn new(board_size: u32, seed: u64) -> Self {
        Self {
            world: WorldState::new(board_size),
            adapters: HashMap::new(),
            rng: SmallRng::seed_from_u64(seed),
            decision_budget: None,
        }
    }

    /// Discard decisions that take longer than `budget`
    pub fn with_decision_budget(mut self, budget: Option<Duration>) -> Self {
        self.decision_budget = budget;
        self
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        self.world.snapshot()
    }

    pub fn is_match_over(&self) -> bool {
        self.world.is_match_over()
    }

    pub fn winner(&self) -> Option<&str> {
        self.world.winner()
    }

    /// Add a bot on a random free cell. Returns its unique name.
    ///
    /// A bot registered while a round is being resolved first acts next round.
    pub fn register_agent<B: Bot + 'static>(&mut self, bot: B) -> Result<String, WorldError> {
        let proposed = normalize_name(bot.name(), FALLBACK_NAME);
        let name = self.world.register_agent(&proposed, &mut self.rng)?;
        Ok(self.attach(name, Box::new(bot)))
    }

    /// Add a bot on a specific cell
    pub fn register_agent_at<B: Bot + 'static>(
        &mut self,
        bot: B,
        position: Position,
    ) -> Result<String, WorldError> {
        let proposed = normalize_name(bot.name(), FALLBACK_NAME);
        let name = self.world.register_agent_at(&proposed, position)?;
        Ok(self.attach(name, Box::new(bot)))
    }

    fn attach(&mut self, name: String, bot: Box<dyn Bot>) -> String {
        let position = self.world.agent(&name).map(|a| a.position);
        info!(agent = %name, position = ?position, "agent registered");
        let adapter = AgentAdapter::new(name.clone(), bot).with_budget(self.decision_budget);
        self.adapters.insert(name.clone(), adapter);
        name
    }

    /// Resolve one round and return the resulting snapshot
    pub fn step(&mut self) -> WorldSnapshot {
        self.resolve_round().snapshot
    }

    /// Resolve one round, keeping a record of every turn.
    ///
    /// With fewer than two living agents nothing acts, but the round counter
    /// still advances.
    pub fn resolve_round(&mut self) -> RoundReport {
        let round = self.world.round() + 1;
        let span = debug_span!("round", round);
        let _enter = span.enter();

        let roster = self.world.roster();
        let mut events = Vec::new();

        if self.world.living_count() >= 2 {
            for name in &roster {
                let alive = self.world.agent(name).is_some_and(|a| a.is_alive());
                if alive {
                    self.take_turn(name, &mut events);
                }
            }
        } else {
            debug!(living = self.world.living_count(), "not enough living agents, nothing to do");
        }

        self.world.advance_round();
        RoundReport {
            snapshot: self.world.snapshot(),
            events,
        }
    }

    fn take_turn(&mut self, name: &str, events: &mut Vec<RoundEvent>) {
        let Some(observation) = AgentAdapter::observe(&self.world, name) else {
            return;
        };
        // Unreachable through resolve_round, which needs two living agents
        // and always leaves the last attacker standing
        if !observation.has_enemies() {
            return;
        }
        let Some(adapter) = self.adapters.get_mut(name) else {
            return;
        };

        match adapter.decide(&observation) {
            Decision::Act(action) => self.apply(name, action, events),
            Decision::NoOp(failure) => events.push(RoundEvent::DecisionFailed {
                agent: name.to_string(),
                reason: failure.to_string(),
            }),
        }
    }

    fn apply(&mut self, name: &str, action: Action, events: &mut Vec<RoundEvent>) {
        let Some(actor) = self.world.agent(name) else {
            return;
        };

        match rules::validate(&self.world, actor, &action) {
            Ok(Effect::Move {
                direction,
                from,
                to,
            }) => {
                self.world.move_agent(name, to);
                info!(agent = %name, %direction, %to, "{} moves {} to {}", name, direction, to);
                events.push(RoundEvent::Moved {
                    agent: name.to_string(),
                    direction,
                    from,
                    to,
                });
            }
            Ok(Effect::Damage { target }) => {
                let remaining = self.world.damage(&target);
                info!(agent = %name, target = %target, health = remaining, "{} shoots {}", name, target);
                if remaining == 0 {
                    info!(agent = %target, by = %name, "agent defeated");
                }
                events.push(RoundEvent::Attacked {
                    agent: name.to_string(),
                    target,
                    target_health: remaining,
                    defeated: remaining == 0,
                });
            }
            Err(reason) => {
                debug!(agent = %name, %action, %reason, "action rejected");
                events.push(RoundEvent::Rejected {
                    agent: name.to_string(),
                    action,
                    reason,
                });
            }
        }
    }
}

impl std::fmt::Debug for TurnEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnEngine")
            .field("world", &self.world)
            .field("decision_budget", &self.decision_budget)
            .finish_non_exhaustive()
    }
}
