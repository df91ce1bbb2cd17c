//! Target Bots
//!
//! Focus fire on the weakest or strongest enemy: attack it when in range,
//! otherwise close the distance.

use arena_events::{Action, Direction, EnemyView, Observation, Position, ATTACK_RANGE};

use super::{Bot, BotError};

/// Which enemy a [`TargetBot`] goes after
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetPreference {
    /// Lowest health first
    Weakest,
    /// Highest health first
    Strongest,
}

impl TargetPreference {
    /// Whether `candidate` should replace `current` as the chosen target.
    /// Ties keep the earlier (alphabetically smaller) name.
    fn prefers(self, candidate: &EnemyView, current: &EnemyView) -> bool {
        match self {
            TargetPreference::Weakest => candidate.health < current.health,
            TargetPreference::Strongest => candidate.health > current.health,
        }
    }

    fn pick<'a>(
        self,
        enemies: impl Iterator<Item = (&'a String, &'a EnemyView)>,
    ) -> Option<(&'a String, &'a EnemyView)> {
        enemies.fold(None, |best, (name, enemy)| match best {
            Some((_, current)) if !self.prefers(enemy, current) => best,
            _ => Some((name, enemy)),
        })
    }
}

#[derive(Debug, Clone)]
pub struct TargetBot {
    name: String,
    preference: TargetPreference,
}

impl TargetBot {
    pub fn new(name: impl Into<String>, preference: TargetPreference) -> Self {
        Self {
            name: name.into(),
            preference,
        }
    }

    pub fn weakest(name: impl Into<String>) -> Self {
        Self::new(name, TargetPreference::Weakest)
    }

    pub fn strongest(name: impl Into<String>) -> Self {
        Self::new(name, TargetPreference::Strongest)
    }
}

impl Bot for TargetBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn act(&mut self, observation: &Observation) -> Result<Action, BotError> {
        if let Some((name, _)) = self.preference.pick(observation.enemies_within(ATTACK_RANGE)) {
            return Ok(Action::attack(name.as_str()));
        }

        let (_, quarry) = self
            .preference
            .pick(observation.enemies.iter())
            .ok_or_else(|| BotError::Failed("no enemies to chase".to_string()))?;

        approach(observation, quarry.position)
            .map(Action::Move)
            .ok_or_else(|| BotError::Failed("no free cell towards target".to_string()))
    }
}

/// A direction that shrinks the distance to `goal` without stepping onto a
/// cell a visible enemy stands on. The longer axis is tried first.
fn approach(observation: &Observation, goal: Position) -> Option<Direction> {
    let from = observation.position;
    let dx = goal.x - from.x;
    let dy = goal.y - from.y;

    let horizontal = match dx.signum() {
        1 => Some(Direction::Right),
        -1 => Some(Direction::Left),
        _ => None,
    };
    let vertical = match dy.signum() {
        1 => Some(Direction::Down),
        -1 => Some(Direction::Up),
        _ => None,
    };
    let ordered = if dx.abs() >= dy.abs() {
        [horizontal, vertical]
    } else {
        [vertical, horizontal]
    };

    ordered.into_iter().flatten().find(|direction| {
        from.step(*direction).is_some_and(|to| {
            to.in_bounds(observation.board_size)
                && !observation.enemies.values().any(|e| e.position == to)
        })
    })
}
