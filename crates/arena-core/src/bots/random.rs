//! Random Bot
//!
//! Attacks a random enemy in range half of the time, otherwise wanders.

use arena_events::{Action, Direction, Observation, ATTACK_RANGE};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::{Bot, BotError};

#[derive(Debug)]
pub struct RandomBot {
    name: String,
    rng: SmallRng,
}

impl RandomBot {
    pub const DEFAULT_NAME: &'static str = "RandomBot";

    pub fn new(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Bot for RandomBot {
    fn name(&self) -> &str {
        &self.name
    }

    fn act(&mut self, observation: &Observation) -> Result<Action, BotError> {
        let in_range: Vec<&String> = observation
            .enemies_within(ATTACK_RANGE)
            .map(|(name, _)| name)
            .collect();

        if !in_range.is_empty() && self.rng.gen_bool(0.5) {
            if let Some(target) = in_range.choose(&mut self.rng) {
                return Ok(Action::attack(target.as_str()));
            }
        }

        let direction = *Direction::ALL
            .choose(&mut self.rng)
            .ok_or_else(|| BotError::Failed("no directions".to_string()))?;
        Ok(Action::Move(direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_events::{EnemyView, Position};
    use std::collections::BTreeMap;

    fn observation(enemy_at: Position) -> Observation {
        let mut enemies = BTreeMap::new();
        enemies.insert(
            "Target".to_string(),
            EnemyView {
                health: 10,
                position: enemy_at,
            },
        );
        Observation {
            health: 10,
            position: Position::new(0, 0),
            board_size: 5,
            enemies,
        }
    }

    #[test]
    fn test_only_attacks_enemies_in_range() {
        let mut bot = RandomBot::new("R", 5);
        let far = observation(Position::new(4, 4));
        for _ in 0..50 {
            assert!(matches!(bot.act(&far).unwrap(), Action::Move(_)));
        }
    }

    #[test]
    fn test_attacks_sometimes_when_in_range() {
        let mut bot = RandomBot::new("R", 5);
        let near = observation(Position::new(1, 1));
        let attacks = (0..100)
            .filter(|_| bot.act(&near).unwrap() == Action::attack("Target"))
            .count();
        assert!(attacks > 0 && attacks < 100);
    }

    #[test]
    fn test_same_seed_same_choices() {
        let near = observation(Position::new(1, 1));
        let mut a = RandomBot::new("R", 42);
        let mut b = RandomBot::new("R", 42);
        for _ in 0..20 {
            assert_eq!(a.act(&near), b.act(&near));
        }
    }
}
