//! Action Rules
//!
//! Validation of an agent's action against the current world. Validation is
//! pure: it reports what would happen and leaves applying it to the engine.

use arena_events::{Action, Direction, Position, RejectReason, ATTACK_RANGE};

use crate::world::{Agent, WorldState};

/// The state change an accepted action produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Move {
        direction: Direction,
        from: Position,
        to: Position,
    },
    Damage {
        target: String,
    },
}

/// Check `action` for `actor` against the world as it is right now.
pub fn validate(world: &WorldState, actor: &Agent, action: &Action) -> Result<Effect, RejectReason> {
    match action {
        Action::Move(direction) => validate_move(world, actor, *direction),
        Action::Attack(target) => validate_attack(world, actor, target),
    }
}

fn validate_move(world: &WorldState, actor: &Agent, direction: Direction) -> Result<Effect, RejectReason> {
    let to = actor
        .position
        .step(direction)
        .filter(|to| to.in_bounds(world.board_size()))
        .ok_or(RejectReason::OutOfBounds)?;
    if world
        .occupant(to)
        .is_some_and(|occupant| occupant.name != actor.name)
    {
        return Err(RejectReason::CellOccupied);
    }
    Ok(Effect::Move {
        direction,
        from: actor.position,
        to,
    })
}

fn validate_attack(world: &WorldState, actor: &Agent, target: &str) -> Result<Effect, RejectReason> {
    if target == actor.name {
        return Err(RejectReason::SelfTarget);
    }
    let victim = world.agent(target).ok_or(RejectReason::UnknownTarget)?;
    if !victim.is_alive() {
        return Err(RejectReason::TargetDefeated);
    }
    if actor.position.manhattan_distance(victim.position) > ATTACK_RANGE {
        return Err(RejectReason::OutOfRange);
    }
    Ok(Effect::Damage {
        target: victim.name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with(agents: &[(&str, i32, i32)]) -> WorldState {
        let mut world = WorldState::new(5);
        for (name, x, y) in agents {
            world.register_agent_at(name, Position::new(*x, *y)).unwrap();
        }
        world
    }

    fn check(world: &WorldState, actor: &str, action: Action) -> Result<Effect, RejectReason> {
        let agent = world.agent(actor).unwrap();
        validate(world, agent, &action)
    }

    #[test]
    fn test_move_into_free_cell() {
        let world = world_with(&[("A", 2, 2)]);
        assert_eq!(
            check(&world, "A", Action::Move(Direction::Up)),
            Ok(Effect::Move {
                direction: Direction::Up,
                from: Position::new(2, 2),
                to: Position::new(2, 1),
            })
        );
    }

    #[test]
    fn test_move_off_board_rejected() {
        let world = world_with(&[("A", 0, 0)]);
        assert_eq!(
            check(&world, "A", Action::Move(Direction::Left)),
            Err(RejectReason::OutOfBounds)
        );
        assert_eq!(
            check(&world, "A", Action::Move(Direction::Up)),
            Err(RejectReason::OutOfBounds)
        );
    }

    #[test]
    fn test_move_into_living_agent_rejected() {
        let world = world_with(&[("A", 0, 0), ("B", 1, 0)]);
        assert_eq!(
            check(&world, "A", Action::Move(Direction::Right)),
            Err(RejectReason::CellOccupied)
        );
    }

    #[test]
    fn test_move_onto_defeated_agent_allowed() {
        let mut world = world_with(&[("A", 0, 0), ("B", 1, 0)]);
        world.set_health("B", 0);
        assert!(check(&world, "A", Action::Move(Direction::Right)).is_ok());
    }

    #[test]
    fn test_attack_at_exact_range() {
        let world = world_with(&[("A", 0, 0), ("B", 3, 0)]);
        assert_eq!(
            check(&world, "B", Action::attack("A")),
            Ok(Effect::Damage {
                target: "A".to_string()
            })
        );
    }

    #[test]
    fn test_attack_rejections() {
        let mut world = world_with(&[("A", 0, 0), ("B", 2, 2), ("C", 4, 4)]);
        assert_eq!(check(&world, "A", Action::attack("C")), Err(RejectReason::OutOfRange));
        assert_eq!(check(&world, "A", Action::attack("A")), Err(RejectReason::SelfTarget));
        assert_eq!(check(&world, "A", Action::attack("Z")), Err(RejectReason::UnknownTarget));

        world.set_health("B", 0);
        assert_eq!(check(&world, "A", Action::attack("B")), Err(RejectReason::TargetDefeated));
    }
}
