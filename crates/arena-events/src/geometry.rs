//! Grid Geometry
//!
//! Cell coordinates, movement directions and distances on the square board.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell on the board. `x` grows to the right, `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one step in `direction`. May lie off the board;
    /// `None` when the coordinate itself would overflow.
    pub fn step(self, direction: Direction) -> Option<Self> {
        let (dx, dy) = direction.delta();
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }

    /// Whether this cell lies within `[0, board_size)` on both axes.
    pub fn in_bounds(self, board_size: u32) -> bool {
        let size = i64::from(board_size);
        (0..size).contains(&i64::from(self.x)) && (0..size).contains(&i64::from(self.y))
    }

    /// Sum of absolute coordinate differences.
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x).saturating_add(self.y.abs_diff(other.y))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four orthogonal movement directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit vector for this direction. Up decreases `y`.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_follows_unit_vectors() {
        let origin = Position::new(2, 2);
        assert_eq!(origin.step(Direction::Up), Some(Position::new(2, 1)));
        assert_eq!(origin.step(Direction::Down), Some(Position::new(2, 3)));
        assert_eq!(origin.step(Direction::Left), Some(Position::new(1, 2)));
        assert_eq!(origin.step(Direction::Right), Some(Position::new(3, 2)));
    }

    #[test]
    fn test_step_past_coordinate_limits() {
        assert_eq!(Position::new(i32::MAX, 0).step(Direction::Right), None);
        assert_eq!(Position::new(0, i32::MIN).step(Direction::Up), None);
        assert_eq!(
            Position::new(0, 0).step(Direction::Up),
            Some(Position::new(0, -1))
        );
    }

    #[test]
    fn test_in_bounds() {
        assert!(Position::new(0, 0).in_bounds(5));
        assert!(Position::new(4, 4).in_bounds(5));
        assert!(!Position::new(5, 0).in_bounds(5));
        assert!(!Position::new(0, -1).in_bounds(5));
        assert!(!Position::new(0, 0).in_bounds(0));
    }

    #[test]
    fn test_manhattan_distance() {
        let a = Position::new(0, 0);
        assert_eq!(a.manhattan_distance(Position::new(3, 0)), 3);
        assert_eq!(a.manhattan_distance(Position::new(2, 2)), 4);
        assert_eq!(Position::new(-1, 4).manhattan_distance(Position::new(1, 1)), 5);
    }

    #[test]
    fn test_direction_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Direction::Left).unwrap(), "\"left\"");
        let parsed: Direction = serde_json::from_str("\"up\"").unwrap();
        assert_eq!(parsed, Direction::Up);
    }
}
