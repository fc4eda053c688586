//! Grid Vector
//!
//! Integer 2D grid coordinates and the eight compass directions.
//! Cells are addressed with `x` growing east and `y` growing north.

use std::fmt;
use std::ops::{Add, Sub};
use serde::{Serialize, Deserialize};

/// Integer grid coordinate.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Vector {
    /// Column (0 = west edge)
    pub x: i32,
    /// Row (0 = south edge)
    pub y: i32,
}

impl Vector {
    /// Origin cell.
    pub const ZERO: Self = Self { x: 0, y: 0 };

    /// Create a new grid coordinate.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance (king moves on the grid).
    #[inline]
    pub fn chebyshev(self, other: Self) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Squared euclidean distance.
    #[inline]
    pub fn distance_squared(self, other: Self) -> i32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Offset by a direction.
    #[inline]
    pub fn step(self, dir: Direction) -> Self {
        self + dir.delta()
    }
}

impl Add for Vector {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vector {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl fmt::Debug for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// =============================================================================
// DIRECTION
// =============================================================================

/// Facing direction as encoded in the log (0 = no facing).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    /// No facing
    #[default]
    Center = 0,
    /// -x
    West = 1,
    /// -x, -y
    Southwest = 2,
    /// -y
    South = 3,
    /// +x, -y
    Southeast = 4,
    /// +x
    East = 5,
    /// +x, +y
    Northeast = 6,
    /// +y
    North = 7,
    /// -x, +y
    Northwest = 8,
}

impl Direction {
    /// All directions in wire order.
    pub const ALL: [Direction; 9] = [
        Direction::Center,
        Direction::West,
        Direction::Southwest,
        Direction::South,
        Direction::Southeast,
        Direction::East,
        Direction::Northeast,
        Direction::North,
        Direction::Northwest,
    ];

    /// Decode from the wire value. Unknown values fall back to `Center`.
    pub fn from_index(index: u8) -> Direction {
        Self::ALL.get(index as usize).copied().unwrap_or_default()
    }

    /// Unit step for this direction.
    pub fn delta(self) -> Vector {
        match self {
            Direction::Center => Vector::new(0, 0),
            Direction::West => Vector::new(-1, 0),
            Direction::Southwest => Vector::new(-1, -1),
            Direction::South => Vector::new(0, -1),
            Direction::Southeast => Vector::new(1, -1),
            Direction::East => Vector::new(1, 0),
            Direction::Northeast => Vector::new(1, 1),
            Direction::North => Vector::new(0, 1),
            Direction::Northwest => Vector::new(-1, 1),
        }
    }

    /// Human-readable name, as shown in hover info.
    pub fn name(self) -> &'static str {
        match self {
            Direction::Center => "None",
            Direction::West => "West",
            Direction::Southwest => "Southwest",
            Direction::South => "South",
            Direction::Southeast => "Southeast",
            Direction::East => "East",
            Direction::Northeast => "Northeast",
            Direction::North => "North",
            Direction::Northwest => "Northwest",
        }
    }
}
