//! Grid Geometry
//!
//! Integer positions and the four orthogonal movement directions.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// A position (or offset) on the tile grid.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Vector {
    pub x: i32,
    pub y: i32,
}

impl Vector {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The four orthogonally adjacent positions, in up/right/down/left order.
    pub fn orthogonal_neighbours(self) -> [Vector; 4] {
        [
            Vector::new(self.x, self.y - 1),
            Vector::new(self.x + 1, self.y),
            Vector::new(self.x, self.y + 1),
            Vector::new(self.x - 1, self.y),
        ]
    }

    /// True when `other` is exactly one orthogonal step away.
    pub fn is_orthogonal_neighbour(self, other: Vector) -> bool {
        (other.x - self.x).abs() + (other.y - self.y).abs() == 1
    }

    /// Squared euclidean length. Used for distance ordering without sqrt.
    pub fn magnitude_squared(self) -> i64 {
        let x = self.x as i64;
        let y = self.y as i64;
        x * x + y * y
    }

    /// Manhattan distance to `other`.
    pub fn manhattan(self, other: Vector) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Vector) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector {
    type Output = Vector;

    fn sub(self, rhs: Vector) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vector {
    fn sub_assign(&mut self, rhs: Vector) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl fmt::Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four orthogonal movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All directions, in clockwise order starting from up.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// The unit offset this direction represents. Up decreases y.
    pub fn delta(self) -> Vector {
        match self {
            Direction::Up => Vector::new(0, -1),
            Direction::Right => Vector::new(1, 0),
            Direction::Down => Vector::new(0, 1),
            Direction::Left => Vector::new(-1, 0),
        }
    }

    /// Direction from `origin` toward `destination`.
    ///
    /// Same-row targets resolve horizontally; everything else resolves
    /// vertically, so diagonal targets prefer the vertical axis.
    pub fn from_vectors(origin: Vector, destination: Vector) -> Direction {
        if origin.y == destination.y {
            if destination.x < origin.x {
                Direction::Left
            } else {
                Direction::Right
            }
        } else if destination.y < origin.y {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
