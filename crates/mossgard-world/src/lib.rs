//! Simulation host: the tile world, its actors, and the narrow
//! query/mutation surface behaviour trees act through.
//!
//! This crate knows nothing about behaviour trees. It owns the grid map,
//! the actor table and the seeded RNG, and exposes movement, combat and
//! battle-preparation as single committed actions per call.

pub mod action;
pub mod actor;
pub mod geometry;
pub mod handler;
pub mod map;
pub mod memory;
pub mod pathfinding;

pub use action::{Action, BattleKind};
pub use actor::{Actor, ActorId};
pub use geometry::{Direction, Vector};
pub use handler::{BlockedMovement, GameHandler};
pub use map::{GridMap, MapParseError, Tile};
pub use memory::{Blackboard, Knowledge, MemoryPath};
pub use pathfinding::a_star;
