//! Working Memory
//!
//! The actor-local blackboard: a nested key-value store addressed by
//! dotted paths. Values are a closed set of kinds so a read can tell
//! "absent" apart from "present but the wrong kind".

use std::collections::BTreeMap;
use std::fmt;

use crate::actor::ActorId;
use crate::geometry::{Direction, Vector};

/// A dotted path addressing a value in working memory, e.g. `movement.path`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemoryPath(Vec<String>);

impl MemoryPath {
    /// Build a path from pre-split segments. Empty segments are a caller bug.
    pub fn new(segments: Vec<String>) -> Self {
        debug_assert!(!segments.is_empty() && segments.iter().all(|s| !s.is_empty()));
        Self(segments)
    }

    /// Parse a dotted path string.
    pub fn parse(path: &str) -> Self {
        Self(path.split('.').map(str::to_owned).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for MemoryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl From<&str> for MemoryPath {
    fn from(path: &str) -> Self {
        MemoryPath::parse(path)
    }
}

/// A value storable in working memory. Closed set: anything a tree node
/// communicates to a later node is one of these kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Knowledge {
    Position(Vector),
    Direction(Direction),
    Actor(ActorId),
    Actors(Vec<ActorId>),
    Positions(Vec<Vector>),
    Number(f32),
    Flag(bool),
}

impl Knowledge {
    /// The kind name used in wrong-kind diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Knowledge::Position(_) => "position",
            Knowledge::Direction(_) => "direction",
            Knowledge::Actor(_) => "actor",
            Knowledge::Actors(_) => "actors",
            Knowledge::Positions(_) => "positions",
            Knowledge::Number(_) => "number",
            Knowledge::Flag(_) => "flag",
        }
    }

    pub fn as_position(&self) -> Option<Vector> {
        match self {
            Knowledge::Position(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_direction(&self) -> Option<Direction> {
        match self {
            Knowledge::Direction(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_actor(&self) -> Option<ActorId> {
        match self {
            Knowledge::Actor(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_actors(&self) -> Option<&[ActorId]> {
        match self {
            Knowledge::Actors(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f32> {
        match self {
            Knowledge::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Knowledge::Flag(value) => Some(*value),
            _ => None,
        }
    }
}

/// One slot in the nested store: either a value or a deeper table.
#[derive(Debug, Clone)]
enum Entry {
    Value(Knowledge),
    Table(BTreeMap<String, Entry>),
}

/// An actor's transient working memory. Never reset between ticks; entries
/// live until a node explicitly forgets them.
#[derive(Debug, Clone, Default)]
pub struct Blackboard {
    root: BTreeMap<String, Entry>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Read the value at `path`. Missing segments and intermediate values
    /// both read as absent.
    pub fn get(&self, path: &MemoryPath) -> Option<&Knowledge> {
        let (last, ancestors) = path.segments().split_last()?;
        let table = self.table(ancestors)?;
        match table.get(last)? {
            Entry::Value(value) => Some(value),
            Entry::Table(_) => None,
        }
    }

    /// Mutable access to the value at `path`, for in-place edits such as
    /// consuming waypoints off a stored path.
    pub fn get_mut(&mut self, path: &MemoryPath) -> Option<&mut Knowledge> {
        let (last, ancestors) = path.segments().split_last()?;
        let mut table = &mut self.root;
        for segment in ancestors {
            match table.get_mut(segment)? {
                Entry::Table(nested) => table = nested,
                Entry::Value(_) => return None,
            }
        }
        match table.get_mut(last)? {
            Entry::Value(value) => Some(value),
            Entry::Table(_) => None,
        }
    }

    /// Write `value` at `path`, creating intermediate tables as needed.
    /// Replaces whatever was there, value or table.
    pub fn set(&mut self, path: &MemoryPath, value: Knowledge) {
        let Some((last, ancestors)) = path.segments().split_last() else {
            return;
        };
        let mut table = &mut self.root;
        for segment in ancestors {
            let entry = table
                .entry(segment.clone())
                .and_modify(|entry| {
                    if let Entry::Value(_) = entry {
                        *entry = Entry::Table(BTreeMap::new());
                    }
                })
                .or_insert_with(|| Entry::Table(BTreeMap::new()));
            match entry {
                Entry::Table(nested) => table = nested,
                Entry::Value(_) => unreachable!("value entries replaced above"),
            }
        }
        table.insert(last.clone(), Entry::Value(value));
    }

    /// Remove and return the value at `path`. Removing a missing path is a
    /// no-op; intermediate tables are left in place.
    pub fn remove(&mut self, path: &MemoryPath) -> Option<Knowledge> {
        let (last, ancestors) = path.segments().split_last()?;
        let mut table = &mut self.root;
        for segment in ancestors {
            match table.get_mut(segment)? {
                Entry::Table(nested) => table = nested,
                Entry::Value(_) => return None,
            }
        }
        match table.get(last)? {
            Entry::Value(_) => match table.remove(last)? {
                Entry::Value(value) => Some(value),
                Entry::Table(_) => None,
            },
            Entry::Table(_) => None,
        }
    }

    fn table(&self, segments: &[String]) -> Option<&BTreeMap<String, Entry>> {
        let mut table = &self.root;
        for segment in segments {
            match table.get(segment)? {
                Entry::Table(nested) => table = nested,
                Entry::Value(_) => return None,
            }
        }
        Some(table)
    }
}
