//! Leaf Nodes
//!
//! Leaves are where a tree touches the world: they query surroundings,
//! read and write the acting actor's memory, and commit actions through
//! the game handler. Every leaf carries its memory wiring (an optional
//! input slot and an optional output path) resolved at compile time, so
//! evaluation never parses paths.

mod battle;
mod inspect;
mod movement;
mod select;

use mossgard_world::{ActorId, BattleKind, Direction, GameHandler, Knowledge, MemoryPath, Vector};
use rand::Rng;
use tracing::warn;

use crate::status::Status;
use crate::tree::EvalContext;

pub use inspect::{CompareOp, Inspect, InspectTarget, Operand};

/// Well-known memory paths leaves default to when a tree does not rewire
/// them explicitly.
pub mod paths {
    pub const FOUND_ACTORS: &str = "found_actors";
    pub const SELECTED_ACTOR: &str = "selected_actor";
    pub const INSPECTED_ACTOR: &str = "inspected_actor";
    pub const MOVE_DIRECTION: &str = "move_direction";
    pub const MOVEMENT_PATH: &str = "movement.path";
    pub const MOVEMENT_DESTINATION: &str = "movement.destination";
}

/// Sort order for `sort-actors`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    Distance,
    Attribute(String),
}

/// Faction relation kept by `filter-actors`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactionFilter {
    Any,
    Enemy,
    Friend,
}

/// The concrete operation a leaf performs, with its compile-time
/// arguments already parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum LeafKind {
    FindNeighbours,
    FindAround { horizontal: i32, vertical: i32 },
    SortActors { key: SortKey, reverse: bool },
    FilterActors(FactionFilter),
    SelectFirst,
    SelectAny,
    SelectInspected,
    PrepareToBattle(BattleKind),
    CalculateAttackDirection,
    CalculateFleeDirection,
    CalculateRandomDirection,
    CalculatePreviousDirection,
    CalculatePath,
    CalculatePathDirection,
    CheckDirection,
    Move,
    Wait,
    Inspect(Inspect),
    Include { tree: String },
    Random { probability: f64 },
}

impl LeafKind {
    /// Default (input, output) memory wiring, as path strings.
    fn default_slots(&self) -> (Option<&'static str>, Option<&'static str>) {
        use paths::*;
        match self {
            LeafKind::FindNeighbours | LeafKind::FindAround { .. } => (None, Some(FOUND_ACTORS)),
            LeafKind::SortActors { .. } => (Some(FOUND_ACTORS), None),
            LeafKind::FilterActors(_) => (Some(FOUND_ACTORS), Some(FOUND_ACTORS)),
            LeafKind::SelectFirst | LeafKind::SelectAny => {
                (Some(FOUND_ACTORS), Some(SELECTED_ACTOR))
            }
            LeafKind::SelectInspected => (Some(INSPECTED_ACTOR), Some(SELECTED_ACTOR)),
            LeafKind::CalculateAttackDirection | LeafKind::CalculateFleeDirection => {
                (Some(SELECTED_ACTOR), Some(MOVE_DIRECTION))
            }
            LeafKind::CalculateRandomDirection | LeafKind::CalculatePreviousDirection => {
                (None, Some(MOVE_DIRECTION))
            }
            LeafKind::CalculatePath => (Some(MOVEMENT_DESTINATION), Some(MOVEMENT_PATH)),
            LeafKind::CalculatePathDirection => (Some(MOVEMENT_PATH), Some(MOVE_DIRECTION)),
            LeafKind::CheckDirection | LeafKind::Move => (Some(MOVE_DIRECTION), None),
            LeafKind::Inspect(_) => (Some(FOUND_ACTORS), Some(INSPECTED_ACTOR)),
            LeafKind::PrepareToBattle(_)
            | LeafKind::Wait
            | LeafKind::Include { .. }
            | LeafKind::Random { .. } => (None, None),
        }
    }
}

/// An input memory reference: a path plus the namespace it reads from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySlot {
    pub path: MemoryPath,
    /// True for the blackboard, false for the actor's own attributes
    /// (the `self.` scope).
    pub in_blackboard: bool,
}

/// A compiled leaf: operation plus memory wiring.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    kind: LeafKind,
    input: Option<MemorySlot>,
    output: Option<MemoryPath>,
}

impl Leaf {
    /// Builds a leaf with the kind's default memory wiring.
    pub(crate) fn new(kind: LeafKind) -> Self {
        let (input, output) = kind.default_slots();
        Self {
            input: input.map(|path| MemorySlot {
                path: MemoryPath::parse(path),
                in_blackboard: true,
            }),
            output: output.map(MemoryPath::parse),
            kind,
        }
    }

    pub fn kind(&self) -> &LeafKind {
        &self.kind
    }

    pub fn input(&self) -> Option<&MemorySlot> {
        self.input.as_ref()
    }

    pub fn output(&self) -> Option<&MemoryPath> {
        self.output.as_ref()
    }

    pub(crate) fn set_input(&mut self, slot: MemorySlot) {
        self.input = Some(slot);
    }

    pub(crate) fn set_output(&mut self, path: MemoryPath) {
        self.output = Some(path);
    }

    pub(crate) fn update(
        &self,
        actor: ActorId,
        game: &mut GameHandler,
        ctx: &EvalContext<'_>,
    ) -> Status {
        match &self.kind {
            LeafKind::FindNeighbours => select::find_neighbours(self, actor, game),
            LeafKind::FindAround {
                horizontal,
                vertical,
            } => select::find_around(self, actor, game, *horizontal, *vertical),
            LeafKind::SortActors { key, reverse } => {
                select::sort_actors(self, actor, game, key, *reverse)
            }
            LeafKind::FilterActors(filter) => select::filter_actors(self, actor, game, *filter),
            LeafKind::SelectFirst => select::select_first(self, actor, game),
            LeafKind::SelectAny => select::select_any(self, actor, game),
            LeafKind::SelectInspected => select::select_inspected(self, actor, game),
            LeafKind::PrepareToBattle(kind) => battle::prepare_to_battle(actor, game, *kind),
            LeafKind::CalculateAttackDirection => {
                battle::calculate_attack_direction(self, actor, game)
            }
            LeafKind::CalculateFleeDirection => battle::calculate_flee_direction(self, actor, game),
            LeafKind::CalculateRandomDirection => {
                movement::calculate_random_direction(self, actor, game)
            }
            LeafKind::CalculatePreviousDirection => {
                movement::calculate_previous_direction(self, actor, game)
            }
            LeafKind::CalculatePath => movement::calculate_path(self, actor, game),
            LeafKind::CalculatePathDirection => {
                movement::calculate_path_direction(self, actor, game)
            }
            LeafKind::CheckDirection => movement::check_direction(self, actor, game),
            LeafKind::Move => movement::step(self, actor, game),
            LeafKind::Wait => Status::Success,
            LeafKind::Inspect(inspect) => inspect::evaluate(self, actor, game, inspect),
            LeafKind::Include { tree } => include(tree, actor, game, ctx),
            LeafKind::Random { probability } => {
                if game.rng_mut().gen_bool(*probability) {
                    Status::Success
                } else {
                    Status::Failure
                }
            }
        }
    }

    /// Read the input slot. Missing input wiring, a dead actor, or an
    /// absent path all read as `None`.
    pub(crate) fn recall(&self, game: &GameHandler, actor: ActorId) -> Option<Knowledge> {
        let slot = self.input.as_ref()?;
        game.actor(actor)?
            .recall_knowledge(&slot.path, slot.in_blackboard)
    }

    pub(crate) fn recall_actors(&self, game: &GameHandler, actor: ActorId) -> Option<Vec<ActorId>> {
        match self.recall(game, actor)? {
            Knowledge::Actors(found) => Some(found),
            other => self.wrong_kind("actors", &other),
        }
    }

    pub(crate) fn recall_actor(&self, game: &GameHandler, actor: ActorId) -> Option<ActorId> {
        match self.recall(game, actor)? {
            Knowledge::Actor(id) => Some(id),
            other => self.wrong_kind("actor", &other),
        }
    }

    pub(crate) fn recall_direction(&self, game: &GameHandler, actor: ActorId) -> Option<Direction> {
        match self.recall(game, actor)? {
            Knowledge::Direction(direction) => Some(direction),
            other => self.wrong_kind("direction", &other),
        }
    }

    pub(crate) fn recall_position(&self, game: &GameHandler, actor: ActorId) -> Option<Vector> {
        match self.recall(game, actor)? {
            Knowledge::Position(position) => Some(position),
            other => self.wrong_kind("position", &other),
        }
    }

    /// A read that found the wrong kind behaves like an absent entry, but
    /// is worth a diagnostic: it means two nodes disagree about a path.
    fn wrong_kind<T>(&self, expected: &'static str, found: &Knowledge) -> Option<T> {
        if let Some(slot) = &self.input {
            warn!(
                path = %slot.path,
                expected,
                found = found.kind(),
                "memory read found the wrong kind"
            );
        }
        None
    }

    /// Write `value` to the output path, when one is wired.
    pub(crate) fn remember(&self, game: &mut GameHandler, actor: ActorId, value: Knowledge) {
        if let (Some(path), Some(actor)) = (&self.output, game.actor_mut(actor)) {
            actor.remember_knowledge(path, value);
        }
    }

    /// Drop the output path, when one is wired. No-op for missing entries.
    pub(crate) fn forget_output(&self, game: &mut GameHandler, actor: ActorId) {
        if let (Some(path), Some(actor)) = (&self.output, game.actor_mut(actor)) {
            actor.forget_knowledge(path);
        }
    }
}

/// Evaluate another tree from the library in place of this node.
fn include(tree: &str, actor: ActorId, game: &mut GameHandler, ctx: &EvalContext<'_>) -> Status {
    if !ctx.enter_include() {
        warn!(tree, "include depth limit reached");
        return Status::Failure;
    }
    let status = match ctx.library().get(tree) {
        Ok(included) => included.update(actor, game, ctx),
        // Unreachable for libraries that passed load-time validation.
        Err(_) => {
            warn!(tree, "included tree is missing");
            Status::Failure
        }
    };
    ctx.leave_include();
    status
}
