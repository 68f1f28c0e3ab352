//! Behaviour Trees
//!
//! A compiled behaviour-tree engine for world actors: a line-oriented
//! tree grammar, a closed node catalogue, and a per-tick evaluator that
//! drives actors through the game handler. Trees are compiled once into
//! an immutable library; every piece of evaluation state lives in the
//! acting actor's memory or in the world itself.

pub mod compiler;
pub mod error;
pub mod leaves;
pub mod loader;
pub mod registry;
pub mod status;
pub mod tree;

pub use compiler::Compiler;
pub use error::BehaviourError;
pub use leaves::{Leaf, LeafKind};
pub use loader::TreeLibrary;
pub use registry::Registry;
pub use status::Status;
pub use tree::{Behaviour, CompositeKind, DecoratorKind, EvalContext, Node, Tree};
