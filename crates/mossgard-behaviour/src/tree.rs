//! Tree Structure and Evaluation
//!
//! A compiled behaviour tree is immutable; all mutable state produced by an
//! evaluation lives in the world or in the acting actor's blackboard. The
//! only per-node state is a diagnostic cell recording the last outcome.

use std::cell::Cell;

use mossgard_world::{ActorId, GameHandler};

use crate::leaves::Leaf;
use crate::loader::TreeLibrary;
use crate::status::Status;

/// Hard ceiling on nested `include` evaluation, against libraries edited
/// after load-time validation.
pub const MAX_INCLUDE_DEPTH: u32 = 16;

/// Per-evaluation state shared by every node of the tree, most importantly
/// the library that `include` nodes resolve against.
pub struct EvalContext<'a> {
    library: &'a TreeLibrary,
    include_depth: Cell<u32>,
}

impl<'a> EvalContext<'a> {
    pub(crate) fn new(library: &'a TreeLibrary) -> Self {
        Self {
            library,
            include_depth: Cell::new(0),
        }
    }

    pub fn library(&self) -> &'a TreeLibrary {
        self.library
    }

    /// Returns false when another nested include would cross the depth
    /// ceiling.
    pub(crate) fn enter_include(&self) -> bool {
        let depth = self.include_depth.get();
        if depth >= MAX_INCLUDE_DEPTH {
            return false;
        }
        self.include_depth.set(depth + 1);
        true
    }

    pub(crate) fn leave_include(&self) {
        self.include_depth.set(self.include_depth.get().saturating_sub(1));
    }
}

/// How a composite combines its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKind {
    /// Succeeds only when every child succeeds; stops at the first child
    /// that does not.
    Sequence,
    /// Succeeds at the first child that succeeds; fails only when all do.
    Selector,
}

/// How a decorator rewrites its child's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoratorKind {
    /// Swaps success and failure.
    Inverted,
    /// Rewrites one specific status into another.
    Converted { from: Status, to: Status },
    /// Reports success no matter what the child did.
    Anyway,
}

impl DecoratorKind {
    pub fn apply(&self, status: Status) -> Status {
        match *self {
            DecoratorKind::Inverted => match status {
                Status::Success => Status::Failure,
                Status::Failure => Status::Success,
                Status::Running => Status::Running,
            },
            DecoratorKind::Converted { from, to } => {
                if status == from {
                    to
                } else {
                    status
                }
            }
            DecoratorKind::Anyway => Status::Success,
        }
    }
}

/// The role-specific part of a node.
#[derive(Debug)]
pub enum Behaviour {
    Composite {
        kind: CompositeKind,
        children: Vec<Node>,
    },
    Decorator {
        kind: DecoratorKind,
        child: Box<Node>,
    },
    Leaf(Leaf),
}

/// One compiled node. Carries its source tag and 1-based line for
/// diagnostics.
#[derive(Debug)]
pub struct Node {
    tag: &'static str,
    line: usize,
    arguments: Vec<String>,
    behaviour: Behaviour,
    last_evaluated: Cell<Option<(ActorId, Status)>>,
    last_child: Cell<Option<usize>>,
}

impl Node {
    pub(crate) fn new(
        tag: &'static str,
        line: usize,
        arguments: Vec<String>,
        behaviour: Behaviour,
    ) -> Self {
        Self {
            tag,
            line,
            arguments,
            behaviour,
            last_evaluated: Cell::new(None),
            last_child: Cell::new(None),
        }
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// 1-based line in the tree source this node was compiled from.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn behaviour(&self) -> &Behaviour {
        &self.behaviour
    }

    /// The actor and outcome of the most recent evaluation that reached
    /// this node, for post-mortem inspection of a tick.
    pub fn last_evaluated(&self) -> Option<(ActorId, Status)> {
        self.last_evaluated.get()
    }

    /// For composites, the index of the child the most recent evaluation
    /// stopped at.
    pub fn last_evaluated_child(&self) -> Option<usize> {
        self.last_child.get()
    }

    /// Evaluate this node and record the outcome.
    pub fn process_update(
        &self,
        actor: ActorId,
        game: &mut GameHandler,
        ctx: &EvalContext<'_>,
    ) -> Status {
        let status = self.update(actor, game, ctx);
        self.last_evaluated.set(Some((actor, status)));
        status
    }

    fn update(&self, actor: ActorId, game: &mut GameHandler, ctx: &EvalContext<'_>) -> Status {
        match &self.behaviour {
            Behaviour::Composite {
                kind: CompositeKind::Sequence,
                children,
            } => {
                for (index, child) in children.iter().enumerate() {
                    self.last_child.set(Some(index));
                    match child.process_update(actor, game, ctx) {
                        Status::Success => continue,
                        other => return other,
                    }
                }
                Status::Success
            }
            Behaviour::Composite {
                kind: CompositeKind::Selector,
                children,
            } => {
                for (index, child) in children.iter().enumerate() {
                    self.last_child.set(Some(index));
                    match child.process_update(actor, game, ctx) {
                        Status::Failure => continue,
                        other => return other,
                    }
                }
                Status::Failure
            }
            Behaviour::Decorator { kind, child } => {
                kind.apply(child.process_update(actor, game, ctx))
            }
            Behaviour::Leaf(leaf) => leaf.update(actor, game, ctx),
        }
    }

    /// Depth-first pre-order walk over this node and its descendants.
    pub fn visit(&self, visitor: &mut dyn FnMut(&Node)) {
        visitor(self);
        match &self.behaviour {
            Behaviour::Composite { children, .. } => {
                for child in children {
                    child.visit(visitor);
                }
            }
            Behaviour::Decorator { child, .. } => child.visit(visitor),
            Behaviour::Leaf(_) => {}
        }
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str("    ");
        }
        out.push_str(self.tag);
        for argument in &self.arguments {
            out.push(' ');
            out.push_str(argument);
        }
        out.push('\n');
        match &self.behaviour {
            Behaviour::Composite { children, .. } => {
                for child in children {
                    child.render_into(out, depth + 1);
                }
            }
            Behaviour::Decorator { child, .. } => child.render_into(out, depth + 1),
            Behaviour::Leaf(_) => {}
        }
    }
}

/// A named, compiled behaviour tree.
#[derive(Debug)]
pub struct Tree {
    name: String,
    root: Node,
}

impl Tree {
    pub(crate) fn new(name: impl Into<String>, root: Node) -> Self {
        Self {
            name: name.into(),
            root,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Evaluate the whole tree once for `actor`.
    pub fn update(&self, actor: ActorId, game: &mut GameHandler, ctx: &EvalContext<'_>) -> Status {
        self.root.process_update(actor, game, ctx)
    }

    /// Canonical indented listing of the tree, one node per line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.root.render_into(&mut out, 0);
        out
    }
}
