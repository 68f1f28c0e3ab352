//! Grammar Compiler
//!
//! Turns tree source text into a compiled root node. The grammar is
//! line-oriented: one node per line, nesting by four-space indentation,
//! `#` comments, and optional memory rewiring clauses (`-> path` for the
//! output, `<- path` or `<- self.attribute` for the input). A decorator
//! adopts the next node whether it is indented or written at the same
//! depth.

use mossgard_world::MemoryPath;

use crate::error::BehaviourError;
use crate::leaves::{Leaf, MemorySlot};
use crate::registry::{Builder, Registry};
use crate::tree::{Behaviour, CompositeKind, DecoratorKind, Node};

const INDENT_UNIT: usize = 4;

/// A node read from one source line but not yet linked to its children.
struct PendingNode {
    level: usize,
    tag: &'static str,
    line: usize,
    arguments: Vec<String>,
    body: PendingBody,
}

enum PendingBody {
    Composite {
        kind: CompositeKind,
        children: Vec<Node>,
    },
    Decorator {
        kind: DecoratorKind,
        child: Option<Node>,
    },
    Leaf(Leaf),
}

impl PendingNode {
    fn is_childless_decorator(&self) -> bool {
        matches!(self.body, PendingBody::Decorator { child: None, .. })
    }

    /// Attach a completed child. `line` is the child's source line, used
    /// in diagnostics when this node can not take it.
    fn attach(&mut self, node: Node, line: usize) -> Result<(), BehaviourError> {
        match &mut self.body {
            PendingBody::Composite { children, .. } => {
                children.push(node);
                Ok(())
            }
            PendingBody::Decorator { child, .. } => {
                if child.is_some() {
                    return Err(BehaviourError::DecoratorExtraChild {
                        line,
                        tag: self.tag.into(),
                    });
                }
                *child = Some(node);
                Ok(())
            }
            PendingBody::Leaf(_) => Err(BehaviourError::LeafWithChildren {
                line,
                tag: self.tag.into(),
            }),
        }
    }

    fn finish(self) -> Result<Node, BehaviourError> {
        let behaviour = match self.body {
            PendingBody::Composite { kind, children } => {
                if children.is_empty() {
                    return Err(BehaviourError::CompositeWithoutChildren {
                        line: self.line,
                        tag: self.tag.into(),
                    });
                }
                Behaviour::Composite { kind, children }
            }
            PendingBody::Decorator { kind, child } => match child {
                Some(child) => Behaviour::Decorator {
                    kind,
                    child: Box::new(child),
                },
                None => {
                    return Err(BehaviourError::DecoratorWithoutChild {
                        line: self.line,
                        tag: self.tag.into(),
                    })
                }
            },
            PendingBody::Leaf(leaf) => Behaviour::Leaf(leaf),
        };
        Ok(Node::new(self.tag, self.line, self.arguments, behaviour))
    }
}

/// Compiles tree sources against a fixed registry.
pub struct Compiler<'a> {
    registry: &'a Registry,
}

impl<'a> Compiler<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Compile one tree source into its root node.
    pub fn compile(&self, source: &str) -> Result<Node, BehaviourError> {
        let mut stack: Vec<PendingNode> = Vec::new();
        let mut completed_root: Option<Node> = None;

        for (index, raw) in source.lines().enumerate() {
            let line = index + 1;
            let Some(pending) = self.parse_line(raw, line)? else {
                continue;
            };
            let level = pending.level;

            // Close every scope this line is not inside of. A decorator
            // still waiting for its child at the same depth stays open:
            // it adopts this line.
            while let Some(top) = stack.last() {
                if top.level < level || (top.level == level && top.is_childless_decorator()) {
                    break;
                }
                let Some(done) = stack.pop() else {
                    break;
                };
                let node = done.finish()?;
                match stack.last_mut() {
                    Some(parent) => parent.attach(node, line)?,
                    None => completed_root = Some(node),
                }
            }

            if completed_root.is_some() {
                return Err(BehaviourError::MultipleRoots { line });
            }
            match stack.last() {
                None => {
                    if level != 0 {
                        return Err(BehaviourError::UnexpectedIndent { line });
                    }
                }
                Some(parent) if parent.is_childless_decorator() && parent.level == level => {
                    // Same-depth adoption by the decorator above.
                }
                Some(parent) if level == parent.level + 1 => match &parent.body {
                    PendingBody::Leaf(_) => {
                        return Err(BehaviourError::LeafWithChildren {
                            line,
                            tag: parent.tag.into(),
                        })
                    }
                    PendingBody::Decorator { child: Some(_), .. } => {
                        return Err(BehaviourError::DecoratorExtraChild {
                            line,
                            tag: parent.tag.into(),
                        })
                    }
                    _ => {}
                },
                Some(_) => return Err(BehaviourError::IndentJump { line }),
            }
            stack.push(pending);
        }

        while let Some(done) = stack.pop() {
            let line = done.line;
            let node = done.finish()?;
            match stack.last_mut() {
                Some(parent) => parent.attach(node, line)?,
                None => completed_root = Some(node),
            }
        }
        completed_root.ok_or(BehaviourError::EmptySource)
    }

    /// Parse one source line. Blank and comment-only lines read as `None`.
    fn parse_line(&self, raw: &str, line: usize) -> Result<Option<PendingNode>, BehaviourError> {
        let content = match raw.find('#') {
            Some(comment) => &raw[..comment],
            None => raw,
        };
        if content.trim().is_empty() {
            return Ok(None);
        }

        let trimmed = content.trim_start();
        let indent = &content[..content.len() - trimmed.len()];
        if indent.contains('\t') {
            return Err(BehaviourError::TabIndentation { line });
        }
        if indent.len() % INDENT_UNIT != 0 {
            return Err(BehaviourError::BadIndentation { line });
        }
        let level = indent.len() / INDENT_UNIT;

        let mut tokens = trimmed.split_whitespace();
        let Some(tag) = tokens.next() else {
            return Ok(None);
        };
        let Some((canonical, builder)) = self.registry.lookup(tag) else {
            return Err(BehaviourError::UnknownTag {
                line,
                tag: tag.into(),
            });
        };

        let mut arguments: Vec<String> = Vec::new();
        let mut input: Option<MemorySlot> = None;
        let mut output: Option<MemoryPath> = None;
        let mut seen_clause = false;
        while let Some(token) = tokens.next() {
            match token {
                "->" => {
                    seen_clause = true;
                    let Some(path) = tokens.next() else {
                        return Err(BehaviourError::MissingMemoryPath {
                            line,
                            marker: "->".into(),
                        });
                    };
                    output = Some(parse_path(path, line)?);
                }
                "<-" => {
                    seen_clause = true;
                    let Some(path) = tokens.next() else {
                        return Err(BehaviourError::MissingMemoryPath {
                            line,
                            marker: "<-".into(),
                        });
                    };
                    input = Some(parse_input(path, line)?);
                }
                _ if seen_clause => {
                    return Err(BehaviourError::UnexpectedToken {
                        line,
                        token: token.into(),
                    })
                }
                _ => arguments.push(token.to_owned()),
            }
        }

        let body = match builder {
            Builder::Composite(kind) => {
                if input.is_some() || output.is_some() {
                    return Err(BehaviourError::MemoryOnNonLeaf { line });
                }
                PendingBody::Composite {
                    kind: *kind,
                    children: Vec::new(),
                }
            }
            Builder::Decorator(build) => {
                if input.is_some() || output.is_some() {
                    return Err(BehaviourError::MemoryOnNonLeaf { line });
                }
                PendingBody::Decorator {
                    kind: build(&arguments, line)?,
                    child: None,
                }
            }
            Builder::Leaf(build) => {
                let mut leaf = build(&arguments, line)?;
                if let Some(slot) = input {
                    leaf.set_input(slot);
                }
                if let Some(path) = output {
                    leaf.set_output(path);
                }
                PendingBody::Leaf(leaf)
            }
        };

        Ok(Some(PendingNode {
            level,
            tag: canonical,
            line,
            arguments,
            body,
        }))
    }
}

/// An input reference: `self.attribute` reads the actor's attributes,
/// anything else reads the blackboard.
fn parse_input(text: &str, line: usize) -> Result<MemorySlot, BehaviourError> {
    if let Some(attribute) = text.strip_prefix("self.") {
        return Ok(MemorySlot {
            path: parse_path(attribute, line)?,
            in_blackboard: false,
        });
    }
    if text == "self" {
        return Err(BehaviourError::InvalidArgument {
            line,
            message: "expected an attribute name after 'self.'".into(),
        });
    }
    Ok(MemorySlot {
        path: parse_path(text, line)?,
        in_blackboard: true,
    })
}

fn parse_path(text: &str, line: usize) -> Result<MemoryPath, BehaviourError> {
    if text.is_empty() || text.split('.').any(str::is_empty) {
        return Err(BehaviourError::InvalidArgument {
            line,
            message: format!("invalid memory path '{text}'"),
        });
    }
    Ok(MemoryPath::parse(text))
}
