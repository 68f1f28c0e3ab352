//! Tree Library
//!
//! Loads every `.tree` file of a directory into a named, case-folded
//! library and validates cross-tree `include` references up front: a
//! library that loads can not hit a missing tree or an include cycle
//! during a tick.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use mossgard_world::{ActorId, GameHandler};
use tracing::{debug, info};

use crate::compiler::Compiler;
use crate::error::BehaviourError;
use crate::leaves::LeafKind;
use crate::registry::Registry;
use crate::status::Status;
use crate::tree::{Behaviour, EvalContext, Tree};

/// Compiled trees, addressed by lower-cased name.
#[derive(Debug)]
pub struct TreeLibrary {
    trees: BTreeMap<String, Tree>,
}

impl TreeLibrary {
    /// Load and validate every `.tree` file under `dir`. Files load in
    /// name order, so errors are reported deterministically.
    pub fn load_dir(dir: &Path) -> Result<Self, BehaviourError> {
        let entries = fs::read_dir(dir).map_err(|source| BehaviourError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut files: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| BehaviourError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.extension() == Some(OsStr::new("tree")) {
                files.push(path);
            }
        }
        files.sort();

        let registry = Registry::build()?;
        let compiler = Compiler::new(&registry);
        let mut trees = BTreeMap::new();
        for path in files {
            let Some(stem) = path.file_stem().and_then(OsStr::to_str) else {
                continue;
            };
            let name = stem.to_lowercase();
            let source = fs::read_to_string(&path).map_err(|source| BehaviourError::Io {
                path: path.clone(),
                source,
            })?;
            let root = compiler
                .compile(&source)
                .map_err(|error| error.in_file(path.display().to_string()))?;
            debug!(tree = %name, "compiled behaviour tree");
            trees.insert(name.clone(), Tree::new(name, root));
        }

        let library = Self { trees };
        library.validate_includes()?;
        info!(trees = library.trees.len(), "behaviour tree library loaded");
        Ok(library)
    }

    /// Build a library from in-memory `(name, source)` pairs.
    pub fn from_sources<'s>(
        sources: impl IntoIterator<Item = (&'s str, &'s str)>,
    ) -> Result<Self, BehaviourError> {
        let registry = Registry::build()?;
        let compiler = Compiler::new(&registry);
        let mut trees = BTreeMap::new();
        for (name, source) in sources {
            let name = name.to_lowercase();
            let root = compiler
                .compile(source)
                .map_err(|error| error.in_file(name.clone()))?;
            trees.insert(name.clone(), Tree::new(name, root));
        }
        let library = Self { trees };
        library.validate_includes()?;
        Ok(library)
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.trees.keys().map(String::as_str)
    }

    /// Look a tree up by name, case-insensitively.
    pub fn get(&self, name: &str) -> Result<&Tree, BehaviourError> {
        self.trees
            .get(&name.to_lowercase())
            .ok_or_else(|| BehaviourError::TreeNotFound { name: name.into() })
    }

    /// A fresh evaluation context over this library.
    pub fn context(&self) -> EvalContext<'_> {
        EvalContext::new(self)
    }

    /// Evaluate the named tree once for `actor`.
    pub fn evaluate(
        &self,
        name: &str,
        actor: ActorId,
        game: &mut GameHandler,
    ) -> Result<Status, BehaviourError> {
        let tree = self.get(name)?;
        let ctx = self.context();
        Ok(tree.update(actor, game, &ctx))
    }

    /// Every include must name a loaded tree, and following includes must
    /// never come back to a tree already on the way.
    fn validate_includes(&self) -> Result<(), BehaviourError> {
        let mut edges: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, tree) in &self.trees {
            let mut targets: Vec<(String, usize)> = Vec::new();
            tree.root().visit(&mut |node| {
                if let Behaviour::Leaf(leaf) = node.behaviour() {
                    if let LeafKind::Include { tree: target } = leaf.kind() {
                        targets.push((target.clone(), node.line()));
                    }
                }
            });
            for (target, line) in &targets {
                if !self.trees.contains_key(target) {
                    return Err(BehaviourError::UnknownInclude {
                        tree: name.clone(),
                        line: *line,
                        target: target.clone(),
                    });
                }
            }
            edges.insert(name.clone(), targets.into_iter().map(|(t, _)| t).collect());
        }

        let mut marks: BTreeMap<&str, Mark> = BTreeMap::new();
        for name in edges.keys() {
            if marks.get(name.as_str()).is_none() {
                let mut path = Vec::new();
                visit(name, &edges, &mut marks, &mut path)?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Visiting,
    Done,
}

fn visit<'t>(
    name: &'t str,
    edges: &'t BTreeMap<String, Vec<String>>,
    marks: &mut BTreeMap<&'t str, Mark>,
    path: &mut Vec<&'t str>,
) -> Result<(), BehaviourError> {
    marks.insert(name, Mark::Visiting);
    path.push(name);
    for target in edges.get(name).into_iter().flatten() {
        match marks.get(target.as_str()) {
            Some(Mark::Visiting) => {
                let mut chain: Vec<&str> = path.clone();
                chain.push(target);
                return Err(BehaviourError::IncludeCycle {
                    chain: chain.join(" -> "),
                });
            }
            Some(Mark::Done) => {}
            None => visit(target, edges, marks, path)?,
        }
    }
    path.pop();
    marks.insert(name, Mark::Done);
    Ok(())
}
