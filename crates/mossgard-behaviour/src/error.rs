//! Errors raised while compiling and loading behaviour trees.
//!
//! Compilation errors carry the 1-based source line they were detected on so
//! tree authors can jump straight to the offending line.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BehaviourError {
    #[error("line {line}: indentation must use steps of four spaces")]
    BadIndentation { line: usize },

    #[error("line {line}: tabs are not allowed in indentation")]
    TabIndentation { line: usize },

    #[error("line {line}: unexpected indentation")]
    UnexpectedIndent { line: usize },

    #[error("line {line}: indentation skips a level")]
    IndentJump { line: usize },

    #[error("line {line}: a tree can have only one root node")]
    MultipleRoots { line: usize },

    #[error("line {line}: unknown node tag '{tag}'")]
    UnknownTag { line: usize, tag: String },

    #[error("line {line}: '{tag}' can have only one child")]
    DecoratorExtraChild { line: usize, tag: String },

    #[error("line {line}: '{tag}' has no child node")]
    DecoratorWithoutChild { line: usize, tag: String },

    #[error("line {line}: '{tag}' has no child nodes")]
    CompositeWithoutChildren { line: usize, tag: String },

    #[error("line {line}: '{tag}' can not have children")]
    LeafWithChildren { line: usize, tag: String },

    #[error("line {line}: expected a memory path after '{marker}'")]
    MissingMemoryPath { line: usize, marker: String },

    #[error("line {line}: memory references are only valid on leaf nodes")]
    MemoryOnNonLeaf { line: usize },

    #[error("line {line}: unexpected token '{token}'")]
    UnexpectedToken { line: usize, token: String },

    #[error("line {line}: '{tag}' expects {expected} arguments, got {found}")]
    WrongArgumentCount {
        line: usize,
        tag: String,
        expected: &'static str,
        found: usize,
    },

    #[error("line {line}: {message}")]
    InvalidArgument { line: usize, message: String },

    #[error("tree source contains no nodes")]
    EmptySource,

    #[error("node tag '{tag}' is registered twice")]
    DuplicateTag { tag: String },

    #[error("behaviour tree '{name}' not found")]
    TreeNotFound { name: String },

    #[error("tree '{tree}' line {line}: included tree '{target}' not found")]
    UnknownInclude {
        tree: String,
        line: usize,
        target: String,
    },

    #[error("include cycle between behaviour trees: {chain}")]
    IncludeCycle { chain: String },

    #[error("{file}: {source}")]
    InFile {
        file: String,
        #[source]
        source: Box<BehaviourError>,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BehaviourError {
    /// Wraps a compilation error with the file it came from.
    pub(crate) fn in_file(self, file: impl Into<String>) -> Self {
        BehaviourError::InFile {
            file: file.into(),
            source: Box::new(self),
        }
    }
}
