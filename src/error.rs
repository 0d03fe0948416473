use std::path::PathBuf;
use thiserror::Error;

/// Reasons a connection between two nodes is refused.
///
/// The plain [`FlowGraph::add_connection`](crate::FlowGraph::add_connection)
/// swallows these; [`FlowGraph::try_add_connection`](crate::FlowGraph::try_add_connection)
/// hands them back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    #[error("Cannot connect node '{0}' to itself")]
    SelfConnection(String),

    #[error("Node '{0}' not found")]
    UnknownNode(String),

    #[error("Connection from '{from}' to '{to}' already exists")]
    Duplicate { from: String, to: String },

    #[error("Node '{0}' has no output handle")]
    NoOutputHandle(String),

    #[error("Node '{0}' has no input handle")]
    NoInputHandle(String),
}

/// Errors raised while reading a flow document.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to parse flow document JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid flow document: {0}")]
    Structure(String),
}

/// Errors raised by the file import surface.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Only .json files can be imported, got '{}'", .0.display())]
    UnsupportedExtension(PathBuf),

    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A palette payload or document named a node kind outside the closed set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown node kind '{0}'")]
pub struct UnknownNodeKind(pub String);

/// Errors raised while loading an [`EditorConfig`](crate::EditorConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse editor config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid editor config: {0}")]
    Invalid(String),
}
