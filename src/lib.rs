//! # Chatflow Editor
//!
//! The editing engine behind a visual chatbot flow builder: a directed graph
//! of typed conversation steps, the interaction state machine that edits it,
//! whole-flow validation and a JSON document format for export and import.
//!
//! ## Features
//!
//! - **Typed Nodes** - Six closed node kinds (`start`, `message`, `condition`,
//!   `input`, `action`, `end`) with per-kind default data
//! - **Consistent Graph** - Connections and each node's outgoing list never
//!   disagree; self-loops, duplicates and dangling ends are refused
//! - **Composable Rules** - Connection checks via the [`ConnectionRule`] trait
//! - **Explicit Interaction States** - `Idle`, `Dragging`, `Connecting`
//! - **Slint Ready** - [`FlowEditor`] hands out callbacks and keeps
//!   `VecModel`s in sync
//!
//! ## Quick Start
//!
//! ```
//! use chatflow_editor::{FlowGraph, NodeKind, Position};
//!
//! let mut graph = FlowGraph::new();
//! let message = graph.add_node(NodeKind::Message, Position::new(400.0, 100.0)).id.clone();
//! let end = graph.add_node(NodeKind::End, Position::new(700.0, 100.0)).id.clone();
//! graph.add_connection("start-1", &message);
//! graph.add_connection(&message, &end);
//!
//! assert!(chatflow_editor::validate(&graph).ok);
//! ```
//!
//! ## Modules
//!
//! - [`model`] - Nodes, node data, connections
//! - [`graph`] - [`FlowGraph`] and the connection rules
//! - [`controller`] - [`InteractionController`] state machine
//! - [`validate`] - Whole-flow checks
//! - [`document`] - Export/import document format
//! - [`geometry`] / [`hit_test`] / [`paths`] - Anchors, curves, picking
//! - [`editor`] - [`FlowEditor`] façade for Slint applications

pub mod config;
pub mod controller;
pub mod document;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod model;
pub mod paths;
pub mod selection;
pub mod validate;

pub use config::EditorConfig;
pub use controller::{
    EditorEvent, Effect, InteractionController, InteractionState, PointerButton, PALETTE_PAYLOAD_KEY,
};
pub use document::{export_document, parse_document, FlowDocument, FlowMetadata, EXPORT_FILE_NAME};
pub use editor::FlowEditor;
pub use error::{ConfigError, ConnectionError, ImportError, ParseError, UnknownNodeKind};
pub use geometry::{anchor_in, anchor_out, connection_path, ConnectionCurve, NODE_HEIGHT, NODE_WIDTH};
pub use graph::{
    FlowGraph,
    // Connection rule framework
    CompositeRule, ConnectionRule, HandleDirectionRule, KnownEndpointsRule, NoDuplicatesRule, SelfLoopRule,
};
pub use hit_test::{connection_at, hit_test, HandleSide, HitTarget};
pub use model::{
    ActionRecord, Connection, Node, NodeData, NodeDataPatch, NodeKind, NodeUpdate, Position, ACTION_KINDS,
    INPUT_TYPES,
};
pub use paths::ConnectionPaths;
pub use selection::SelectionManager;
pub use validate::{validate, validate_with, ValidationMode, ValidationReport};
