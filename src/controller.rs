//! The interaction state machine.
//!
//! [`InteractionController`] turns resolved pointer input into graph
//! mutations. It owns the per-session interaction state (what is being
//! dragged, which node a pending connection starts from, what is selected);
//! none of that is stored on the nodes themselves.
//!
//! ```text
//!            pointer-down (primary)            pointer-up / cancel
//!   Idle  ───────────────────────────▶ Dragging ─────────────────────▶ Idle
//!    │ ▲
//!    │ │ handle on other node (connect) / background click (cancel)
//!    ▼ │
//!  Connecting ◀── handle on the same node (no-op)
//! ```

use crate::config::EditorConfig;
use crate::geometry::{drop_position, DROP_CENTER_OFFSET};
use crate::graph::FlowGraph;
use crate::model::{Connection, NodeKind, NodeUpdate, Position};
use crate::selection::SelectionManager;

/// Payload key under which a palette item carries its node kind.
pub const PALETTE_PAYLOAD_KEY: &str = "application/reactflow";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// A node follows the pointer. `offset` is the pointer position minus
    /// the node position at press time.
    Dragging { node_id: String, offset: Position },
    /// Waiting for a second handle click to complete a connection.
    Connecting { source: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Input already resolved to what it targets, see [`hit_test`](crate::hit_test::hit_test).
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    PointerDown {
        node_id: String,
        pointer: Position,
        button: PointerButton,
    },
    PointerMove {
        pointer: Position,
    },
    /// Release anywhere, including outside the canvas.
    PointerUp,
    /// Either handle of a node was clicked.
    HandleActivated {
        node_id: String,
    },
    BackgroundClick,
    /// The node body or its menu asked for selection.
    SelectNode {
        node_id: String,
    },
    PaletteDrop {
        payload: String,
        pointer: Position,
        canvas_origin: Position,
    },
    DeleteNode {
        node_id: String,
    },
}

/// What handling an event changed.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Nothing,
    SelectionChanged(Option<String>),
    DragStarted(String),
    Moved { node_id: String, position: Position },
    DragEnded(String),
    ConnectionStarted(String),
    Connected(Connection),
    /// The second click landed but the graph refused the pair.
    ConnectionRefused { source: String, target: String },
    ConnectionCancelled(String),
    NodeAdded(String),
    NodeDeleted(String),
}

impl Effect {
    /// Whether the graph itself changed.
    pub fn mutated_graph(&self) -> bool {
        matches!(
            self,
            Effect::Moved { .. } | Effect::Connected(_) | Effect::NodeAdded(_) | Effect::NodeDeleted(_)
        )
    }
}

/// Drives drags, connections, selection, palette drops and deletions.
///
/// The controller never holds on to the graph; each call borrows it, so a
/// single event runs to completion before the next one is looked at.
#[derive(Debug, Clone)]
pub struct InteractionController {
    state: InteractionState,
    selection: SelectionManager,
    drop_center_offset: Position,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionController {
    pub fn new() -> Self {
        Self {
            state: InteractionState::Idle,
            selection: SelectionManager::new(),
            drop_center_offset: DROP_CENTER_OFFSET,
        }
    }

    pub fn with_config(config: &EditorConfig) -> Self {
        Self {
            drop_center_offset: config.drop_center_offset,
            ..Self::new()
        }
    }

    // === State queries ===

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn selected(&self) -> Option<&str> {
        self.selection.current()
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self.state, InteractionState::Connecting { .. })
    }

    /// Root node of the pending connection, if any.
    pub fn connection_source(&self) -> Option<&str> {
        match &self.state {
            InteractionState::Connecting { source } => Some(source),
            _ => None,
        }
    }

    pub fn dragged_node(&self) -> Option<&str> {
        match &self.state {
            InteractionState::Dragging { node_id, .. } => Some(node_id),
            _ => None,
        }
    }

    /// Pointer-move listeners should be attached exactly while this is true.
    pub fn wants_pointer_moves(&self) -> bool {
        matches!(self.state, InteractionState::Dragging { .. })
    }

    /// Whether the UI should offer a delete affordance for `node_id`.
    ///
    /// Start nodes can never be deleted from the editing surface.
    pub fn can_delete(&self, graph: &FlowGraph, node_id: &str) -> bool {
        graph.node(node_id).is_some_and(|n| n.kind != NodeKind::Start)
    }

    // === Event handling ===

    pub fn dispatch(&mut self, graph: &mut FlowGraph, event: EditorEvent) -> Effect {
        match event {
            EditorEvent::PointerDown { node_id, pointer, button } => {
                self.pointer_down(graph, &node_id, pointer, button)
            }
            EditorEvent::PointerMove { pointer } => self.pointer_move(graph, pointer),
            EditorEvent::PointerUp => self.pointer_up(),
            EditorEvent::HandleActivated { node_id } => self.handle_activated(graph, &node_id),
            EditorEvent::BackgroundClick => self.background_click(),
            EditorEvent::SelectNode { node_id } => self.select(graph, &node_id),
            EditorEvent::PaletteDrop { payload, pointer, canvas_origin } => {
                self.drop_palette_item(graph, &payload, pointer, canvas_origin)
            }
            EditorEvent::DeleteNode { node_id } => self.delete_node(graph, &node_id),
        }
    }

    /// Press on a node body.
    pub fn pointer_down(
        &mut self,
        graph: &FlowGraph,
        node_id: &str,
        pointer: Position,
        button: PointerButton,
    ) -> Effect {
        if button != PointerButton::Primary {
            return Effect::Nothing;
        }
        let Some(node) = graph.node(node_id) else {
            return Effect::Nothing;
        };

        match self.state {
            InteractionState::Idle => {
                let offset = pointer - node.position;
                log::debug!("Drag started on '{}' (offset {}, {})", node_id, offset.x, offset.y);
                self.selection.select(node_id);
                self.state = InteractionState::Dragging {
                    node_id: node_id.to_string(),
                    offset,
                };
                Effect::DragStarted(node_id.to_string())
            }
            InteractionState::Connecting { .. } => self.select(graph, node_id),
            InteractionState::Dragging { .. } => Effect::Nothing,
        }
    }

    /// Pointer moved. Only has an effect while dragging.
    pub fn pointer_move(&mut self, graph: &mut FlowGraph, pointer: Position) -> Effect {
        let InteractionState::Dragging { node_id, offset } = &self.state else {
            return Effect::Nothing;
        };
        let position = (pointer - *offset).clamp_non_negative();
        if !graph.update_node(node_id, NodeUpdate::move_to(position)) {
            // The node went away underneath the drag.
            let node_id = node_id.clone();
            self.state = InteractionState::Idle;
            return Effect::DragEnded(node_id);
        }
        log::trace!("Dragging '{}' to ({}, {})", node_id, position.x, position.y);
        Effect::Moved {
            node_id: node_id.clone(),
            position,
        }
    }

    /// Pointer released (or the press was cancelled). Ends a drag.
    pub fn pointer_up(&mut self) -> Effect {
        match std::mem::take(&mut self.state) {
            InteractionState::Dragging { node_id, .. } => {
                log::debug!("Drag ended on '{}'", node_id);
                Effect::DragEnded(node_id)
            }
            other => {
                self.state = other;
                Effect::Nothing
            }
        }
    }

    /// A connection handle of `node_id` was clicked.
    ///
    /// Starts a connection while idle; completes it when clicked on a
    /// different node while connecting. Clicking the root's own handle again
    /// changes nothing.
    pub fn handle_activated(&mut self, graph: &mut FlowGraph, node_id: &str) -> Effect {
        if !graph.contains(node_id) {
            return Effect::Nothing;
        }

        match &self.state {
            InteractionState::Idle => {
                log::debug!("Connection started from '{}'", node_id);
                self.state = InteractionState::Connecting {
                    source: node_id.to_string(),
                };
                Effect::ConnectionStarted(node_id.to_string())
            }
            InteractionState::Connecting { source } if source == node_id => Effect::Nothing,
            InteractionState::Connecting { source } => {
                let source = source.clone();
                self.state = InteractionState::Idle;
                match graph.add_connection(&source, node_id) {
                    Some(connection) => Effect::Connected(connection),
                    None => Effect::ConnectionRefused {
                        source,
                        target: node_id.to_string(),
                    },
                }
            }
            InteractionState::Dragging { .. } => Effect::Nothing,
        }
    }

    /// Click on empty canvas: cancels a pending connection, otherwise clears
    /// the selection.
    pub fn background_click(&mut self) -> Effect {
        match &self.state {
            InteractionState::Connecting { source } => {
                log::debug!("Connection from '{}' cancelled", source);
                let source = source.clone();
                self.state = InteractionState::Idle;
                Effect::ConnectionCancelled(source)
            }
            InteractionState::Idle => {
                if self.selection.is_empty() {
                    return Effect::Nothing;
                }
                self.selection.clear();
                Effect::SelectionChanged(None)
            }
            InteractionState::Dragging { .. } => Effect::Nothing,
        }
    }

    /// Select a node directly. Leaves the interaction state alone.
    pub fn select(&mut self, graph: &FlowGraph, node_id: &str) -> Effect {
        if !graph.contains(node_id) || self.selection.contains(node_id) {
            return Effect::Nothing;
        }
        self.selection.select(node_id);
        Effect::SelectionChanged(Some(node_id.to_string()))
    }

    /// Clear the selection, as closing the property panel does.
    pub fn clear_selection(&mut self) -> Effect {
        if self.selection.is_empty() {
            return Effect::Nothing;
        }
        self.selection.clear();
        Effect::SelectionChanged(None)
    }

    /// A palette item was dropped on the canvas.
    ///
    /// `payload` is the string read under [`PALETTE_PAYLOAD_KEY`]; `pointer`
    /// and `canvas_origin` share a coordinate space. The new node is
    /// centered under the pointer and selected.
    pub fn drop_palette_item(
        &mut self,
        graph: &mut FlowGraph,
        payload: &str,
        pointer: Position,
        canvas_origin: Position,
    ) -> Effect {
        if self.state != InteractionState::Idle {
            return Effect::Nothing;
        }
        let kind: NodeKind = match payload.parse() {
            Ok(kind) => kind,
            Err(err) => {
                log::debug!("Ignoring palette drop: {}", err);
                return Effect::Nothing;
            }
        };

        let position = drop_position(pointer, canvas_origin, self.drop_center_offset).clamp_non_negative();
        let id = graph.add_node(kind, position).id.clone();
        self.selection.select(id.as_str());
        Effect::NodeAdded(id)
    }

    /// Delete a node from the editing surface.
    ///
    /// Refused for start nodes. Clears the selection and leaves any drag or
    /// pending connection that involved the node.
    pub fn delete_node(&mut self, graph: &mut FlowGraph, node_id: &str) -> Effect {
        if !self.can_delete(graph, node_id) {
            return Effect::Nothing;
        }
        if graph.delete_node(node_id).is_none() {
            return Effect::Nothing;
        }
        self.forget(node_id);
        Effect::NodeDeleted(node_id.to_string())
    }

    /// Drop any reference to nodes that are no longer in `graph`.
    ///
    /// Call after mutating the graph outside the controller.
    pub fn sync_with(&mut self, graph: &FlowGraph) {
        let stale = match &self.state {
            InteractionState::Dragging { node_id, .. } => (!graph.contains(node_id)).then(|| node_id.clone()),
            InteractionState::Connecting { source } => (!graph.contains(source)).then(|| source.clone()),
            InteractionState::Idle => None,
        };
        if let Some(id) = stale {
            self.forget(&id);
        }
        if let Some(selected) = self.selection.current().map(str::to_string) {
            if !graph.contains(&selected) {
                self.selection.clear();
            }
        }
    }

    /// Back to `Idle` with nothing selected.
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
        self.selection.clear();
    }

    fn forget(&mut self, node_id: &str) {
        self.selection.deselect(node_id);
        let involved = match &self.state {
            InteractionState::Dragging { node_id: id, .. } => id == node_id,
            InteractionState::Connecting { source } => source == node_id,
            InteractionState::Idle => false,
        };
        if involved {
            log::debug!("Node '{}' removed mid-gesture, back to idle", node_id);
            self.state = InteractionState::Idle;
        }
    }
}
