//! High-level façade for flow editor applications.
//!
//! [`FlowEditor`] bundles the graph, the interaction controller and the
//! settings behind shared handles, and hands out callbacks a Slint window
//! can install directly.
//!
//! # Example
//!
//! ```ignore
//! use chatflow_editor::FlowEditor;
//!
//! slint::include_modules!();
//!
//! fn main() {
//!     let window = MainWindow::new().unwrap();
//!     let editor = FlowEditor::new();
//!
//!     let selection = Rc::new(VecModel::<SharedString>::default());
//!     editor.bind_selection_model(selection.clone());
//!     window.set_selection(ModelRc::from(selection));
//!
//!     let paths = Rc::new(VecModel::<ConnectionPath>::default());
//!     editor.bind_paths_model(paths.clone(), |id, commands| ConnectionPath { id, commands });
//!     window.set_connection_paths(ModelRc::from(paths));
//!
//!     window.on_node_pressed(editor.node_pressed_callback());
//!     window.on_pointer_moved(editor.pointer_moved_callback());
//!     window.on_pointer_released(editor.pointer_released_callback());
//!     window.on_handle_clicked(editor.handle_clicked_callback());
//!     window.on_background_clicked(editor.background_clicked_callback());
//!     window.on_palette_dropped(editor.palette_dropped_callback());
//!     window.on_delete_node(editor.delete_node_callback());
//!
//!     window.on_validate({
//!         let editor = editor.clone();
//!         let w = window.as_weak();
//!         move || {
//!             if let Some(w) = w.upgrade() {
//!                 w.set_validation_message(editor.validate().message.into());
//!             }
//!         }
//!     });
//!
//!     window.run().unwrap();
//! }
//! ```

use crate::config::EditorConfig;
use crate::controller::{EditorEvent, Effect, InteractionController, InteractionState, PointerButton};
use crate::document::{export_document_with, parse_document, FlowDocument, FlowMetadata};
use crate::error::{ConnectionError, ImportError, ParseError};
use crate::geometry::connection_path;
use crate::graph::FlowGraph;
use crate::hit_test::{connection_at, hit_test, HitTarget};
use crate::model::{Connection, NodeUpdate, Position};
use crate::paths::ConnectionPaths;
use crate::validate::{validate_with, ValidationMode, ValidationReport};
use chrono::Utc;
use slint::{SharedString, VecModel};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// Shared editor state plus callback implementations.
///
/// Clone this to share it across callbacks; all clones see the same graph.
#[derive(Clone)]
pub struct FlowEditor {
    graph: Rc<RefCell<FlowGraph>>,
    controller: Rc<RefCell<InteractionController>>,
    config: Rc<RefCell<EditorConfig>>,
    paths: Rc<RefCell<ConnectionPaths>>,
    selection_model: Rc<RefCell<Option<Rc<VecModel<SharedString>>>>>,
}

impl Default for FlowEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowEditor {
    /// Editor over a fresh graph holding the default start node.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let mut graph = FlowGraph::new();
        graph.set_rules(config.connection_rules());
        Self {
            graph: Rc::new(RefCell::new(graph)),
            controller: Rc::new(RefCell::new(InteractionController::with_config(&config))),
            config: Rc::new(RefCell::new(config)),
            paths: Rc::new(RefCell::new(ConnectionPaths::new())),
            selection_model: Rc::new(RefCell::new(None)),
        }
    }

    // === Accessors ===

    /// Get access to the graph.
    ///
    /// Call [`FlowEditor::sync`] after mutating it directly.
    pub fn graph(&self) -> Rc<RefCell<FlowGraph>> {
        self.graph.clone()
    }

    /// Re-align the controller and the bound models with the graph after it
    /// was edited through [`FlowEditor::graph`].
    pub fn sync(&self) {
        self.controller.borrow_mut().sync_with(&self.graph.borrow());
        self.refresh_paths();
        self.refresh_selection();
    }

    pub fn config(&self) -> EditorConfig {
        self.config.borrow().clone()
    }

    pub fn state(&self) -> InteractionState {
        self.controller.borrow().state().clone()
    }

    /// Id of the selected node, if any.
    pub fn selected(&self) -> Option<String> {
        self.controller.borrow().selected().map(str::to_string)
    }

    pub fn wants_pointer_moves(&self) -> bool {
        self.controller.borrow().wants_pointer_moves()
    }

    pub fn can_delete(&self, node_id: &str) -> bool {
        self.controller.borrow().can_delete(&self.graph.borrow(), node_id)
    }

    /// Set the handle hit radius (default: 8.0).
    pub fn set_handle_radius(&self, radius: f32) {
        self.config.borrow_mut().set_handle_radius(radius);
    }

    /// Set the validation mode (default: connectivity).
    pub fn set_validation_mode(&self, mode: ValidationMode) {
        self.config.borrow_mut().set_validation_mode(mode);
    }

    // === Model binding ===

    /// Keep `model` holding the current selection (zero or one row).
    pub fn bind_selection_model(&self, model: Rc<VecModel<SharedString>>) {
        self.controller.borrow().selection().sync_to_model(&model);
        *self.selection_model.borrow_mut() = Some(model);
    }

    /// Keep `model` holding one row per connection curve.
    ///
    /// The constructor receives `(connection_id, path_commands)`.
    pub fn bind_paths_model<P, F>(&self, model: Rc<VecModel<P>>, constructor: F)
    where
        P: Clone + 'static,
        F: Fn(SharedString, SharedString) -> P + 'static,
    {
        let mut paths = self.paths.borrow_mut();
        paths.bind_model(model, constructor);
        paths.update(&self.graph.borrow());
    }

    /// `(connection_id, path_commands)` for every connection.
    pub fn connection_paths(&self) -> Vec<(String, String)> {
        self.paths
            .borrow()
            .paths()
            .map(|(id, commands)| (id.to_string(), commands.to_string()))
            .collect()
    }

    // === Event handling ===

    /// Run one event through the controller and push the result to any
    /// bound models.
    pub fn dispatch(&self, event: EditorEvent) -> Effect {
        let effect = {
            let mut graph = self.graph.borrow_mut();
            self.controller.borrow_mut().dispatch(&mut graph, event)
        };
        if effect.mutated_graph() {
            self.refresh_paths();
        }
        self.refresh_selection();
        effect
    }

    /// Resolve a raw canvas click and dispatch what it hit.
    ///
    /// Handles activate, bodies select, empty canvas counts as a background
    /// click.
    pub fn click_at(&self, x: f32, y: f32) -> Effect {
        match self.hit(x, y) {
            HitTarget::Handle { node_id, .. } => self.dispatch(EditorEvent::HandleActivated { node_id }),
            HitTarget::Body(node_id) => self.dispatch(EditorEvent::SelectNode { node_id }),
            HitTarget::Background => self.dispatch(EditorEvent::BackgroundClick),
        }
    }

    /// What is under a canvas point.
    pub fn hit(&self, x: f32, y: f32) -> HitTarget {
        let radius = self.config.borrow().handle_radius;
        hit_test(&self.graph.borrow(), Position::new(x, y), radius)
    }

    /// Id of the connection under a canvas point, if any.
    pub fn connection_at(&self, x: f32, y: f32) -> Option<String> {
        let config = self.config.borrow();
        let graph = self.graph.borrow();
        connection_at(
            &graph,
            Position::new(x, y),
            config.connection_hover_distance,
            config.hit_samples,
        )
        .map(|c| c.id.clone())
    }

    /// Apply a property-panel edit or programmatic move.
    pub fn update_node(&self, node_id: &str, update: NodeUpdate) -> bool {
        let moved = update.position.is_some();
        let changed = self.graph.borrow_mut().update_node(node_id, update);
        if changed && moved {
            self.refresh_paths();
        }
        changed
    }

    /// Connect two nodes outside of the click gesture, reporting refusals.
    pub fn connect(&self, source: &str, target: &str) -> Result<Connection, ConnectionError> {
        let connection = self.graph.borrow_mut().try_add_connection(source, target)?;
        self.refresh_paths();
        Ok(connection)
    }

    // === Callback factories ===

    /// Returns a callback for `node-pressed(node-id, x, y)` (primary button).
    pub fn node_pressed_callback(&self) -> impl Fn(SharedString, f32, f32) {
        let editor = self.clone();
        move |node_id, x, y| {
            editor.dispatch(EditorEvent::PointerDown {
                node_id: node_id.to_string(),
                pointer: Position::new(x, y),
                button: PointerButton::Primary,
            });
        }
    }

    /// Returns a callback for `pointer-moved(x, y)`.
    pub fn pointer_moved_callback(&self) -> impl Fn(f32, f32) {
        let editor = self.clone();
        move |x, y| {
            editor.dispatch(EditorEvent::PointerMove {
                pointer: Position::new(x, y),
            });
        }
    }

    /// Returns a callback for `pointer-released()`.
    pub fn pointer_released_callback(&self) -> impl Fn() {
        let editor = self.clone();
        move || {
            editor.dispatch(EditorEvent::PointerUp);
        }
    }

    /// Returns a callback for `handle-clicked(node-id)`.
    pub fn handle_clicked_callback(&self) -> impl Fn(SharedString) {
        let editor = self.clone();
        move |node_id| {
            editor.dispatch(EditorEvent::HandleActivated {
                node_id: node_id.to_string(),
            });
        }
    }

    /// Returns a callback for `background-clicked()`.
    pub fn background_clicked_callback(&self) -> impl Fn() {
        let editor = self.clone();
        move || {
            editor.dispatch(EditorEvent::BackgroundClick);
        }
    }

    /// Returns a callback for `node-selected(node-id)`.
    pub fn node_selected_callback(&self) -> impl Fn(SharedString) {
        let editor = self.clone();
        move |node_id| {
            editor.dispatch(EditorEvent::SelectNode {
                node_id: node_id.to_string(),
            });
        }
    }

    /// Returns a callback for `palette-dropped(kind, x, y, canvas-x, canvas-y)`.
    pub fn palette_dropped_callback(&self) -> impl Fn(SharedString, f32, f32, f32, f32) {
        let editor = self.clone();
        move |payload, x, y, canvas_x, canvas_y| {
            editor.dispatch(EditorEvent::PaletteDrop {
                payload: payload.to_string(),
                pointer: Position::new(x, y),
                canvas_origin: Position::new(canvas_x, canvas_y),
            });
        }
    }

    /// Returns a callback for `delete-node(node-id)`.
    pub fn delete_node_callback(&self) -> impl Fn(SharedString) {
        let editor = self.clone();
        move |node_id| {
            editor.dispatch(EditorEvent::DeleteNode {
                node_id: node_id.to_string(),
            });
        }
    }

    /// Returns a callback for `compute-connection-path(source, target)`.
    ///
    /// Empty when either node is unknown.
    pub fn compute_connection_path_callback(&self) -> impl Fn(SharedString, SharedString) -> SharedString {
        let graph = self.graph.clone();
        move |source, target| {
            let graph = graph.borrow();
            let path = match (graph.node(&source), graph.node(&target)) {
                (Some(s), Some(t)) => connection_path(s, t).to_svg_path(),
                _ => String::new(),
            };
            SharedString::from(path)
        }
    }

    // === Validation and documents ===

    /// Validate with the configured mode.
    pub fn validate(&self) -> ValidationReport {
        let mode = self.config.borrow().validation_mode;
        let report = validate_with(&self.graph.borrow(), mode);
        log::debug!("Validation ({:?}): {}", mode, report.message);
        report
    }

    /// Snapshot the graph with the configured document name and version.
    pub fn export_document(&self) -> FlowDocument {
        let config = self.config.borrow();
        let metadata = FlowMetadata {
            name: config.document_name.clone(),
            created_at: Utc::now(),
            version: config.document_version.clone(),
        };
        export_document_with(&self.graph.borrow(), metadata)
    }

    pub fn export_json(&self) -> serde_json::Result<String> {
        self.export_document().to_json()
    }

    /// Replace the live graph with a parsed document.
    ///
    /// On failure the graph is left untouched. On success the controller
    /// returns to `Idle` with nothing selected.
    pub fn import_json(&self, text: &str) -> Result<(), ParseError> {
        let document = parse_document(text).map_err(|err| {
            log::error!("Error parsing JSON file: {}", err);
            err
        })?;

        self.graph.borrow_mut().replace_with(document);
        self.controller.borrow_mut().reset();
        self.refresh_paths();
        self.refresh_selection();
        Ok(())
    }

    /// Read and import a `.json` file.
    pub fn import_file(&self, path: impl AsRef<Path>) -> Result<(), ImportError> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if !is_json {
            return Err(ImportError::UnsupportedExtension(path.to_path_buf()));
        }

        let text = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.import_json(&text)?;
        log::debug!("Imported flow from '{}'", path.display());
        Ok(())
    }

    fn refresh_paths(&self) {
        self.paths.borrow_mut().update(&self.graph.borrow());
    }

    fn refresh_selection(&self) {
        if let Some(model) = self.selection_model.borrow().as_ref() {
            self.controller.borrow().selection().sync_to_model(model);
        }
    }
}
