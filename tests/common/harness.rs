//! Test harness around [`FlowEditor`].
//!
//! Mirrors how a Slint window wires the editor: bound selection and path
//! models, plus helpers that play the role of the UI callbacks. No window
//! or rendering backend is needed; `VecModel` works on its own.

#![allow(dead_code)]

use super::CallbackTracker;
use chatflow_editor::{
    EditorConfig, EditorEvent, Effect, FlowEditor, InteractionState, NodeKind, PointerButton, Position,
};
use slint::{Model, SharedString, VecModel};
use std::rc::Rc;

pub const START: &str = "start-1";

/// One row of the bound connection path model: (connection_id, commands).
pub type PathRow = (SharedString, SharedString);

/// Editor with a start node at (100, 100), a message at (400, 100) and an
/// end node at (700, 100). Nothing is connected yet.
pub struct FlowTestHarness {
    pub editor: FlowEditor,
    pub selection: Rc<VecModel<SharedString>>,
    pub paths: Rc<VecModel<PathRow>>,
    pub tracker: CallbackTracker,
    pub message: String,
    pub end: String,
}

impl FlowTestHarness {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let editor = FlowEditor::with_config(config);
        let (message, end) = {
            let graph = editor.graph();
            let mut graph = graph.borrow_mut();
            let message = graph.add_node(NodeKind::Message, Position::new(400.0, 100.0)).id.clone();
            let end = graph.add_node(NodeKind::End, Position::new(700.0, 100.0)).id.clone();
            (message, end)
        };

        let selection = Rc::new(VecModel::<SharedString>::default());
        editor.bind_selection_model(selection.clone());

        let paths = Rc::new(VecModel::<PathRow>::default());
        editor.bind_paths_model(paths.clone(), |id, commands| (id, commands));

        Self {
            editor,
            selection,
            paths,
            tracker: CallbackTracker::new(),
            message,
            end,
        }
    }

    fn record(&self, effect: Effect) -> Effect {
        self.tracker.effects.borrow_mut().push(effect.clone());
        effect
    }

    // === Simulated UI callbacks ===

    pub fn press(&self, node_id: &str, x: f32, y: f32) -> Effect {
        self.tracker.node_pressed.borrow_mut().push((node_id.to_string(), x, y));
        self.record(self.editor.dispatch(EditorEvent::PointerDown {
            node_id: node_id.to_string(),
            pointer: Position::new(x, y),
            button: PointerButton::Primary,
        }))
    }

    pub fn press_with(&self, node_id: &str, x: f32, y: f32, button: PointerButton) -> Effect {
        self.record(self.editor.dispatch(EditorEvent::PointerDown {
            node_id: node_id.to_string(),
            pointer: Position::new(x, y),
            button,
        }))
    }

    pub fn move_pointer(&self, x: f32, y: f32) -> Effect {
        self.tracker.pointer_moved.borrow_mut().push((x, y));
        self.record(self.editor.dispatch(EditorEvent::PointerMove {
            pointer: Position::new(x, y),
        }))
    }

    pub fn release(&self) -> Effect {
        *self.tracker.pointer_released.borrow_mut() += 1;
        self.record(self.editor.dispatch(EditorEvent::PointerUp))
    }

    /// Press, move in the given steps, release.
    pub fn drag(&self, node_id: &str, from: (f32, f32), steps: &[(f32, f32)]) {
        self.press(node_id, from.0, from.1);
        for &(x, y) in steps {
            self.move_pointer(x, y);
        }
        self.release();
    }

    pub fn click_handle(&self, node_id: &str) -> Effect {
        self.tracker.handle_clicked.borrow_mut().push(node_id.to_string());
        self.record(self.editor.dispatch(EditorEvent::HandleActivated {
            node_id: node_id.to_string(),
        }))
    }

    /// Click one handle, then the other.
    pub fn connect(&self, source: &str, target: &str) -> Effect {
        self.click_handle(source);
        self.click_handle(target)
    }

    pub fn click_background(&self) -> Effect {
        *self.tracker.background_clicked.borrow_mut() += 1;
        self.record(self.editor.dispatch(EditorEvent::BackgroundClick))
    }

    pub fn select(&self, node_id: &str) -> Effect {
        self.record(self.editor.dispatch(EditorEvent::SelectNode {
            node_id: node_id.to_string(),
        }))
    }

    /// Drop a palette item with the canvas at the window origin.
    pub fn drop_item(&self, payload: &str, x: f32, y: f32) -> Effect {
        self.tracker
            .palette_dropped
            .borrow_mut()
            .push((payload.to_string(), x, y));
        self.record(self.editor.dispatch(EditorEvent::PaletteDrop {
            payload: payload.to_string(),
            pointer: Position::new(x, y),
            canvas_origin: Position::default(),
        }))
    }

    /// Drop a palette item and return the new node's id.
    pub fn add(&self, kind: NodeKind, x: f32, y: f32) -> String {
        match self.drop_item(kind.as_str(), x, y) {
            Effect::NodeAdded(id) => id,
            other => panic!("drop of {kind} was not accepted: {other:?}"),
        }
    }

    pub fn delete(&self, node_id: &str) -> Effect {
        self.tracker.delete_requested.borrow_mut().push(node_id.to_string());
        self.record(self.editor.dispatch(EditorEvent::DeleteNode {
            node_id: node_id.to_string(),
        }))
    }

    // === Queries ===

    pub fn position(&self, node_id: &str) -> Option<Position> {
        self.editor.graph().borrow().node(node_id).map(|n| n.position)
    }

    pub fn outgoing(&self, node_id: &str) -> Vec<String> {
        self.editor
            .graph()
            .borrow()
            .outgoing(node_id)
            .map(<[String]>::to_vec)
            .unwrap_or_default()
    }

    pub fn connection_count(&self) -> usize {
        self.editor.graph().borrow().connections().len()
    }

    pub fn node_count(&self) -> usize {
        self.editor.graph().borrow().len()
    }

    pub fn state(&self) -> InteractionState {
        self.editor.state()
    }

    /// Selection as shown by the bound model.
    pub fn selected_in_model(&self) -> Option<String> {
        match self.selection.row_count() {
            0 => None,
            _ => self.selection.row_data(0).map(|s| s.to_string()),
        }
    }

    /// Path commands shown by the bound model, by connection id.
    pub fn path_in_model(&self, connection_id: &str) -> Option<String> {
        self.paths
            .iter()
            .find(|(id, _)| id.as_str() == connection_id)
            .map(|(_, commands)| commands.to_string())
    }
}
