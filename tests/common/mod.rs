//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use chatflow_editor::Effect;
use std::cell::RefCell;
use std::rc::Rc;

/// Tracks callback invocations for testing.
///
/// Each field records what the corresponding UI callback was called with.
#[derive(Default, Clone)]
pub struct CallbackTracker {
    /// (node_id, x, y)
    pub node_pressed: Rc<RefCell<Vec<(String, f32, f32)>>>,
    /// (x, y)
    pub pointer_moved: Rc<RefCell<Vec<(f32, f32)>>>,
    /// Count of pointer_released calls
    pub pointer_released: Rc<RefCell<usize>>,
    /// (node_id,)
    pub handle_clicked: Rc<RefCell<Vec<String>>>,
    /// Count of background_clicked calls
    pub background_clicked: Rc<RefCell<usize>>,
    /// (payload, x, y)
    pub palette_dropped: Rc<RefCell<Vec<(String, f32, f32)>>>,
    /// (node_id,)
    pub delete_requested: Rc<RefCell<Vec<String>>>,
    /// Every effect the editor reported, in order
    pub effects: Rc<RefCell<Vec<Effect>>>,
}

impl CallbackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all recorded callbacks.
    pub fn clear(&self) {
        self.node_pressed.borrow_mut().clear();
        self.pointer_moved.borrow_mut().clear();
        *self.pointer_released.borrow_mut() = 0;
        self.handle_clicked.borrow_mut().clear();
        *self.background_clicked.borrow_mut() = 0;
        self.palette_dropped.borrow_mut().clear();
        self.delete_requested.borrow_mut().clear();
        self.effects.borrow_mut().clear();
    }

    pub fn last_effect(&self) -> Option<Effect> {
        self.effects.borrow().last().cloned()
    }
}
