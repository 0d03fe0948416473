use slint::{Model, SharedString, VecModel};

/// The current single-node selection.
///
/// Selection is session state owned by the interaction layer; it is never
/// part of the persisted graph.
#[derive(Debug, Default, Clone)]
pub struct SelectionManager {
    selected: Option<String>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `id` the selection, replacing any previous one.
    pub fn select(&mut self, id: impl Into<String>) {
        self.selected = Some(id.into());
    }

    /// Clear the current selection
    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Clear the selection if it is `id`. Returns `true` if it was.
    pub fn deselect(&mut self, id: &str) -> bool {
        if self.contains(id) {
            self.selected = None;
            true
        } else {
            false
        }
    }

    /// Check if an ID is selected
    pub fn contains(&self, id: &str) -> bool {
        self.selected.as_deref() == Some(id)
    }

    pub fn current(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_none()
    }

    /// Sync the selection to a Slint VecModel (zero or one row)
    pub fn sync_to_model(&self, model: &VecModel<SharedString>) {
        match &self.selected {
            Some(id) => {
                let id = SharedString::from(id.as_str());
                if model.row_count() == 0 {
                    model.push(id);
                } else {
                    model.set_row_data(0, id);
                }
                while model.row_count() > 1 {
                    model.remove(model.row_count() - 1);
                }
            }
            None => {
                while model.row_count() > 0 {
                    model.remove(0);
                }
            }
        }
    }
}
