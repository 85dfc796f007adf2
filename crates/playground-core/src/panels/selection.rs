/// Single-row selection in a resource table.
#[derive(Clone, Debug, Default)]
pub struct SelectionState {
    selected_id: Option<String>,
}

impl SelectionState {
    /// Select `id`, or clear the selection if `id` is already selected.
    pub fn toggle(&mut self, id: &str) {
        if self.selected_id.as_deref() == Some(id) {
            self.selected_id = None;
        } else {
            self.selected_id = Some(id.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.selected_id = None;
    }

    pub fn id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.id() == Some(id)
    }

    pub fn has_selection(&self) -> bool {
        self.selected_id.is_some()
    }
}
