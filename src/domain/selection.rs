//! Single-slot node selection.

use tracing::debug;

use crate::domain::NodeId;

/// At most one node is selected at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Empty,
    Selected(NodeId),
}

/// Tracks the node the UI treats as the active edit target.
///
/// Holds only an id; the tree stays the sole owner of node data.
#[derive(Debug, Default)]
pub struct SelectionController {
    state: Selection,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Selection {
        self.state
    }

    pub fn selected(&self) -> Option<NodeId> {
        match self.state {
            Selection::Empty => None,
            Selection::Selected(id) => Some(id),
        }
    }

    /// Select `id`, replacing any previous selection.
    ///
    /// Selecting the node that is already selected toggles the selection off.
    pub fn select(&mut self, id: NodeId) -> Selection {
        self.state = match self.state {
            Selection::Selected(current) if current == id => Selection::Empty,
            _ => Selection::Selected(id),
        };
        debug!("select {}: {:?}", id, self.state);
        self.state
    }

    pub fn deselect(&mut self) {
        self.state = Selection::Empty;
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.state == Selection::Selected(id)
    }

    /// Clear the selection if it points at one of `removed`.
    ///
    /// Returns true when the selection was cleared.
    pub fn forget(&mut self, removed: &[NodeId]) -> bool {
        match self.state {
            Selection::Selected(id) if removed.contains(&id) => {
                self.state = Selection::Empty;
                true
            }
            _ => false,
        }
    }
}
