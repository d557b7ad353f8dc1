//! Editing session: one tree, one selection, explicit command dispatch.

use tracing::{debug, instrument};

use crate::application::ApplicationResult;
use crate::domain::{
    Command, Direction, Node, NodeId, Outcome, Selection, SelectionController, TreeArena,
};

/// Everything the UI edits, scoped to one open mind map.
#[derive(Debug)]
pub struct Session {
    tree: TreeArena,
    selection: SelectionController,
}

impl Session {
    /// Fresh map holding only a root node.
    pub fn new(root_title: impl Into<String>) -> Self {
        Self::from_tree(TreeArena::new(root_title))
    }

    pub fn from_tree(tree: TreeArena) -> Self {
        Self {
            tree,
            selection: SelectionController::new(),
        }
    }

    pub fn tree(&self) -> &TreeArena {
        &self.tree
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selection.selected()
    }

    pub fn snapshot(&self) -> Node {
        self.tree.snapshot()
    }

    /// Select a node; selecting the current selection again clears it.
    ///
    /// Ids that are not in the tree leave the selection untouched.
    pub fn select(&mut self, id: NodeId) -> Selection {
        if !self.tree.contains(id) {
            debug!("select: {} not in tree", id);
            return self.selection.state();
        }
        self.selection.select(id)
    }

    pub fn deselect(&mut self) {
        self.selection.deselect();
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selection.is_selected(id)
    }

    /// Apply a command addressed to an explicit node.
    ///
    /// Removing the selected node (or one of its ancestors) clears the selection.
    #[instrument(level = "debug", skip(self))]
    pub fn dispatch(&mut self, command: Command) -> Outcome {
        let outcome = self.tree.apply(&command);
        if let Outcome::Removed(removed) = &outcome {
            if self.selection.forget(removed) {
                debug!("dispatch: selection cleared by {}", command.name());
            }
        }
        debug!("dispatch {}: {:?}", command.name(), outcome);
        outcome
    }

    fn dispatch_selected(&mut self, command: impl FnOnce(NodeId) -> Command) -> Outcome {
        match self.selection.selected() {
            Some(target) => self.dispatch(command(target)),
            None => {
                debug!("dispatch_selected: nothing selected");
                Outcome::Unchanged
            }
        }
    }

    /// Append a child titled `title` under the selected node.
    pub fn add_to_selected(&mut self, title: &str) -> Outcome {
        self.dispatch_selected(|target| Command::AddChild {
            target,
            title: title.to_string(),
        })
    }

    /// Delete the selected node and its subtree.
    ///
    /// The selection is always cleared, also when the root refuses deletion.
    pub fn delete_selected(&mut self) -> Outcome {
        let outcome = self.dispatch_selected(|target| Command::Delete { target });
        self.selection.deselect();
        outcome
    }

    pub fn move_selected(&mut self, direction: Direction) -> Outcome {
        self.dispatch_selected(|target| Command::MoveSibling { target, direction })
    }

    pub fn indent_selected(&mut self) -> Outcome {
        self.dispatch_selected(|target| Command::ChangeLevel { target, delta: 1 })
    }

    pub fn outdent_selected(&mut self) -> Outcome {
        self.dispatch_selected(|target| Command::ChangeLevel { target, delta: -1 })
    }

    pub fn rename_selected(&mut self, title: &str) -> Outcome {
        self.dispatch_selected(|target| Command::Rename {
            target,
            title: title.to_string(),
        })
    }

    /// Pretty JSON of the current tree.
    pub fn export_json(&self) -> ApplicationResult<String> {
        Ok(self.tree.to_json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{IdSource, SequentialIds};

    fn session() -> Session {
        Session::from_tree(TreeArena::with_ids("Root", Box::new(SequentialIds::new())))
    }

    #[test]
    fn given_no_selection_when_adding_then_nothing_changes() {
        let mut session = session();
        let before = session.snapshot();

        assert_eq!(session.add_to_selected("A"), Outcome::Unchanged);
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn given_unknown_id_when_selecting_then_selection_unchanged() {
        let mut session = session();
        let root = session.tree().root_id();
        session.select(root);

        let stranger = SequentialIds::starting_at(99).next_id();
        assert_eq!(session.select(stranger), Selection::Selected(root));
    }

    #[test]
    fn given_selected_root_when_deleting_then_root_survives_and_selection_clears() {
        let mut session = session();
        let root = session.tree().root_id();
        session.select(root);

        assert_eq!(session.delete_selected(), Outcome::Unchanged);
        assert!(session.tree().contains(root));
        assert_eq!(session.selected(), None);
    }
}
