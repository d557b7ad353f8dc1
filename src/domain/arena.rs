use std::collections::HashMap;
use std::fmt;

use generational_arena::{Arena, Index};
use itertools::Itertools;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::domain::command::{Command, Direction, Outcome};
use crate::domain::error::DomainError;
use crate::domain::node::{IdSource, Node, NodeId, UuidSource};

/// Data payload for mind-map nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// Immutable identity
    pub id: NodeId,
    /// Label shown to the user
    pub title: String,
    /// Cosmetic indent depth, independent of the node's position in the tree
    pub level: u32,
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

impl From<&Node> for NodeData {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id,
            title: node.title.clone(),
            level: node.level,
        }
    }
}

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug)]
pub struct TreeNode {
    /// Node payload
    pub data: NodeData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in display order
    pub children: Vec<Index>,
}

/// Arena-based mind-map tree.
///
/// Uses a generational arena for memory-safe node references and an id index for O(1)
/// lookups. The root always exists. Every mutation addressed by an unknown id is a no-op
/// that reports [`Outcome::Unchanged`].
#[derive(Debug)]
pub struct TreeArena {
    /// Arena storage for all tree nodes
    arena: Arena<TreeNode>,
    /// Index of the root node
    root: Index,
    root_id: NodeId,
    /// Node id -> arena slot
    index: HashMap<NodeId, Index>,
    /// Fresh ids for added nodes
    ids: Box<dyn IdSource>,
}

impl Default for TreeArena {
    fn default() -> Self {
        Self::new("Root")
    }
}

impl TreeArena {
    /// Single-root tree with random node ids.
    pub fn new(root_title: impl Into<String>) -> Self {
        Self::with_ids(root_title, Box::new(UuidSource))
    }

    pub fn with_ids(root_title: impl Into<String>, mut ids: Box<dyn IdSource>) -> Self {
        let data = NodeData {
            id: ids.next_id(),
            title: root_title.into(),
            level: 0,
        };
        Self::from_root(data, ids)
    }

    fn from_root(data: NodeData, ids: Box<dyn IdSource>) -> Self {
        let root_id = data.id;
        let mut arena = Arena::new();
        let root = arena.insert(TreeNode {
            data,
            parent: None,
            children: Vec::new(),
        });
        Self {
            arena,
            root,
            root_id,
            index: HashMap::from([(root_id, root)]),
            ids,
        }
    }

    /// Rebuild a tree from its nested form.
    ///
    /// Fails if the snapshot repeats an id.
    #[instrument(level = "debug", skip_all)]
    pub fn from_snapshot(snapshot: &Node, ids: Box<dyn IdSource>) -> Result<Self, DomainError> {
        if let Some(dup) = snapshot.ids().into_iter().duplicates().next() {
            return Err(DomainError::DuplicateId(dup));
        }
        let mut tree = Self::from_root(NodeData::from(snapshot), ids);
        let root = tree.root;
        tree.insert_snapshot_children(root, &snapshot.children);
        debug!("from_snapshot: {} nodes", tree.node_count());
        Ok(tree)
    }

    fn insert_snapshot_children(&mut self, parent: Index, children: &[Node]) {
        for child in children {
            let idx = self.insert_node(NodeData::from(child), parent);
            self.insert_snapshot_children(idx, &child.children);
        }
    }

    /// Parse the JSON export format.
    ///
    /// Nesting depth is unbounded: every tree `to_json` writes can be read back.
    pub fn from_json(text: &str, ids: Box<dyn IdSource>) -> Result<Self, DomainError> {
        let mut de = serde_json::Deserializer::from_str(text);
        de.disable_recursion_limit();
        let snapshot = Node::deserialize(serde_stacker::Deserializer::new(&mut de))
            .map_err(DomainError::Decode)?;
        de.end().map_err(DomainError::Decode)?;
        Self::from_snapshot(&snapshot, ids)
    }

    /// Pretty-printed JSON of the whole tree.
    #[instrument(level = "debug", skip(self))]
    pub fn to_json(&self) -> Result<String, DomainError> {
        serde_json::to_string_pretty(&self.snapshot()).map_err(DomainError::Encode)
    }

    #[instrument(level = "trace", skip(self))]
    fn insert_node(&mut self, data: NodeData, parent: Index) -> Index {
        let id = data.id;
        let node = TreeNode {
            data,
            parent: Some(parent),
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent) = self.arena.get_mut(parent) {
            parent.children.push(node_idx);
        }
        self.index.insert(id, node_idx);

        node_idx
    }

    fn fresh_id(&mut self) -> NodeId {
        loop {
            let id = self.ids.next_id();
            if !self.index.contains_key(&id) {
                return id;
            }
            debug!("fresh_id: {} already in use, drawing again", id);
        }
    }

    // ------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn root(&self) -> Index {
        self.root
    }

    pub fn root_id(&self) -> NodeId {
        self.root_id
    }

    pub fn index_of(&self, id: NodeId) -> Option<Index> {
        self.index.get(&id).copied()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn find(&self, id: NodeId) -> Option<&NodeData> {
        self.index_of(id)
            .and_then(|idx| self.get_node(idx))
            .map(|node| &node.data)
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        let node = self.get_node(self.index_of(id)?)?;
        self.get_node(node.parent?).map(|parent| parent.data.id)
    }

    pub fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        self.index_of(id)
            .and_then(|idx| self.get_node(idx))
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|&child| self.get_node(child))
                    .map(|child| child.data.id)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Pre-order traversal from the root.
    pub fn iter(&self) -> TreeIterator {
        TreeIterator::new(self, self.root)
    }

    /// All node ids in pre-order, the order `show` lists them in.
    pub fn ids(&self) -> Vec<NodeId> {
        self.iter().map(|(_, node)| node.data.id).collect()
    }

    /// The `n`-th node (0-based) in pre-order.
    pub fn nth(&self, n: usize) -> Option<NodeId> {
        self.iter().nth(n).map(|(_, node)| node.data.id)
    }

    /// Structural depth (a lone root has depth 1). Unrelated to the `level` field.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.calculate_depth(self.root)
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }

    /// Titles of all nodes without children, left to right.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_titles(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| node.data.title.clone())
            .collect()
    }

    /// Owned nested copy of the whole tree.
    pub fn snapshot(&self) -> Node {
        self.snapshot_of(self.root)
            .unwrap_or_else(|| Node::leaf(self.root_id, "", 0))
    }

    fn snapshot_of(&self, idx: Index) -> Option<Node> {
        let node = self.get_node(idx)?;
        Some(Node {
            id: node.data.id,
            title: node.data.title.clone(),
            level: node.data.level,
            children: node
                .children
                .iter()
                .filter_map(|&child| self.snapshot_of(child))
                .collect(),
        })
    }

    // ------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------

    /// Apply one command.
    pub fn apply(&mut self, command: &Command) -> Outcome {
        match command {
            Command::AddChild { target, title } => self.add_child(*target, title),
            Command::Delete { target } => self.delete(*target),
            Command::ChangeLevel { target, delta } => self.change_level(*target, *delta),
            Command::MoveSibling { target, direction } => self.move_sibling(*target, *direction),
            Command::Rename { target, title } => self.rename(*target, title),
        }
    }

    /// Append a new node as the last child of `target`, one level below it.
    #[instrument(level = "debug", skip(self))]
    pub fn add_child(&mut self, target: NodeId, title: &str) -> Outcome {
        let Some(parent_idx) = self.index_of(target) else {
            debug!("add_child: {} not found", target);
            return Outcome::Unchanged;
        };
        let level = self
            .get_node(parent_idx)
            .map(|parent| parent.data.level.saturating_add(1))
            .unwrap_or(1);
        let id = self.fresh_id();
        self.insert_node(
            NodeData {
                id,
                title: title.to_string(),
                level,
            },
            parent_idx,
        );
        Outcome::Added(id)
    }

    /// Remove `target` together with its whole subtree. The root cannot be deleted.
    #[instrument(level = "debug", skip(self))]
    pub fn delete(&mut self, target: NodeId) -> Outcome {
        let Some(idx) = self.index_of(target) else {
            debug!("delete: {} not found", target);
            return Outcome::Unchanged;
        };
        if idx == self.root {
            warn!("delete: refusing to delete root node {}", target);
            return Outcome::Unchanged;
        }

        let doomed: Vec<Index> = TreeIterator::new(self, idx).map(|(i, _)| i).collect();
        if let Some(parent_idx) = self.get_node(idx).and_then(|node| node.parent) {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.retain(|&child| child != idx);
            }
        }

        let removed: Vec<NodeId> = doomed
            .into_iter()
            .filter_map(|i| self.arena.remove(i))
            .map(|node| {
                self.index.remove(&node.data.id);
                node.data.id
            })
            .collect();
        debug!("delete: removed {} nodes", removed.len());
        Outcome::Removed(removed)
    }

    /// Shift the cosmetic level by `delta`, never below 0. Tree placement is untouched.
    #[instrument(level = "debug", skip(self))]
    pub fn change_level(&mut self, target: NodeId, delta: i32) -> Outcome {
        let Some(node) = self
            .index_of(target)
            .and_then(|idx| self.arena.get_mut(idx))
        else {
            debug!("change_level: {} not found", target);
            return Outcome::Unchanged;
        };
        let level = node.data.level.saturating_add_signed(delta);
        if level == node.data.level {
            return Outcome::Unchanged;
        }
        node.data.level = level;
        Outcome::Updated
    }

    /// Swap `target` with its previous or next sibling.
    ///
    /// Moving the first child up, the last child down, or the root at all is a no-op.
    #[instrument(level = "debug", skip(self))]
    pub fn move_sibling(&mut self, target: NodeId, direction: Direction) -> Outcome {
        let Some(idx) = self.index_of(target) else {
            debug!("move_sibling: {} not found", target);
            return Outcome::Unchanged;
        };
        let Some(parent) = self
            .get_node(idx)
            .and_then(|node| node.parent)
            .and_then(|parent_idx| self.arena.get_mut(parent_idx))
        else {
            debug!("move_sibling: {} has no siblings", target);
            return Outcome::Unchanged;
        };

        let siblings = &mut parent.children;
        let Some(current) = siblings.iter().position(|&child| child == idx) else {
            return Outcome::Unchanged;
        };
        match current
            .checked_add_signed(direction.offset())
            .filter(|&new_index| new_index < siblings.len())
        {
            Some(new_index) => {
                siblings.swap(current, new_index);
                Outcome::Updated
            }
            None => {
                debug!("move_sibling: {} already at the {} boundary", target, direction);
                Outcome::Unchanged
            }
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn rename(&mut self, target: NodeId, title: &str) -> Outcome {
        let Some(node) = self
            .index_of(target)
            .and_then(|idx| self.arena.get_mut(idx))
        else {
            debug!("rename: {} not found", target);
            return Outcome::Unchanged;
        };
        if node.data.title == title {
            return Outcome::Unchanged;
        }
        node.data.title = title.to_string();
        Outcome::Updated
    }
}

/// Pre-order iterator over a subtree.
pub struct TreeIterator<'a> {
    arena: &'a TreeArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a TreeArena, start: Index) -> Self {
        Self {
            arena,
            stack: vec![start],
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::SequentialIds;

    fn tree() -> TreeArena {
        TreeArena::with_ids("Root", Box::new(SequentialIds::new()))
    }

    fn added(outcome: Outcome) -> NodeId {
        match outcome {
            Outcome::Added(id) => id,
            other => panic!("expected Added, got {:?}", other),
        }
    }

    #[test]
    fn given_new_tree_when_inspecting_then_has_single_root_at_level_zero() {
        let tree = tree();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.depth(), 1);
        let root = tree.find(tree.root_id()).unwrap();
        assert_eq!(root.title, "Root");
        assert_eq!(root.level, 0);
    }

    #[test]
    fn given_child_added_when_inspecting_then_level_is_parent_plus_one() {
        let mut tree = tree();
        let root = tree.root_id();
        tree.change_level(root, 3);
        let a = added(tree.add_child(root, "A"));
        assert_eq!(tree.find(a).unwrap().level, 4);
        assert_eq!(tree.parent_of(a), Some(root));
    }

    #[test]
    fn given_subtree_when_deleting_then_index_forgets_all_descendants() {
        let mut tree = tree();
        let root = tree.root_id();
        let a = added(tree.add_child(root, "A"));
        let b = added(tree.add_child(a, "B"));
        let c = added(tree.add_child(b, "C"));

        let outcome = tree.delete(a);

        assert_eq!(outcome, Outcome::Removed(vec![a, b, c]));
        assert_eq!(tree.node_count(), 1);
        assert!(!tree.contains(c));
        assert!(tree.children_of(root).is_empty());
    }

    #[test]
    fn given_root_when_deleting_then_rejected() {
        let mut tree = tree();
        let root = tree.root_id();
        tree.add_child(root, "A");
        assert_eq!(tree.delete(root), Outcome::Unchanged);
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn given_colliding_id_source_when_adding_then_skips_used_ids() {
        let mut tree = TreeArena::with_ids("Root", Box::new(SequentialIds::new()));
        let root = tree.root_id();
        // restart the sequence so the next draw collides with the root id
        tree.ids = Box::new(SequentialIds::new());
        let a = added(tree.add_child(root, "A"));
        assert_ne!(a, root);
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn given_tree_when_iterating_then_visits_in_pre_order() {
        let mut tree = tree();
        let root = tree.root_id();
        let a = added(tree.add_child(root, "A"));
        let b = added(tree.add_child(a, "B"));
        let c = added(tree.add_child(root, "C"));

        assert_eq!(tree.ids(), vec![root, a, b, c]);
        assert_eq!(tree.nth(2), Some(b));
        assert_eq!(tree.leaf_titles(), vec!["B".to_string(), "C".to_string()]);
        assert_eq!(tree.depth(), 3);
    }
}
