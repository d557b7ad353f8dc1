//! Node identity and the owned snapshot form of a mind-map tree.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque node identifier, unique within one tree for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Uuid);

impl NodeId {
    /// First 8 hex digits, enough to tell nodes apart on screen.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for NodeId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Source of fresh node identifiers.
pub trait IdSource: fmt::Debug {
    fn next_id(&mut self) -> NodeId;
}

/// Random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidSource;

impl IdSource for UuidSource {
    fn next_id(&mut self) -> NodeId {
        NodeId(Uuid::new_v4())
    }
}

/// Deterministic ids (`00000000-0000-0000-0000-000000000001`, ...), for tests and fixtures.
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    next: u128,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(next: u128) -> Self {
        Self { next }
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> NodeId {
        self.next += 1;
        NodeId(Uuid::from_u128(self.next))
    }
}

/// Owned, nested form of a tree.
///
/// This is what gets exported and what the shell renders from; the store itself keeps
/// nodes in an arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub title: String,
    pub level: u32,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    pub fn leaf(id: NodeId, title: impl Into<String>, level: u32) -> Self {
        Self {
            id,
            title: title.into(),
            level,
            children: Vec::new(),
        }
    }

    /// All ids of this subtree in pre-order.
    pub fn ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::new();
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids(&self, ids: &mut Vec<NodeId>) {
        ids.push(self.id);
        for child in &self.children {
            child.collect_ids(ids);
        }
    }

    /// Depth-first pre-order search, first match wins.
    pub fn find(&self, id: NodeId) -> Option<&Node> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}
