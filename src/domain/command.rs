//! Edit commands the UI emits against the tree.

use std::fmt;
use std::str::FromStr;

use crate::domain::NodeId;

/// Direction for reordering a node among its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Index offset within the sibling list.
    pub fn offset(self) -> isize {
        match self {
            Direction::Up => -1,
            Direction::Down => 1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" | "-1" => Ok(Direction::Up),
            "down" | "+1" | "1" => Ok(Direction::Down),
            other => Err(format!("invalid direction '{other}', expected 'up' or 'down'")),
        }
    }
}

/// One edit against one target node: `{op, target, payload}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddChild { target: NodeId, title: String },
    Delete { target: NodeId },
    ChangeLevel { target: NodeId, delta: i32 },
    MoveSibling { target: NodeId, direction: Direction },
    Rename { target: NodeId, title: String },
}

impl Command {
    pub fn target(&self) -> NodeId {
        match self {
            Command::AddChild { target, .. }
            | Command::Delete { target }
            | Command::ChangeLevel { target, .. }
            | Command::MoveSibling { target, .. }
            | Command::Rename { target, .. } => *target,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::AddChild { .. } => "add",
            Command::Delete { .. } => "delete",
            Command::ChangeLevel { .. } => "level",
            Command::MoveSibling { .. } => "move",
            Command::Rename { .. } => "rename",
        }
    }
}

/// What a command did to the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing changed: unknown target, boundary move, or rejected root deletion.
    Unchanged,
    /// A new node was appended.
    Added(NodeId),
    /// A node's title, level or sibling position changed.
    Updated,
    /// These nodes were removed (target first, then its descendants).
    Removed(Vec<NodeId>),
}

impl Outcome {
    pub fn is_changed(&self) -> bool {
        !matches!(self, Outcome::Unchanged)
    }
}
