//! Domain layer: the mind-map tree, selection, and edit commands
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod command;
pub mod error;
pub mod node;
pub mod render;
pub mod selection;

pub use arena::{NodeData, TreeArena, TreeNode};
pub use command::{Command, Direction, Outcome};
pub use error::DomainError;
pub use node::{IdSource, Node, NodeId, SequentialIds, UuidSource};
pub use render::{RenderOptions, TreeRender};
pub use selection::{Selection, SelectionController};
