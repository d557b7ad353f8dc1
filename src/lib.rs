//! Hierarchical mind-map editing.
//!
//! The tree lives in an arena ([`domain::TreeArena`]); edits are [`domain::Command`] values
//! dispatched through an explicit [`application::Session`], which also owns the single-node
//! selection. Maps are stored as pretty-printed JSON.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
