//! Domain-level errors

use thiserror::Error;

use crate::domain::NodeId;

/// Domain errors represent violations of the tree invariants.
///
/// Stale or unknown node ids are not errors: tree operations treat them as no-ops.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("duplicate node id in mind map: {0}")]
    DuplicateId(NodeId),

    #[error("cannot encode mind map: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("invalid mind map document: {0}")]
    Decode(#[source] serde_json::Error),
}
