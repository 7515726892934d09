//! Structured error kinds surfaced by the core operations.
//!
//! Commands propagate `anyhow::Result` and attach context; the variants here
//! exist so callers can branch on the failure kind (the CLI downcasts to
//! decide between a fatal report and a friendly message).

use crate::artifacts::merge::tree_merge::Conflict;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TwigError {
    /// A referenced object, branch or revision has no backing storage.
    #[error("{0} not found")]
    NotFound(String),

    /// An object file exists but its header or body cannot be parsed.
    #[error("corrupt object: {0}")]
    CorruptObject(String),

    /// Commit attempted with an empty staging index.
    #[error("nothing staged for commit")]
    NothingStaged,

    /// Branch creation collided with an existing branch.
    #[error("branch {0} already exists")]
    AlreadyExists(String),

    /// A merge stopped short of committing. This is a normal outcome: the
    /// conflict markers are already written and staged, and the repository
    /// is left in a resumable state.
    #[error("merge produced {} conflicting path(s)", conflicts.len())]
    MergeConflict { conflicts: Vec<Conflict> },

    /// Commit attempted with no configured author identity.
    #[error(
        "author identity is not configured; \
         set it with 'twig config user.name <name>' and 'twig config user.email <email>'"
    )]
    MissingIdentity,

    /// Operation attempted outside an initialized repository.
    #[error("not a twig repository (no .twig directory found)")]
    InvalidRepository,
}
