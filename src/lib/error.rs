use std::collections::TryReserveError;

use thiserror::Error;

/// Errors reported by [`RbTree`](crate::RbTree) operations.
///
/// Lookups that miss, erasing a handle that names nothing, and min/max on
/// an empty tree are not errors; those return `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Storage for a new node could not be reserved. The tree is unchanged.
    #[error("insertion failed: could not allocate a tree node")]
    AllocationFailed(#[from] TryReserveError),
    /// An export was asked to write into a zero-length destination.
    #[error("export capacity must be non-zero")]
    ZeroCapacity,
}

/// Result alias for tree operations.
pub type Result<T> = std::result::Result<T, Error>;
