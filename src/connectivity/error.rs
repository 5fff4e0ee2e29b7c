//! Error types for connectivity operations.

use crate::board::FeatureId;
use thiserror::Error;

/// Errors returned by the engine's mutating operations.
///
/// Geometric problems and net conflicts are not errors: degenerate features
/// are excluded from the graph and conflicts are cluster state.
#[derive(Debug, Error)]
pub enum ConnectivityError {
    /// The rebuild was cancelled before commit; dirty items were kept.
    #[error("Rebuild cancelled with {0} dirty items left for the next pass")]
    Cancelled(usize),

    /// The feature has no items in the registry.
    #[error("Feature {0} is not registered")]
    UnknownFeature(FeatureId),

    /// The feature already has items in the registry.
    #[error("Feature {0} is already registered")]
    DuplicateFeature(FeatureId),

    /// An internal consistency check failed.
    #[error("Connectivity invariant violated: {0}")]
    InvariantViolation(String),
}

/// Result type for connectivity operations.
pub type ConnectivityResult<T> = std::result::Result<T, ConnectivityError>;
