//! Error types for the resource pool

use thiserror::Error;

/// Failure outcomes of the acquire paths
///
/// Membership and circulation operations (`add`, `remove`, `release`) report
/// their policy outcomes as ordinary return values instead: a duplicate add or
/// a release of an unknown resource is expected control flow, not an error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("No resource available - pool is closed or has no members")]
    Unavailable,

    #[error("Acquire timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Operation was cancelled")]
    Cancelled,
}

pub type PoolResult<T> = Result<T, PoolError>;
