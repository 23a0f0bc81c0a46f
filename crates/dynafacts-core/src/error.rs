//! Error types for the scan driver.

use dynafacts_model::InputError;

/// Failure of a single scan invocation.
///
/// Input errors are raised before any network call; service errors carry
/// the DynamoDB error message verbatim and are never retried here.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Invalid invocation parameters.
    #[error(transparent)]
    Input(#[from] InputError),

    /// The DynamoDB service call failed.
    #[error("DynamoDB scan failed: {0}")]
    Service(String),

    /// Internal error with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience result type for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;
