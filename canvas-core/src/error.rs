//! Error types for canvas operations.
//!
//! Canvas transitions never fail; invalid input is a silent no-op. These
//! errors cover configuration and (de)serialization only.

use thiserror::Error;

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur outside of state transitions.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Canvas state or action serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
