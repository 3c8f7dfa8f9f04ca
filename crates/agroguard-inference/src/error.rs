//! Error types for the inference adapter.
//!
//! Failures never cross the adapter boundary as panics; every operation
//! returns a `Result` the orchestrator matches on.

use thiserror::Error;

/// Errors returned by classification operations.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The model artifact could not be located or parsed.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),
    /// The input image could not be decoded; terminal for this call.
    #[error("failed to decode image: {0}")]
    BadImage(String),
    /// The forward pass itself failed or produced an unusable output.
    #[error("inference failed: {0}")]
    Forward(String),
}
