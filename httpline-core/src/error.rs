//! Error types for httpline.
//!
//! Errors are split by when they can happen. [`ConfigurationError`] is only
//! produced while a pipeline or client is being assembled, so misuse surfaces
//! before any traffic flows. [`PipelineError`] is produced while a request is
//! in flight.

use std::time::Duration;
use thiserror::Error;

/// Boxed error used for transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Invalid pipeline or client wiring, raised at construction time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// No terminal transport was supplied.
    #[error("pipeline has no transport")]
    MissingTransport,

    /// A stage slot was empty.
    #[error("stage at index {index} is missing")]
    NullStage {
        /// Position in the stage list, outermost first.
        index: usize,
    },

    /// The same stage instance was wired twice.
    #[error("stage at index {index} is already wired into this pipeline")]
    StageReused {
        /// Position of the outer occurrence, outermost first.
        index: usize,
    },

    /// The overall timeout must be strictly positive.
    #[error("invalid timeout {0:?}: overall timeout must be greater than zero")]
    InvalidTimeout(Duration),

    /// The base address cannot be used to resolve relative URIs.
    #[error("invalid base address: {0}")]
    InvalidBaseAddress(String),

    /// A default header name or value is malformed.
    #[error("invalid header {name}: {reason}")]
    InvalidHeader {
        /// Header name as supplied.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The proxy URL was rejected.
    #[error("invalid proxy: {0}")]
    InvalidProxy(String),

    /// The underlying HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(String),
}

/// Errors raised while a request travels through a pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The transport failed to deliver the request. Never retried.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The call was cancelled by its caller.
    #[error("request cancelled")]
    Cancelled,

    /// The overall per-call timeout elapsed.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl PipelineError {
    /// Wrap any error as a transport failure.
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }

    /// Create an invalid request error.
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Check if this error came from a cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if this error came from the overall timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            PipelineError::InvalidRequest(err.to_string())
        } else {
            PipelineError::Transport(Box::new(err))
        }
    }
}

impl From<anyhow::Error> for PipelineError {
    fn from(err: anyhow::Error) -> Self {
        PipelineError::Transport(err.into())
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        assert_eq!(
            ConfigurationError::MissingTransport.to_string(),
            "pipeline has no transport"
        );
        assert!(ConfigurationError::StageReused { index: 2 }
            .to_string()
            .contains("index 2"));
        assert!(ConfigurationError::InvalidTimeout(Duration::ZERO)
            .to_string()
            .contains("greater than zero"));
    }

    #[test]
    fn test_pipeline_error_kinds() {
        assert!(PipelineError::Cancelled.is_cancelled());
        assert!(!PipelineError::Cancelled.is_timeout());
        assert!(PipelineError::Timeout(Duration::from_secs(1)).is_timeout());

        let err = PipelineError::from(anyhow::anyhow!("connection reset"));
        assert!(matches!(err, PipelineError::Transport(_)));
        assert!(err.to_string().contains("connection reset"));
    }
}
