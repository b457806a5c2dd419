//! # httpline-retries
//!
//! Retry stage for the httpline pipeline.
//!
//! [`RetryHandler`] resends requests answered with `503 Service Unavailable`
//! or `429 Too Many Requests`, up to [`MAX_RETRY`] times, as long as the
//! request body can be replayed.
//!
//! ## Core Concepts
//!
//! - **[`RetryPolicy`]**: decides whether to retry and how long to wait
//! - **[`DefaultRetryPolicy`]**: status-driven, honours `Retry-After`
//! - **[`RetryConfig`]**: retry budget, retryable statuses, fallback wait
//! - **[`ExponentialBackoff`]**: fallback delay when the server gives none
//!
//! ## Headers
//!
//! - `Retry-After` (response): whole seconds to wait; anything else falls
//!   back to the configured [`WaitStrategy`]
//! - `Retry-Attempt` (request): the 1-based retry number, always a single
//!   value
//!
//! ## Example
//!
//! ```rust
//! use httpline_core::mock::{MockReply, MockTransport};
//! use httpline_core::{PipelineBuilder, Request, StatusCode};
//! use httpline_retries::{RetryConfig, RetryHandler, RETRY_ATTEMPT};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let transport = MockTransport::new()
//!     .with_reply(MockReply::status(StatusCode::SERVICE_UNAVAILABLE))
//!     .with_reply(MockReply::status(StatusCode::OK));
//!
//! let pipeline = PipelineBuilder::new()
//!     .stage(RetryHandler::with_config(
//!         RetryConfig::new().exponential(Duration::from_millis(5), Duration::from_secs(10)),
//!     ))
//!     .transport(transport)
//!     .build()
//!     .unwrap();
//!
//! let response = pipeline
//!     .send(Request::get("http://example.org/").unwrap())
//!     .await
//!     .unwrap();
//! assert_eq!(response.status(), StatusCode::OK);
//! assert_eq!(response.request().headers()[RETRY_ATTEMPT], "1");
//! # });
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod backoff;
pub mod config;
pub mod handler;
pub mod policy;

/// Default retry budget.
pub const MAX_RETRY: u32 = 3;

// Re-exports
pub use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
pub use config::{RetryConfig, WaitStrategy};
pub use handler::{RetryContext, RetryHandler, RETRY_ATTEMPT};
pub use policy::{retry_after, DefaultRetryPolicy, RetryPolicy};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        DefaultRetryPolicy, ExponentialBackoff, RetryConfig, RetryHandler, RetryPolicy,
        WaitStrategy, MAX_RETRY,
    };
}
