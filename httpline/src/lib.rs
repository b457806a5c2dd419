//! # httpline - HTTP middleware pipeline for Rust
//!
//! httpline sends requests through an ordered chain of stages ending in a
//! transport. The headline stage is the retry handler, which transparently
//! resends requests that a service answered with `503 Service Unavailable` or
//! `429 Too Many Requests`.
//!
//! ## Quick Start
//!
//! ```ignore
//! use httpline::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ClientFactory::create_with_config(
//!         ClientConfig::new().base_address("https://graph.example.org/v1.0"),
//!         ClientFactory::default_handlers(),
//!     )?;
//!
//!     let response = client.get("me").await?;
//!     println!("{}", response.text());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description | Default |
//! |---------|-------------|--------|
//! | `tracing-integration` | [`init_tracing`] helper backed by `tracing-subscriber` | ❌ |
//!
//! ## Architecture
//!
//! - [`httpline_core`] - Messages, stages, pipeline wiring and errors
//! - [`httpline_retries`] - Retry handler and policies
//! - [`httpline_client`] - Reqwest transport, configuration and client
//!
//! ## Custom Pipelines
//!
//! Any [`Transport`] can sit at the end of a pipeline, including the
//! scripted mock used in tests.
//!
//! ```rust
//! use httpline::core::mock::{MockReply, MockTransport};
//! use httpline::prelude::*;
//!
//! # tokio_test::block_on(async {
//! let pipeline = PipelineBuilder::new()
//!     .stage(TracingStage::new())
//!     .stage(RetryHandler::with_config(RetryConfig::new().max_retries(5)))
//!     .transport(MockTransport::new().with_reply(MockReply::status(StatusCode::OK)))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(pipeline.stage_names(), vec!["tracing", "retry"]);
//! let response = pipeline
//!     .send(Request::get("http://example.org/").unwrap())
//!     .await
//!     .unwrap();
//! assert_eq!(response.status(), StatusCode::OK);
//! # });
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// Crate Re-exports
// ============================================================================

/// Messages, stages, pipeline wiring and errors.
pub use httpline_core as core;

/// Retry handler and policies.
pub use httpline_retries as retries;

/// Reqwest transport, configuration and client.
pub use httpline_client as client;

// ============================================================================
// Flat Re-exports
// ============================================================================

pub use httpline_core::{
    clone_request, compose, Body, CancellationToken, ConfigurationError, Next, Pipeline,
    PipelineBuilder, PipelineError, Properties, Request, Response, Stage, Transport,
};
pub use httpline_core::{header, Method, StatusCode, Url};

pub use httpline_retries::{
    DefaultRetryPolicy, ExponentialBackoff, RetryConfig, RetryHandler, RetryPolicy, WaitStrategy,
    MAX_RETRY, RETRY_ATTEMPT,
};

pub use httpline_client::{ClientConfig, ClientFactory, HttpClient, ReqwestTransport};

/// Install a `fmt` subscriber filtered by `RUST_LOG`, defaulting to
/// `httpline=info`.
///
/// Fails if a global subscriber is already set.
#[cfg(feature = "tracing-integration")]
#[cfg_attr(docsrs, doc(cfg(feature = "tracing-integration")))]
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("httpline=info"));
    tracing_subscriber::fmt().with_env_filter(filter).try_init()
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        Body, CancellationToken, ClientConfig, ClientFactory, ConfigurationError, HttpClient,
        Method, Pipeline, PipelineBuilder, PipelineError, Request, Response, RetryConfig,
        RetryHandler, RetryPolicy, ReqwestTransport, Stage, StatusCode, Transport,
    };
    pub use httpline_core::stages::{DefaultHeadersStage, TracingStage};
}
