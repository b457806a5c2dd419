//! # httpline-core
//!
//! Core types for the httpline HTTP middleware pipeline.
//!
//! - **Messages**: [`Request`], [`Response`], [`Body`] and the per-request
//!   [`Properties`] bag
//! - **Composition**: the [`Stage`] and [`Transport`] traits, and [`Next`]
//! - **Wiring**: [`compose`] and [`PipelineBuilder`] turn an ordered stage
//!   list plus a transport into a shareable [`Pipeline`]
//! - **Cloning**: [`clone_request`] makes replayable copies of requests
//! - **Errors**: [`ConfigurationError`] at setup time, [`PipelineError`] at
//!   request time
//!
//! ## Example
//!
//! ```rust
//! use httpline_core::mock::{MockReply, MockTransport};
//! use httpline_core::{PipelineBuilder, Request, stages::TracingStage};
//! use reqwest::StatusCode;
//!
//! # tokio_test::block_on(async {
//! let pipeline = PipelineBuilder::new()
//!     .stage(TracingStage::new())
//!     .transport(MockTransport::new().with_reply(MockReply::status(StatusCode::OK)))
//!     .build()
//!     .unwrap();
//!
//! let response = pipeline
//!     .send(Request::get("http://example.org/").unwrap())
//!     .await
//!     .unwrap();
//! assert_eq!(response.status(), StatusCode::OK);
//! # });
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod clone;
pub mod error;
pub mod message;
pub mod mock;
pub mod pipeline;
pub mod stage;
pub mod stages;

// Re-exports for convenience
pub use clone::clone_request;
pub use error::{BoxError, ConfigurationError, PipelineError, Result};
pub use message::{Body, BodyStream, Properties, PropertyValue, Request, Response};
pub use pipeline::{compose, Pipeline, PipelineBuilder};
pub use stage::{Next, Stage, Transport};

// Types callers need to build requests and inspect responses.
pub use reqwest::header;
pub use reqwest::{Method, StatusCode, Url};
pub use tokio_util::sync::CancellationToken;
