//! # httpline-client
//!
//! Ready-to-use HTTP clients built on the httpline pipeline.
//!
//! - **[`ClientConfig`]**: timeout, base address, cache control, proxy and
//!   default headers, checked up front by [`ClientConfig::validate`]
//! - **[`ClientFactory`]**: validates a config and wires handlers around a
//!   transport
//! - **[`HttpClient`]**: resolves paths and enforces the overall timeout
//! - **[`ReqwestTransport`]**: the network transport
//!
//! ## Example
//!
//! ```rust,ignore
//! use httpline_client::{ClientConfig, ClientFactory};
//!
//! let client = ClientFactory::create_with_config(
//!     ClientConfig::new().base_address("https://graph.example.org/v1.0"),
//!     ClientFactory::default_handlers(),
//! )?;
//!
//! let me = client.get("me").await?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod factory;
pub mod transport;

pub use client::HttpClient;
pub use config::{
    ClientConfig, DEFAULT_CACHE_CONTROL, DEFAULT_TIMEOUT, SDK_VERSION, SDK_VERSION_HEADER,
};
pub use factory::ClientFactory;
pub use transport::ReqwestTransport;
