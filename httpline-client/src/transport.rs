//! Transport backed by `reqwest`.

use crate::config::ClientConfig;
use async_trait::async_trait;
use httpline_core::{Body, ConfigurationError, PipelineError, Request, Response, Result, Transport};
use reqwest::Client;
use tracing::{debug, trace};

/// Sends requests over the network with a shared [`reqwest::Client`].
///
/// Redirects, connection pooling and TLS are reqwest's business. The
/// response body is read in full before the response re-enters the
/// pipeline.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with a default reqwest client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a custom reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Create a transport honouring the proxy in `config`.
    pub fn from_config(config: &ClientConfig) -> std::result::Result<Self, ConfigurationError> {
        let mut builder = Client::builder();
        if let Some(proxy) = config.reqwest_proxy()? {
            builder = builder.proxy(proxy);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigurationError::Http(e.to_string()))?;
        Ok(Self { client })
    }

    /// Get a reference to the underlying client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, mut request: Request) -> Result<Response> {
        let mut outbound = self
            .client
            .request(request.method().clone(), request.url().clone())
            .headers(request.headers().clone());

        outbound = match request.take_body() {
            Body::Empty => outbound,
            Body::Buffered(bytes) => outbound.body(bytes),
            Body::Stream(stream) => outbound.body(reqwest::Body::wrap_stream(stream)),
            Body::Consumed => {
                return Err(PipelineError::invalid_request(
                    "request body was already consumed by an earlier send",
                ))
            }
        };

        debug!(method = %request.method(), url = %request.url(), "Sending HTTP request");

        let response = outbound.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        trace!(status = status.as_u16(), bytes = body.len(), "Received HTTP response");

        Ok(Response::from_parts(status, headers, body, request))
    }
}
