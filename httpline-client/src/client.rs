//! The HTTP client.

use httpline_core::{
    Body, CancellationToken, Method, Pipeline, PipelineError, Request, Response, Result,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Sends requests through a [`Pipeline`] under an overall timeout.
///
/// Cheap to clone. Every clone shares the same pipeline.
#[derive(Debug, Clone)]
pub struct HttpClient {
    pipeline: Arc<Pipeline>,
    timeout: Duration,
    base_address: Option<Url>,
}

impl HttpClient {
    /// Create a client around an already wired pipeline.
    ///
    /// Prefer [`ClientFactory`](crate::ClientFactory), which validates the
    /// configuration first.
    pub fn new(pipeline: Arc<Pipeline>, timeout: Duration, base_address: Option<Url>) -> Self {
        Self {
            pipeline,
            timeout,
            base_address,
        }
    }

    /// The pipeline requests travel through.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Bound on a whole call, retries and delays included.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Base that relative paths resolve against.
    pub fn base_address(&self) -> Option<&Url> {
        self.base_address.as_ref()
    }

    /// Start a request for `path`.
    ///
    /// An absolute `http` or `https` URL is used as is. Anything else is resolved against the
    /// base address, and fails when there is none.
    pub fn request_builder(&self, method: Method, path: &str) -> Result<Request> {
        Ok(Request::new(method, self.resolve(path)?))
    }

    /// Send a request.
    pub async fn send(&self, request: Request) -> Result<Response> {
        self.send_with_cancellation(request, &CancellationToken::new())
            .await
    }

    /// Send a request, aborting promptly once `cancellation` fires.
    pub async fn send_with_cancellation(
        &self,
        request: Request,
        cancellation: &CancellationToken,
    ) -> Result<Response> {
        let method = request.method().clone();
        let url = request.url().clone();

        match tokio::time::timeout(
            self.timeout,
            self.pipeline.send_with_cancellation(request, cancellation),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    method = %method,
                    url = %url,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Request timed out"
                );
                Err(PipelineError::Timeout(self.timeout))
            }
        }
    }

    /// Send a GET request.
    pub async fn get(&self, path: &str) -> Result<Response> {
        self.send(self.request_builder(Method::GET, path)?).await
    }

    /// Send a POST request.
    pub async fn post(&self, path: &str, body: impl Into<Body>) -> Result<Response> {
        self.send(self.request_builder(Method::POST, path)?.with_body(body))
            .await
    }

    /// Send a PUT request.
    pub async fn put(&self, path: &str, body: impl Into<Body>) -> Result<Response> {
        self.send(self.request_builder(Method::PUT, path)?.with_body(body))
            .await
    }

    /// Send a PATCH request.
    pub async fn patch(&self, path: &str, body: impl Into<Body>) -> Result<Response> {
        self.send(self.request_builder(Method::PATCH, path)?.with_body(body))
            .await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> Result<Response> {
        self.send(self.request_builder(Method::DELETE, path)?).await
    }

    fn resolve(&self, path: &str) -> Result<Url> {
        // `items:search` parses with scheme `items`; only http(s) is absolute.
        if let Ok(absolute) = Url::parse(path) {
            if matches!(absolute.scheme(), "http" | "https") {
                return Ok(absolute);
            }
        }

        let base = self.base_address.as_ref().ok_or_else(|| {
            PipelineError::invalid_request(format!(
                "relative path {:?} but no base address configured",
                path
            ))
        })?;

        // Leading slashes would discard the base path, and `./` keeps a
        // colon in the first segment from reading as a scheme.
        let url = base
            .join(&format!("./{}", path.trim_start_matches('/')))
            .map_err(|e| PipelineError::invalid_request(format!("{}: {}", path, e)))?;
        debug!(path, url = %url, "Resolved request path");
        Ok(url)
    }
}
