//! Pass-through stages.

use crate::error::Result;
use crate::message::{Request, Response};
use crate::stage::{Next, Stage};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::time::Instant;
use tracing::{debug, warn};

/// Adds headers the request does not already carry.
///
/// Headers set by the caller always win; a name present on the request is
/// left untouched, whatever its values.
#[derive(Debug, Clone, Default)]
pub struct DefaultHeadersStage {
    headers: HeaderMap,
}

impl DefaultHeadersStage {
    /// Create a stage that adds `headers`.
    pub fn new(headers: HeaderMap) -> Self {
        Self { headers }
    }

    /// Headers this stage adds.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

#[async_trait]
impl Stage for DefaultHeadersStage {
    async fn handle(&self, mut request: Request, next: Next<'_>) -> Result<Response> {
        for name in self.headers.keys() {
            if request.headers().contains_key(name) {
                continue;
            }
            for value in self.headers.get_all(name) {
                request.headers_mut().append(name.clone(), value.clone());
            }
        }
        next.run(request).await
    }

    fn name(&self) -> &'static str {
        "default-headers"
    }
}

/// Logs every exchange that passes through it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingStage;

impl TracingStage {
    /// Create a new tracing stage.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Stage for TracingStage {
    async fn handle(&self, request: Request, next: Next<'_>) -> Result<Response> {
        let method = request.method().clone();
        let url = request.url().clone();
        let started = Instant::now();

        debug!(method = %method, url = %url, "Sending HTTP request");

        match next.run(request).await {
            Ok(response) => {
                debug!(
                    method = %method,
                    url = %url,
                    status = response.status().as_u16(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Received HTTP response"
                );
                Ok(response)
            }
            Err(error) => {
                warn!(
                    method = %method,
                    url = %url,
                    error = %error,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "HTTP request failed"
                );
                Err(error)
            }
        }
    }

    fn name(&self) -> &'static str {
        "tracing"
    }
}
