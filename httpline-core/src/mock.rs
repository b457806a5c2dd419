//! Mock transport for testing.
//!
//! [`MockTransport`] replays a script of canned replies, or asks a function
//! for each reply, and records every request it receives.
//!
//! ```rust
//! use httpline_core::mock::{MockReply, MockTransport};
//! use reqwest::StatusCode;
//!
//! let transport = MockTransport::new()
//!     .with_reply(MockReply::status(StatusCode::SERVICE_UNAVAILABLE))
//!     .with_reply(MockReply::status(StatusCode::OK));
//! ```

use crate::error::{PipelineError, Result};
use crate::message::{Body, Request, Response};
use crate::stage::Transport;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode, Url};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// A canned reply.
#[derive(Debug, Clone)]
pub struct MockReply {
    outcome: Outcome,
    latency: Option<Duration>,
}

#[derive(Debug, Clone)]
enum Outcome {
    Response {
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
    },
    Error(String),
}

impl MockReply {
    /// Reply with `status` and no headers.
    pub fn status(status: StatusCode) -> Self {
        Self {
            outcome: Outcome::Response {
                status,
                headers: HeaderMap::new(),
                body: Bytes::new(),
            },
            latency: None,
        }
    }

    /// Fail the send with a transport error.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Error(message.into()),
            latency: None,
        }
    }

    /// Add a response header.
    #[must_use]
    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        if let Outcome::Response { headers, .. } = &mut self.outcome {
            headers.append(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        self
    }

    /// Set the response body.
    #[must_use]
    pub fn with_body(mut self, content: impl Into<Bytes>) -> Self {
        if let Outcome::Response { body, .. } = &mut self.outcome {
            *body = content.into();
        }
        self
    }

    /// Wait this long before replying.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }
}

/// A request as seen by the mock transport.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request method.
    pub method: Method,
    /// Target URL.
    pub url: Url,
    /// Headers at send time.
    pub headers: HeaderMap,
    /// Buffered body content, if the body was buffered.
    pub body: Option<Bytes>,
    /// Whether the body was a stream.
    pub streamed: bool,
}

type Responder = dyn Fn(&Request) -> MockReply + Send + Sync;

enum Mode {
    Script(Mutex<VecDeque<MockReply>>),
    Responder(Box<Responder>),
}

/// Transport that answers from a script.
///
/// In script mode replies are used in order and the last one repeats once the
/// script runs out, which makes "always fails" scenarios a single entry.
#[derive(Clone)]
pub struct MockTransport {
    mode: Arc<Mode>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    /// Create an empty script. Sending with no replies scripted fails.
    pub fn new() -> Self {
        Self {
            mode: Arc::new(Mode::Script(Mutex::new(VecDeque::new()))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Decide each reply with a function of the incoming request.
    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&Request) -> MockReply + Send + Sync + 'static,
    {
        Self {
            mode: Arc::new(Mode::Responder(Box::new(responder))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append a reply to the script. Ignored in function mode.
    #[must_use]
    pub fn with_reply(self, reply: MockReply) -> Self {
        if let Mode::Script(queue) = self.mode.as_ref() {
            lock(queue).push_back(reply);
        }
        self
    }

    /// Every request received so far, in order.
    pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Number of sends so far.
    pub fn call_count(&self) -> usize {
        lock(&self.requests).len()
    }

    fn next_reply(&self, request: &Request) -> Option<MockReply> {
        match self.mode.as_ref() {
            Mode::Responder(responder) => Some(responder(request)),
            Mode::Script(queue) => {
                let mut queue = lock(queue);
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            }
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("calls", &self.call_count())
            .finish()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, mut request: Request) -> Result<Response> {
        let streamed = matches!(request.body(), Body::Stream(_));
        lock(&self.requests).push(RecordedRequest {
            method: request.method().clone(),
            url: request.url().clone(),
            headers: request.headers().clone(),
            body: request.body().as_bytes().cloned(),
            streamed,
        });

        // A real transport drains the stream; model that.
        drop(request.take_body());

        let reply = self.next_reply(&request).ok_or_else(|| {
            PipelineError::from(anyhow::anyhow!("mock transport has no scripted reply"))
        })?;

        if let Some(latency) = reply.latency {
            tokio::time::sleep(latency).await;
        }

        match reply.outcome {
            Outcome::Response {
                status,
                headers,
                body,
            } => Ok(Response::from_parts(status, headers, body, request)),
            Outcome::Error(message) => Err(PipelineError::from(anyhow::anyhow!(message))),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Request {
        Request::get("http://example.org/foo").unwrap()
    }

    #[tokio::test]
    async fn test_script_repeats_last_reply() {
        let transport = MockTransport::new()
            .with_reply(MockReply::status(StatusCode::SERVICE_UNAVAILABLE))
            .with_reply(MockReply::status(StatusCode::OK));

        let statuses = [
            transport.send(request()).await.unwrap().status(),
            transport.send(request()).await.unwrap().status(),
            transport.send(request()).await.unwrap().status(),
        ];

        assert_eq!(
            statuses,
            [StatusCode::SERVICE_UNAVAILABLE, StatusCode::OK, StatusCode::OK]
        );
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_empty_script_fails() {
        let transport = MockTransport::new();
        let err = transport.send(request()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Transport(_)));
    }

    #[tokio::test]
    async fn test_error_reply() {
        let transport = MockTransport::new().with_reply(MockReply::error("connection reset"));
        let err = transport.send(request()).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_from_fn_sees_request() {
        let transport = MockTransport::from_fn(|request| {
            if request.url().path() == "/missing" {
                MockReply::status(StatusCode::NOT_FOUND)
            } else {
                MockReply::status(StatusCode::OK).with_body("found")
            }
        });

        let missing = Request::get("http://example.org/missing").unwrap();
        assert_eq!(
            transport.send(missing).await.unwrap().status(),
            StatusCode::NOT_FOUND
        );
        let found = transport.send(request()).await.unwrap();
        assert_eq!(found.text(), "found");
    }

    #[tokio::test]
    async fn test_records_body() {
        let transport = MockTransport::new().with_reply(MockReply::status(StatusCode::OK));
        let request = Request::post("http://example.org/foo")
            .unwrap()
            .with_body("Hello World");

        let response = transport.send(request).await.unwrap();

        let recorded = transport.recorded_requests();
        assert_eq!(recorded[0].body.as_deref(), Some(&b"Hello World"[..]));
        assert!(!recorded[0].streamed);
        assert!(response.request().is_replayable());
    }
}
