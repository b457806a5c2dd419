//! Retry stage.

use crate::config::RetryConfig;
use crate::policy::{DefaultRetryPolicy, RetryPolicy};
use async_trait::async_trait;
use httpline_core::{clone_request, Next, PipelineError, Request, Response, Result, Stage};
use reqwest::header::{HeaderName, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Request header carrying the 1-based retry number.
#[allow(clippy::declare_interior_mutable_const)]
pub const RETRY_ATTEMPT: HeaderName = HeaderName::from_static("retry-attempt");

/// Per-call retry bookkeeping.
///
/// Lives on the stack of a single [`RetryHandler::handle`] call so that
/// concurrent calls through one handler never share counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryContext {
    /// Retries performed so far.
    pub attempt: u32,
    /// Delay computed for the latest retry.
    pub delay: Duration,
}

/// Stage that resends requests answered with a transient failure.
///
/// After each response the policy is asked whether to retry. Each retry sends
/// a fresh copy of the request carrying `Retry-Attempt: <n>`, after waiting
/// for the delay the policy computes. Once the retry budget is spent the
/// last response is returned as-is, whatever its status; exhaustion is not
/// an error.
///
/// Transport errors are never retried. Cancellation interrupts both the
/// wait and the in-flight send.
#[derive(Clone)]
pub struct RetryHandler {
    policy: Arc<dyn RetryPolicy>,
}

impl RetryHandler {
    /// Create a handler with the default policy.
    pub fn new() -> Self {
        Self::with_config(RetryConfig::default())
    }

    /// Create a handler with the default policy and a custom config.
    pub fn with_config(config: RetryConfig) -> Self {
        Self::with_policy(DefaultRetryPolicy::new(config))
    }

    /// Create a handler with a custom policy.
    pub fn with_policy(policy: impl RetryPolicy + 'static) -> Self {
        Self {
            policy: Arc::new(policy),
        }
    }

    /// The policy in use.
    pub fn policy(&self) -> &dyn RetryPolicy {
        self.policy.as_ref()
    }
}

impl Default for RetryHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RetryHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryHandler")
            .field("max_retries", &self.policy.max_retries())
            .finish()
    }
}

#[async_trait]
impl Stage for RetryHandler {
    async fn handle(&self, request: Request, next: Next<'_>) -> Result<Response> {
        let mut context = RetryContext::default();
        let max_retries = self.policy.max_retries();

        // Inner stages mutate what they are handed, so every retry is built
        // from the request as it reached this stage.
        let template = clone_request(&request);
        let mut response = next.run(request).await?;

        while self.policy.should_retry(&response) && context.attempt < max_retries {
            context.attempt += 1;
            context.delay = self.policy.compute_delay(&response, context.attempt);

            let mut retry = clone_request(&template);
            set_retry_attempt(&mut retry, context.attempt);

            debug!(
                attempt = context.attempt,
                max_retries,
                status = response.status().as_u16(),
                wait_ms = context.delay.as_millis() as u64,
                url = %retry.url(),
                "Waiting before retry"
            );

            tokio::select! {
                biased;
                _ = next.cancellation().cancelled() => {
                    debug!(attempt = context.attempt, "Retry cancelled while waiting");
                    return Err(PipelineError::Cancelled);
                }
                _ = sleep(context.delay) => {}
            }

            response = next.run(retry).await?;
        }

        if context.attempt > 0 && self.policy.should_retry(&response) {
            warn!(
                attempts = context.attempt,
                status = response.status().as_u16(),
                "Retries exhausted, returning last response"
            );
        }

        Ok(response)
    }

    fn name(&self) -> &'static str {
        "retry"
    }
}

/// Set `Retry-Attempt`, replacing every value already present.
fn set_retry_attempt(request: &mut Request, attempt: u32) {
    request
        .headers_mut()
        .insert(RETRY_ATTEMPT, HeaderValue::from(attempt));
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream;
    use httpline_core::mock::{MockReply, MockTransport};
    use httpline_core::{Body, CancellationToken, Pipeline, PipelineBuilder};
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;
    use rstest::rstest;
    use tokio::time::Instant;

    fn pipeline(transport: &MockTransport) -> Pipeline {
        PipelineBuilder::new()
            .stage(RetryHandler::new())
            .transport(transport.clone())
            .build()
            .unwrap()
    }

    fn status(code: u16) -> MockReply {
        MockReply::status(StatusCode::from_u16(code).unwrap())
    }

    fn post() -> Request {
        Request::post("http://example.org/foo").unwrap()
    }

    fn attempt_values(response: &Response) -> Vec<String> {
        response
            .request()
            .headers()
            .get_all(RETRY_ATTEMPT)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }

    #[rstest]
    #[case(200)]
    #[case(201)]
    #[case(404)]
    #[case(500)]
    #[tokio::test]
    async fn test_non_retryable_status_passes_through(#[case] code: u16) {
        let transport = MockTransport::new().with_reply(status(code).with_body("payload"));

        let response = pipeline(&transport).send(post()).await.unwrap();

        assert_eq!(response.status().as_u16(), code);
        assert_eq!(response.text(), "payload");
        assert!(!response.request().headers().contains_key(RETRY_ATTEMPT));
        assert_eq!(transport.call_count(), 1);
    }

    #[rstest]
    #[case(503)]
    #[case(429)]
    #[tokio::test(start_paused = true)]
    async fn test_retry_adds_single_attempt_header(#[case] code: u16) {
        let transport = MockTransport::new()
            .with_reply(status(code))
            .with_reply(status(200));

        let response = pipeline(&transport).send(post()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(attempt_values(&response), vec!["1"]);
        assert_eq!(transport.call_count(), 2);
        assert!(!transport.recorded_requests()[0]
            .headers
            .contains_key(RETRY_ATTEMPT));
    }

    #[rstest]
    #[case(503)]
    #[case(429)]
    #[tokio::test(start_paused = true)]
    async fn test_buffered_body_is_replayed(#[case] code: u16) {
        let transport = MockTransport::new().with_reply(status(code));
        let request = post().with_body("Hello World");

        let response = pipeline(&transport).send(request).await.unwrap();

        let recorded = transport.recorded_requests();
        assert_eq!(recorded.len(), 4);
        for sent in &recorded {
            assert_eq!(sent.body.as_deref(), Some(&b"Hello World"[..]));
        }
        assert_eq!(
            response.request().body().as_bytes(),
            Some(&Bytes::from_static(b"Hello World"))
        );
    }

    #[rstest]
    #[case(503)]
    #[case(429)]
    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_last_response(#[case] code: u16) {
        let transport = MockTransport::new().with_reply(status(code));

        let response = pipeline(&transport).send(post()).await.unwrap();

        assert_eq!(response.status().as_u16(), code);
        assert_eq!(attempt_values(&response), vec!["3"]);
        // First send plus three retries, nothing more.
        assert_eq!(transport.call_count(), 4);

        let sent: Vec<Option<String>> = transport
            .recorded_requests()
            .iter()
            .map(|r| {
                r.headers
                    .get(RETRY_ATTEMPT)
                    .map(|v| v.to_str().unwrap().to_string())
            })
            .collect();
        assert_eq!(
            sent,
            vec![
                None,
                Some("1".to_string()),
                Some("2".to_string()),
                Some("3".to_string())
            ]
        );
    }

    #[rstest]
    #[case(503)]
    #[case(429)]
    #[tokio::test(start_paused = true)]
    async fn test_waits_for_retry_after(#[case] code: u16) {
        let transport = MockTransport::new()
            .with_reply(status(code).with_header("retry-after", "4"))
            .with_reply(status(200));

        let started = Instant::now();
        let response = pipeline(&transport).send(post()).await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(elapsed >= Duration::from_secs(4), "{:?}", elapsed);
        assert!(elapsed < Duration::from_secs(5), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exponential_fallback_without_retry_after() {
        let transport = MockTransport::new().with_reply(status(503));

        let started = Instant::now();
        pipeline(&transport).send(post()).await.unwrap();

        // 1s + 2s + 4s with the default back-off.
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(7), "{:?}", elapsed);
        assert!(elapsed < Duration::from_secs(8), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_retry_after_uses_fallback() {
        let transport = MockTransport::new()
            .with_reply(status(503).with_header("retry-after", "soon"))
            .with_reply(status(200));

        let started = Instant::now();
        let response = pipeline(&transport).send(post()).await.unwrap();

        let elapsed = started.elapsed();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(elapsed >= Duration::from_secs(1), "{:?}", elapsed);
        assert!(elapsed < Duration::from_secs(2), "{:?}", elapsed);
    }

    #[rstest]
    #[case(503)]
    #[case(429)]
    #[tokio::test]
    async fn test_streamed_body_is_not_retried(#[case] code: u16) {
        let transport = MockTransport::new()
            .with_reply(status(code))
            .with_reply(status(200));
        let request = post().with_body(Body::from_stream(stream::iter(vec![
            Ok::<_, std::io::Error>(Bytes::from_static(b"Hello ")),
            Ok(Bytes::from_static(b"World")),
        ])));

        let response = pipeline(&transport).send(request).await.unwrap();

        assert_eq!(response.status().as_u16(), code);
        assert!(!response.request().headers().contains_key(RETRY_ATTEMPT));
        assert_eq!(transport.call_count(), 1);
        assert!(transport.recorded_requests()[0].streamed);
    }

    #[tokio::test]
    async fn test_transport_error_is_not_retried() {
        let transport = MockTransport::new().with_reply(MockReply::error("connection refused"));

        let err = pipeline(&transport).send(post()).await.unwrap_err();

        assert!(matches!(err, PipelineError::Transport(_)));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_calls_keep_separate_counts() {
        // 503 for a first send, 200 for any retry.
        let transport = MockTransport::from_fn(|request| {
            if request.headers().contains_key(RETRY_ATTEMPT) {
                MockReply::status(StatusCode::OK)
            } else {
                MockReply::status(StatusCode::SERVICE_UNAVAILABLE)
            }
        });
        let pipeline = Arc::new(pipeline(&transport));

        let a = tokio::spawn({
            let pipeline = pipeline.clone();
            async move {
                pipeline
                    .send(Request::get("http://example.org/a").unwrap())
                    .await
            }
        });
        let b = tokio::spawn({
            let pipeline = pipeline.clone();
            async move {
                pipeline
                    .send(Request::get("http://example.org/b").unwrap())
                    .await
            }
        });

        let a = a.await.unwrap().unwrap();
        let b = b.await.unwrap().unwrap();

        assert_eq!(a.status(), StatusCode::OK);
        assert_eq!(b.status(), StatusCode::OK);
        assert_eq!(attempt_values(&a), vec!["1"]);
        assert_eq!(attempt_values(&b), vec!["1"]);
        assert_eq!(a.request().url().path(), "/a");
        assert_eq!(b.request().url().path(), "/b");
        assert_eq!(transport.call_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_wait() {
        let transport = MockTransport::new()
            .with_reply(status(503).with_header("retry-after", "3600"))
            .with_reply(status(200));
        let pipeline = pipeline(&transport);

        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(1)).await;
            canceller.cancel();
        });

        let started = Instant::now();
        let err = pipeline
            .send_with_cancellation(post(), &token)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_config() {
        let transport = MockTransport::new().with_reply(status(503));
        let pipeline = PipelineBuilder::new()
            .stage(RetryHandler::with_config(
                RetryConfig::new()
                    .max_retries(1)
                    .fixed(Duration::from_millis(10)),
            ))
            .transport(transport.clone())
            .build()
            .unwrap();

        let response = pipeline.send(post()).await.unwrap();

        assert_eq!(attempt_values(&response), vec!["1"]);
        assert_eq!(transport.call_count(), 2);
    }

    /// Appends a header to whatever passes through.
    struct AppendAuth;

    #[async_trait]
    impl Stage for AppendAuth {
        async fn handle(&self, mut request: Request, next: Next<'_>) -> Result<Response> {
            request.headers_mut().append(
                HeaderName::from_static("x-auth"),
                HeaderValue::from_static("token"),
            );
            next.run(request).await
        }
    }

    #[rstest]
    #[case(503)]
    #[case(429)]
    #[tokio::test(start_paused = true)]
    async fn test_inner_stage_changes_do_not_accumulate(#[case] code: u16) {
        let transport = MockTransport::new().with_reply(status(code));
        let pipeline = PipelineBuilder::new()
            .stage(RetryHandler::new())
            .stage(AppendAuth)
            .transport(transport.clone())
            .build()
            .unwrap();

        pipeline.send(post().with_body("Hello World")).await.unwrap();

        let recorded = transport.recorded_requests();
        assert_eq!(recorded.len(), 4);
        for sent in &recorded {
            let auth: Vec<_> = sent.headers.get_all("x-auth").iter().collect();
            assert_eq!(auth, vec!["token"]);
            assert!(sent.headers.get_all(RETRY_ATTEMPT).iter().count() <= 1);
            assert_eq!(sent.body.as_deref(), Some(&b"Hello World"[..]));
        }
    }

    #[test]
    fn test_set_retry_attempt_overwrites() {
        let mut request = post()
            .with_header(RETRY_ATTEMPT, HeaderValue::from_static("7"))
            .with_header(RETRY_ATTEMPT, HeaderValue::from_static("8"));

        set_retry_attempt(&mut request, 2);

        let values: Vec<_> = request.headers().get_all(RETRY_ATTEMPT).iter().collect();
        assert_eq!(values, vec!["2"]);
    }
}
