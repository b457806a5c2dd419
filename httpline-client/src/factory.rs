//! Client and pipeline construction.

use crate::client::HttpClient;
use crate::config::ClientConfig;
use crate::transport::ReqwestTransport;
use httpline_core::stages::{DefaultHeadersStage, TracingStage};
use httpline_core::{compose, ConfigurationError, Pipeline, Stage, Transport};
use httpline_retries::RetryHandler;
use std::sync::Arc;
use tracing::debug;

/// Builds [`HttpClient`]s and bare [`Pipeline`]s.
///
/// Every client gets a default-headers stage as its outermost stage, ahead
/// of the caller's handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientFactory;

impl ClientFactory {
    /// The stages a client gets when the caller has no opinion: retries,
    /// then per-attempt tracing.
    pub fn default_handlers() -> Vec<Arc<dyn Stage>> {
        vec![Arc::new(RetryHandler::new()), Arc::new(TracingStage::new())]
    }

    /// Create a client with the default config.
    pub fn create(
        handlers: impl IntoIterator<Item = Arc<dyn Stage>>,
    ) -> Result<HttpClient, ConfigurationError> {
        Self::create_with_config(ClientConfig::default(), handlers)
    }

    /// Create a client from `config`, sending over reqwest.
    pub fn create_with_config(
        config: ClientConfig,
        handlers: impl IntoIterator<Item = Arc<dyn Stage>>,
    ) -> Result<HttpClient, ConfigurationError> {
        config.validate()?;
        let transport = ReqwestTransport::from_config(&config)?;
        Self::create_with_transport(config, Arc::new(transport), handlers)
    }

    /// Create a client from `config` around any transport.
    pub fn create_with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        handlers: impl IntoIterator<Item = Arc<dyn Stage>>,
    ) -> Result<HttpClient, ConfigurationError> {
        config.validate()?;

        let headers: Arc<dyn Stage> = Arc::new(DefaultHeadersStage::new(config.header_map()?));
        let stages = std::iter::once(headers).chain(handlers);
        let pipeline = Self::create_pipeline(transport, stages)?;

        debug!(
            stages = ?pipeline.stage_names(),
            timeout_ms = config.timeout.as_millis() as u64,
            "Created HTTP client"
        );

        Ok(HttpClient::new(
            Arc::new(pipeline),
            config.timeout,
            config.base_url()?,
        ))
    }

    /// Wire `handlers`, outermost first, around `transport`.
    pub fn create_pipeline(
        transport: Arc<dyn Transport>,
        handlers: impl IntoIterator<Item = Arc<dyn Stage>>,
    ) -> Result<Pipeline, ConfigurationError> {
        compose(Some(transport), handlers.into_iter().map(Some).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpline_core::mock::{MockReply, MockTransport};
    use httpline_core::Request;
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;
    use std::time::Duration;

    #[test]
    fn test_default_handlers() {
        let pipeline = ClientFactory::create_pipeline(
            Arc::new(MockTransport::new()),
            ClientFactory::default_handlers(),
        )
        .unwrap();
        assert_eq!(pipeline.stage_names(), vec!["retry", "tracing"]);
    }

    #[test]
    fn test_create_prepends_default_headers() {
        let client = ClientFactory::create(ClientFactory::default_handlers()).unwrap();
        assert_eq!(
            client.pipeline().stage_names(),
            vec!["default-headers", "retry", "tracing"]
        );
        assert_eq!(client.timeout(), Duration::from_secs(100));
    }

    #[test]
    fn test_invalid_config_rejected_before_build() {
        let err = ClientFactory::create_with_config(
            ClientConfig::new().timeout(Duration::ZERO),
            ClientFactory::default_handlers(),
        )
        .unwrap_err();
        assert_eq!(err, ConfigurationError::InvalidTimeout(Duration::ZERO));
    }

    #[test]
    fn test_reused_handler_rejected() {
        let retry: Arc<dyn Stage> = Arc::new(RetryHandler::new());
        let err = ClientFactory::create_pipeline(
            Arc::new(MockTransport::new()),
            vec![retry.clone(), retry],
        )
        .unwrap_err();
        assert_eq!(err, ConfigurationError::StageReused { index: 0 });
    }

    #[tokio::test]
    async fn test_headers_reach_transport() {
        let transport = MockTransport::new().with_reply(MockReply::status(StatusCode::OK));
        let client = ClientFactory::create_with_transport(
            ClientConfig::new().default_header("x-tenant", "contoso"),
            Arc::new(transport.clone()),
            Vec::new(),
        )
        .unwrap();

        client
            .send(Request::get("http://example.org/").unwrap())
            .await
            .unwrap();

        let sent = &transport.recorded_requests()[0];
        assert_eq!(sent.headers["sdkversion"], crate::config::SDK_VERSION);
        assert_eq!(sent.headers["cache-control"], "no-cache, no-store");
        assert_eq!(sent.headers["x-tenant"], "contoso");
    }
}
