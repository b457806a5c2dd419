//! Client configuration.

use httpline_core::ConfigurationError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CACHE_CONTROL};
use std::time::Duration;
use url::Url;

/// Header identifying the client library on every request.
#[allow(clippy::declare_interior_mutable_const)]
pub const SDK_VERSION_HEADER: HeaderName = HeaderName::from_static("sdkversion");

/// Value of [`SDK_VERSION_HEADER`].
pub const SDK_VERSION: &str = concat!("httpline-rust/", env!("CARGO_PKG_VERSION"));

/// `Cache-Control` sent when none is configured.
pub const DEFAULT_CACHE_CONTROL: &str = "no-cache, no-store";

/// Overall per-call timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(100);

/// Configuration for an [`HttpClient`](crate::HttpClient).
///
/// Nothing is checked until [`ClientConfig::validate`] runs, which the
/// factory does before building anything.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bound on a whole call, retries and delays included.
    pub timeout: Duration,
    /// Base for resolving relative request paths.
    pub base_address: Option<String>,
    /// `Cache-Control` directive for every request.
    pub cache_control: Option<String>,
    /// Proxy URL for every request.
    pub proxy: Option<String>,
    /// Extra headers for every request.
    pub default_headers: Vec<(String, String)>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            base_address: None,
            cache_control: None,
            proxy: None,
            default_headers: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the overall timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the base address.
    pub fn base_address(mut self, base: impl Into<String>) -> Self {
        self.base_address = Some(base.into());
        self
    }

    /// Set the `Cache-Control` directive.
    pub fn cache_control(mut self, directive: impl Into<String>) -> Self {
        self.cache_control = Some(directive.into());
        self
    }

    /// Route requests through a proxy.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Add a header sent with every request.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Check every setting without building anything.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.timeout.is_zero() {
            return Err(ConfigurationError::InvalidTimeout(self.timeout));
        }
        self.base_url()?;
        self.header_map()?;
        self.reqwest_proxy()?;
        Ok(())
    }

    /// Parsed base address.
    ///
    /// A trailing `/` is added so relative paths resolve beneath the base
    /// path instead of replacing its last segment.
    pub fn base_url(&self) -> Result<Option<Url>, ConfigurationError> {
        let Some(raw) = self.base_address.as_deref() else {
            return Ok(None);
        };

        let mut url = Url::parse(raw)
            .map_err(|e| ConfigurationError::InvalidBaseAddress(format!("{}: {}", raw, e)))?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigurationError::InvalidBaseAddress(format!(
                "{}: not an http(s) base",
                raw
            )));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Some(url))
    }

    /// Headers added to every request: SDK version, cache control and the
    /// configured defaults.
    pub fn header_map(&self) -> Result<HeaderMap, ConfigurationError> {
        let mut headers = HeaderMap::new();
        headers.insert(SDK_VERSION_HEADER, HeaderValue::from_static(SDK_VERSION));

        let cache_control = self
            .cache_control
            .as_deref()
            .unwrap_or(DEFAULT_CACHE_CONTROL);
        headers.insert(CACHE_CONTROL, header_value("cache-control", cache_control)?);

        for (name, value) in &self.default_headers {
            let header_name =
                HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                    ConfigurationError::InvalidHeader {
                        name: name.clone(),
                        reason: e.to_string(),
                    }
                })?;
            headers.append(header_name, header_value(name, value)?);
        }
        Ok(headers)
    }

    pub(crate) fn reqwest_proxy(&self) -> Result<Option<reqwest::Proxy>, ConfigurationError> {
        self.proxy
            .as_deref()
            .map(|p| {
                reqwest::Proxy::all(p)
                    .map_err(|e| ConfigurationError::InvalidProxy(format!("{}: {}", p, e)))
            })
            .transpose()
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigurationError> {
    HeaderValue::from_str(value).map_err(|e| ConfigurationError::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })
}
