//! Outbound requests.

use super::body::Body;
use super::properties::Properties;
use crate::error::{PipelineError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, Url};

/// An outbound HTTP request as seen by pipeline stages.
#[derive(Debug)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Body,
    properties: Properties,
}

impl Request {
    /// Create a request with no headers and no body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: Body::Empty,
            properties: Properties::new(),
        }
    }

    /// Parse `url` and create a request.
    pub fn parse(method: Method, url: &str) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| PipelineError::invalid_request(format!("{}: {}", url, e)))?;
        Ok(Self::new(method, url))
    }

    /// Create a GET request.
    pub fn get(url: &str) -> Result<Self> {
        Self::parse(Method::GET, url)
    }

    /// Create a POST request.
    pub fn post(url: &str) -> Result<Self> {
        Self::parse(Method::POST, url)
    }

    /// Append a header value. Existing values for the same name are kept.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Set the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Store a property.
    #[must_use]
    pub fn with_property<T>(mut self, key: impl Into<String>, value: T) -> Self
    where
        T: std::any::Any + Send + Sync,
    {
        self.properties.insert(key, value);
        self
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Mutable access to the method.
    pub fn method_mut(&mut self) -> &mut Method {
        &mut self.method
    }

    /// The target URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Mutable access to the target URL.
    pub fn url_mut(&mut self) -> &mut Url {
        &mut self.url
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// The body.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Mutable access to the body.
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Move the body out for sending. See [`Body::take`].
    pub fn take_body(&mut self) -> Body {
        self.body.take()
    }

    /// Property bag.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Mutable access to the property bag.
    pub fn properties_mut(&mut self) -> &mut Properties {
        &mut self.properties
    }

    /// Whether the request could be sent again unchanged.
    pub fn is_replayable(&self) -> bool {
        self.body.is_replayable()
    }
}
