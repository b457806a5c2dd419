//! Inbound responses.

use super::request::Request;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

/// A response together with the request that produced it.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    request: Request,
}

impl Response {
    /// Create a response for `request`.
    pub fn new(status: StatusCode, request: Request) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            request,
        }
    }

    /// Assemble a response from its parts.
    pub fn from_parts(status: StatusCode, headers: HeaderMap, body: Bytes, request: Request) -> Self {
        Self {
            status,
            headers,
            body,
            request,
        }
    }

    /// Replace the headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Replace the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to the response headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Response body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The request that produced this response.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Mutable access to the originating request.
    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    /// Drop the response and keep the request.
    pub fn into_request(self) -> Request {
        self.request
    }

    /// Split into status, headers, body and request.
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes, Request) {
        (self.status, self.headers, self.body, self.request)
    }
}
