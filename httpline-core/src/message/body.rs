//! Request bodies.

use crate::error::BoxError;
use bytes::Bytes;
use futures::{Stream, TryStreamExt};
use std::fmt;
use std::pin::Pin;

/// A forward-only stream of body chunks.
pub type BodyStream =
    Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send + Sync + 'static>>;

/// Payload of an outbound request.
///
/// Only [`Body::Empty`] and [`Body::Buffered`] can be sent more than once.
/// A [`Body::Stream`] is handed to the transport on the first send and the
/// request is left holding [`Body::Consumed`].
#[derive(Default)]
pub enum Body {
    /// No payload.
    #[default]
    Empty,
    /// Fully buffered payload. Cloning is a reference count bump.
    Buffered(Bytes),
    /// Forward-only stream that has not been sent yet.
    Stream(BodyStream),
    /// A stream that has already been handed to a transport.
    Consumed,
}

impl Body {
    /// Create a buffered body.
    pub fn buffered(bytes: impl Into<Bytes>) -> Self {
        Self::Buffered(bytes.into())
    }

    /// Wrap a stream of chunks as a forward-only body.
    pub fn from_stream<S, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        Self::Stream(Box::pin(stream.map_err(|e| -> BoxError { e.into() })))
    }

    /// Whether the body can be sent again unchanged.
    pub fn is_replayable(&self) -> bool {
        matches!(self, Self::Empty | Self::Buffered(_))
    }

    /// Whether there is no payload at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Buffered(bytes) => bytes.is_empty(),
            Self::Stream(_) | Self::Consumed => false,
        }
    }

    /// Buffered content, if any.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Buffered(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Copy this body for a resend.
    ///
    /// Streams cannot be duplicated, so both `Stream` and `Consumed` produce
    /// `Consumed`.
    pub fn replay(&self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Buffered(bytes) => Self::Buffered(bytes.clone()),
            Self::Stream(_) | Self::Consumed => Self::Consumed,
        }
    }

    /// Take the body out, leaving the replayable remainder behind.
    ///
    /// Buffered content stays in place; a stream is moved out and replaced
    /// with `Consumed`.
    pub fn take(&mut self) -> Self {
        match self {
            Self::Stream(_) => std::mem::replace(self, Self::Consumed),
            other => other.replay(),
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Buffered(bytes) => f.debug_tuple("Buffered").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::Consumed => f.write_str("Consumed"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::Buffered(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Buffered(bytes.into())
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::Buffered(text.into())
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Self::Buffered(Bytes::from_static(text.as_bytes()))
    }
}
