//! Replayable copies of outbound requests.

use crate::message::{Body, Request};
use tracing::trace;

/// Produce a copy of `original` that can be sent on its own.
///
/// Method, URL and headers are copied as-is. Header values are already
/// validated `HeaderValue`s and are not parsed again, so values shaped by a
/// server survive untouched. Properties are copied entry by entry; each value
/// is shared with the original.
///
/// A buffered body is shared by reference. A streamed body cannot be
/// duplicated, so the copy carries [`Body::Consumed`] and reports itself as
/// not replayable.
pub fn clone_request(original: &Request) -> Request {
    let mut copy = Request::new(original.method().clone(), original.url().clone());

    *copy.headers_mut() = original.headers().clone();

    for (key, value) in original.properties().iter() {
        copy.properties_mut().insert_shared(key.clone(), value.clone());
    }

    *copy.body_mut() = original.body().replay();

    if matches!(copy.body(), Body::Consumed) {
        trace!(url = %original.url(), "Cloned request without its streamed body");
    }

    copy
}
