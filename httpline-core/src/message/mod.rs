//! Request and response types that travel through a pipeline.
//!
//! - [`Request`]: method, URL, headers, [`Body`] and [`Properties`]
//! - [`Response`]: status, headers, buffered body and the originating request

mod body;
mod properties;
mod request;
mod response;

pub use body::{Body, BodyStream};
pub use properties::{Properties, PropertyValue};
pub use request::Request;
pub use response::Response;
