#![deny(missing_docs)]

//! # Endpoint Resolvers
//!
//! Resolution of the pieces of an operation that carry schemas.
//!
//! - **params**: Parameter objects.
//! - **body**: Request bodies (JSON, form-encoded, multipart).
//! - **responses**: Responses per status pattern.

pub mod body;
pub mod params;
pub mod responses;

pub use body::resolve_request_body;
pub use params::resolve_parameter;
pub use responses::resolve_response;
