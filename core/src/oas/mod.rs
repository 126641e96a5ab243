#![deny(missing_docs)]

//! # OpenAPI Resolution Module
//!
//! - **models**: Intermediate Representation definitions.
//! - **shims**: Typed views over raw document fragments.
//! - **references**: `$ref` dereferencing.
//! - **schemas**: Schema resolution (cycles, composition, inline naming).
//! - **resolver**: Parameters, request bodies and responses.
//! - **routes**: Paths and operations.
//! - **document**: The whole-document model and its emission order.

pub mod context;
pub mod document;
pub mod inline;
pub mod models;
pub mod naming;
pub mod references;
pub mod resolver;
pub mod routes;
pub mod schemas;
pub mod shims;

mod ref_utils;

pub use context::ResolutionContext;
pub use document::{build_document, parse_openapi_document, DocumentModel};
pub use inline::InlineTypeRegistry;
pub use models::{
    Discriminator, DiscriminatorBaseClass, DocumentInfo, HttpMethod, NumericBound,
    OperationNode, ParameterLocation, ParameterNode, PathNode, RequestBodyNode, ResponseNode,
    SchemaFormat, SchemaItems, SchemaKind, SchemaNode, SchemaProperty, SchemaRef,
};
pub use references::{RefResolver, ResolvedRef};
pub use schemas::SchemaResolver;
