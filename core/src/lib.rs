#![deny(missing_docs)]

//! # Clientgen Core
//!
//! Core library of the OpenAPI client compiler: resolves a decoded document
//! into a cycle-safe, dependency-ordered model and projects it onto
//! target-language type expressions.

/// Shared error types.
pub mod error;

/// OpenAPI (OAS) resolution.
pub mod oas;

/// Type projection (schema -> target language).
pub mod type_mapping;

pub use error::{AppError, AppResult};
pub use oas::{build_document, parse_openapi_document, DocumentModel};
pub use type_mapping::{PythonProjector, TypeProjector, EMPTY_BODY};
