#![deny(missing_docs)]

//! # Reference Resolution
//!
//! Dereferences `$ref` pointers against the loaded document.
//!
//! The document is immutable for the whole run, so resolution needs no cache:
//! resolving the same pointer twice walks to the same value.

use crate::error::{AppError, AppResult};
use crate::oas::ref_utils::{decode_pointer_segment, normalize_ref_to_local, split_reference};
use serde_json::Value;

/// The target of a `$ref`.
#[derive(Debug, Clone)]
pub struct ResolvedRef<'a> {
    /// The referenced fragment.
    pub data: &'a Value,
    /// The decoded final pointer segment, used as the default name.
    pub id: String,
}

/// Walks `$ref` pointers through a decoded document.
#[derive(Debug, Clone, Copy)]
pub struct RefResolver<'a> {
    document: &'a Value,
    self_uri: Option<&'a str>,
}

impl<'a> RefResolver<'a> {
    /// Creates a resolver over a decoded document, honoring its `$self` URI.
    pub fn new(document: &'a Value) -> Self {
        Self {
            document,
            self_uri: document.get("$self").and_then(Value::as_str),
        }
    }

    /// The document being resolved against.
    pub fn document(&self) -> &'a Value {
        self.document
    }

    /// Resolves a reference such as `#/components/schemas/Pet`.
    ///
    /// Object segments are looked up by key and array segments by index.
    /// Fails with [`AppError::UnresolvableReference`] naming the first segment
    /// that does not exist.
    pub fn resolve(&self, reference: &str) -> AppResult<ResolvedRef<'a>> {
        let local = normalize_ref_to_local(reference, self.self_uri).ok_or_else(|| {
            AppError::UnresolvableReference {
                reference: reference.to_string(),
                segment: split_reference(reference).0.to_string(),
            }
        })?;

        let pointer = local.trim_start_matches('#').trim_start_matches('/');
        let mut target = self.document;
        let mut id = String::new();
        if pointer.is_empty() {
            return Ok(ResolvedRef { data: target, id });
        }

        for raw in pointer.split('/') {
            let segment = decode_pointer_segment(raw);
            let next = match target {
                Value::Object(map) => map.get(&segment),
                Value::Array(list) => segment.parse::<usize>().ok().and_then(|i| list.get(i)),
                _ => None,
            };
            target = next.ok_or_else(|| AppError::UnresolvableReference {
                reference: reference.to_string(),
                segment: segment.clone(),
            })?;
            id = segment;
        }

        Ok(ResolvedRef { data: target, id })
    }
}
