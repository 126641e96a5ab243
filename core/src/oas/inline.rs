#![deny(missing_docs)]

//! # Inline Type Registry
//!
//! Collects anonymously defined nested schemas discovered mid-traversal under
//! their synthesized ids, so they can be emitted as named types.

use crate::oas::models::SchemaRef;
use indexmap::IndexMap;
use tracing::trace;

/// Catalogue of synthesized schemas. The last registration of an id wins.
#[derive(Debug, Default, Clone)]
pub struct InlineTypeRegistry {
    schemas: IndexMap<String, SchemaRef>,
}

impl InlineTypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a schema under its synthesized id.
    pub fn register(&mut self, id: impl Into<String>, node: SchemaRef) {
        let id = id.into();
        trace!(schema = %id, "registering inline schema");
        self.schemas.insert(id, node);
    }

    /// Registers every entry of `mapping`, in its order.
    pub fn merge(&mut self, mapping: IndexMap<String, SchemaRef>) {
        self.schemas.extend(mapping);
    }

    /// A copy of the current catalogue, in registration order.
    pub fn snapshot(&self) -> IndexMap<String, SchemaRef> {
        self.schemas.clone()
    }

    /// Looks up a registered schema.
    pub fn get(&self, id: &str) -> Option<&SchemaRef> {
        self.schemas.get(id)
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::models::{SchemaKind, SchemaNode};
    use std::rc::Rc;

    #[test]
    fn test_last_write_wins_and_keeps_position() {
        let mut registry = InlineTypeRegistry::new();
        registry.register("data_obj", Rc::new(SchemaNode::new("data_obj", SchemaKind::Object)));
        registry.register("tags_list", Rc::new(SchemaNode::new("tags_list", SchemaKind::Array)));
        registry.register("data_obj", Rc::new(SchemaNode::new("data_obj", SchemaKind::String)));

        let snapshot = registry.snapshot();
        let keys: Vec<_> = snapshot.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["data_obj", "tags_list"]);
        assert_eq!(snapshot["data_obj"].kind, SchemaKind::String);
    }

    #[test]
    fn test_merge() {
        let mut other = IndexMap::new();
        other.insert(
            "getPetResponse200".to_string(),
            Rc::new(SchemaNode::new("getPetResponse200", SchemaKind::Object)),
        );
        let mut registry = InlineTypeRegistry::new();
        registry.merge(other);
        assert_eq!(registry.len(), 1);
        assert!(registry.get("getPetResponse200").is_some());
    }
}
