#![deny(missing_docs)]

//! # Resolution Context
//!
//! Per-run mutable state threaded through every resolver call: the inline
//! registry, the active resolution path used to break cycles, the memo of
//! finalized named schemas, and the discovered discriminator base classes.
//!
//! A context is created per document and discarded afterwards, so independent
//! runs never share state.

use crate::oas::inline::InlineTypeRegistry;
use crate::oas::models::{DiscriminatorBaseClass, SchemaRef};
use indexmap::{IndexMap, IndexSet};
use tracing::trace;

/// Mutable state of one resolution run.
#[derive(Debug, Default)]
pub struct ResolutionContext {
    /// Synthesized schemas discovered so far.
    pub inline: InlineTypeRegistry,
    resolving: IndexSet<String>,
    finalized: IndexMap<String, SchemaRef>,
    discriminator_base_classes: Vec<DiscriminatorBaseClass>,
}

impl ResolutionContext {
    /// Creates a fresh context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a named schema is on the active resolution path.
    pub fn is_resolving(&self, id: &str) -> bool {
        self.resolving.contains(id)
    }

    /// Pushes a named schema onto the active path.
    pub fn enter(&mut self, id: &str) {
        trace!(schema = id, depth = self.resolving.len(), "resolving schema");
        self.resolving.insert(id.to_string());
    }

    /// Pops a named schema from the active path.
    pub fn leave(&mut self, id: &str) {
        self.resolving.shift_remove(id);
    }

    /// The memoized node for a named schema.
    pub fn finalized(&self, id: &str) -> Option<SchemaRef> {
        self.finalized.get(id).cloned()
    }

    /// Memoizes a fully resolved named schema.
    pub fn finalize(&mut self, id: &str, node: SchemaRef) {
        self.finalized.insert(id.to_string(), node);
    }

    /// Registers a synthesized schema.
    pub fn register_inline(&mut self, id: &str, node: SchemaRef) {
        self.inline.register(id, node);
    }

    /// Records a `__discriminator__` base class, once.
    pub fn add_discriminator_base(&mut self, base: DiscriminatorBaseClass) {
        if !self.discriminator_base_classes.contains(&base) {
            self.discriminator_base_classes.push(base);
        }
    }

    /// Base classes in discovery order.
    pub fn discriminator_base_classes(&self) -> &[DiscriminatorBaseClass] {
        &self.discriminator_base_classes
    }
}
