#![deny(missing_docs)]

//! # Composition
//!
//! `allOf`/`anyOf` members and discriminators.
//!
//! Referenced members resolve as named schemas; inline members are named
//! `<parentId>_item_<index>` and always registered, scalars included. Inline `allOf` members are flattened into the
//! owning node, while named ones stay as its parents.

use crate::error::{AppError, AppResult};
use crate::oas::context::ResolutionContext;
use crate::oas::models::{Discriminator, SchemaKind, SchemaNode, SchemaRef};
use crate::oas::schemas::SchemaResolver;
use crate::oas::shims::ShimDiscriminator;
use indexmap::IndexMap;
use serde_json::Value;
use std::rc::Rc;
use tracing::trace;

impl SchemaResolver<'_> {
    /// Resolves the members of an `allOf`/`anyOf` list.
    pub(crate) fn resolve_members(
        &self,
        ctx: &mut ResolutionContext,
        parent_id: &str,
        keyword: &str,
        members: &[Value],
    ) -> AppResult<Vec<SchemaRef>> {
        if !members.is_empty() {
            trace!(schema = parent_id, keyword, count = members.len(), "resolving members");
        }
        members
            .iter()
            .enumerate()
            .map(|(index, member)| {
                let member_id = if parent_id.is_empty() {
                    String::new()
                } else {
                    format!("{}_item_{}", parent_id, index)
                };
                let node = self.resolve_nested(ctx, &member_id, member)?;
                // Scalar members are catalogued too; other kinds register themselves.
                if node.is_inline && node.kind.is_primitive() {
                    ctx.register_inline(&member_id, node.clone());
                }
                Ok(node)
            })
            .collect()
    }

    /// Resolves a discriminator; both `propertyName` and a non-empty `mapping` are required.
    pub(crate) fn resolve_discriminator(
        &self,
        ctx: &mut ResolutionContext,
        discriminator: &ShimDiscriminator,
        owner: &Value,
    ) -> AppResult<Discriminator> {
        let (property_name, mapping) = validate_discriminator(discriminator, owner)?;
        let mut resolved = IndexMap::new();
        for (tag, reference) in mapping {
            let target = self.resolve_reference(ctx, reference, true)?;
            resolved.insert(tag.clone(), target);
        }
        Ok(Discriminator {
            property_name,
            mapping: resolved,
        })
    }

    /// A discriminator whose targets are placeholders, for cycle-breaking stubs.
    pub(crate) fn stub_discriminator(
        &self,
        discriminator: &ShimDiscriminator,
        owner: &Value,
    ) -> AppResult<Discriminator> {
        let (property_name, mapping) = validate_discriminator(discriminator, owner)?;
        let mut stubs = IndexMap::new();
        for (tag, reference) in mapping {
            let target = self.refs().resolve(reference)?;
            let mut stub = SchemaNode::new(target.id, SchemaKind::Object);
            stub.is_placeholder = true;
            stubs.insert(tag.clone(), Rc::new(stub));
        }
        Ok(Discriminator {
            property_name,
            mapping: stubs,
        })
    }
}

fn validate_discriminator<'d>(
    discriminator: &'d ShimDiscriminator,
    owner: &Value,
) -> AppResult<(String, &'d IndexMap<String, String>)> {
    let property_name = discriminator
        .property_name
        .clone()
        .ok_or_else(|| AppError::InvalidDiscriminator {
            message: "missing \"propertyName\"".into(),
            fragment: owner.clone(),
        })?;
    let mapping = discriminator
        .mapping
        .as_ref()
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::InvalidDiscriminator {
            message: format!("\"mapping\" is required for discriminator \"{}\"", property_name),
            fragment: owner.clone(),
        })?;
    Ok((property_name, mapping))
}

/// Appends the properties and required keys of inline `allOf` members.
///
/// Keys already present on the node win.
pub(crate) fn merge_inline_members(node: &mut SchemaNode) {
    let inline: Vec<SchemaRef> = node.inline_all_of().into_iter().cloned().collect();
    for member in inline {
        for property in &member.properties {
            if !node
                .properties
                .iter()
                .any(|p| p.original_key == property.original_key)
            {
                node.properties.push(property.clone());
            }
        }
        for key in &member.required {
            if !node.required.contains(key) {
                node.required.push(key.clone());
            }
        }
    }
}
