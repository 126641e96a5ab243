#![deny(missing_docs)]

//! # Struct Resolution
//!
//! Properties, array items and numeric bounds of a schema.
//!
//! Nested objects, arrays and compositions declared inline get an id derived
//! from the property key so they can be emitted as types of their own:
//!
//! | property fragment          | id            |
//! |----------------------------|---------------|
//! | object with `properties`   | `key_obj`     |
//! | `allOf`                    | `key_ref_obj` |
//! | `type: array`              | `key_list`    |
//! | `anyOf`                    | `key_obj`     |
//!
//! Everything else is an anonymous leaf.

use crate::error::AppResult;
use crate::oas::context::ResolutionContext;
use crate::oas::models::{
    NumericBound, SchemaFormat, SchemaItems, SchemaKind, SchemaNode, SchemaProperty, SchemaRef,
};
use crate::oas::naming::extract_safety_key;
use crate::oas::schemas::{reference_of, SchemaResolver};
use crate::oas::shims::{from_fragment, ShimExclusive, ShimSchema};
use serde_json::{Number, Value};
use std::rc::Rc;

impl SchemaResolver<'_> {
    /// Resolves declared properties, in declaration order.
    pub(crate) fn resolve_properties(
        &self,
        ctx: &mut ResolutionContext,
        shim: &ShimSchema,
    ) -> AppResult<Vec<SchemaProperty>> {
        let mut properties = Vec::with_capacity(shim.properties.len());
        for (key, fragment) in &shim.properties {
            let schema = self.resolve_property(ctx, key, fragment)?;
            let sibling_description = fragment.get("description").and_then(Value::as_str);
            let safety_key = extract_safety_key(sibling_description)
                .or_else(|| extract_safety_key(schema.description.as_deref()));
            properties.push(SchemaProperty::new(key.as_str(), safety_key, schema));
        }
        Ok(properties)
    }

    fn resolve_property(
        &self,
        ctx: &mut ResolutionContext,
        key: &str,
        fragment: &Value,
    ) -> AppResult<SchemaRef> {
        if let Some(reference) = reference_of(fragment) {
            return self.resolve_reference(ctx, reference, true);
        }
        let prop: ShimSchema = from_fragment(fragment)?;
        let inline_id = if prop.declared_type() == Some("object") && !prop.properties.is_empty() {
            Some(format!("{}_obj", key))
        } else if prop.all_of.is_some() {
            Some(format!("{}_ref_obj", key))
        } else if prop.declared_type() == Some("array") {
            Some(format!("{}_list", key))
        } else if prop.any_of.is_some() {
            Some(format!("{}_obj", key))
        } else {
            None
        };

        match inline_id {
            Some(id) => self.resolve_inline(ctx, &id, fragment),
            None => self.resolve_anonymous(ctx, fragment),
        }
    }

    /// Resolves `items` of an array schema.
    ///
    /// Inline items are named `<parentId>Item`; `anyOf` items become a union of
    /// their variants.
    pub(crate) fn resolve_items(
        &self,
        ctx: &mut ResolutionContext,
        parent_id: &str,
        shim: &ShimSchema,
    ) -> AppResult<Option<SchemaItems>> {
        let Some(items) = shim.items.as_ref() else {
            return Ok(None);
        };
        let item_id = if parent_id.is_empty() {
            String::new()
        } else {
            format!("{}Item", parent_id)
        };

        if reference_of(items).is_none() {
            let item_shim: ShimSchema = from_fragment(items)?;
            if item_shim.any_of.is_some() {
                let variants = self.resolve_members(ctx, &item_id, "anyOf", item_shim.any_of())?;
                return Ok(Some(SchemaItems::Union(variants)));
            }
        }
        self.resolve_nested(ctx, &item_id, items)
            .map(|node| Some(SchemaItems::Single(node)))
    }
}

/// Copies `minimum`/`maximum` onto the node.
///
/// A numeric `exclusiveMinimum`/`exclusiveMaximum` replaces the bound.
pub(crate) fn apply_bounds(node: &mut SchemaNode, shim: &ShimSchema) {
    node.minimum = bound(shim.minimum.as_ref(), shim.exclusive_minimum.as_ref());
    node.maximum = bound(shim.maximum.as_ref(), shim.exclusive_maximum.as_ref());
}

fn bound(value: Option<&Number>, exclusive: Option<&ShimExclusive>) -> Option<NumericBound> {
    match exclusive {
        Some(ShimExclusive::Bound(limit)) => Some(NumericBound {
            value: limit.clone(),
            exclusive: true,
        }),
        Some(ShimExclusive::Flag(flag)) => value.map(|v| NumericBound {
            value: v.clone(),
            exclusive: *flag,
        }),
        None => value.map(|v| NumericBound {
            value: v.clone(),
            exclusive: false,
        }),
    }
}

/// Adds a synthetic field to a bare scalar used as a request/response body.
///
/// Plain strings and integers get a `text` field, binary strings a `content`
/// field, so the emitted body type stays addressable. Any other node is
/// returned unchanged.
pub fn with_body_fallback(node: &SchemaRef) -> SchemaRef {
    if node.enum_values.is_some() || !node.properties.is_empty() {
        return node.clone();
    }
    let field = match (node.kind, node.format) {
        (SchemaKind::String, None) | (SchemaKind::Integer, _) => "text",
        (SchemaKind::String, Some(SchemaFormat::Binary)) => "content",
        _ => return node.clone(),
    };

    let mut leaf = SchemaNode::new("", node.kind);
    leaf.format = node.format;
    let mut view = (**node).clone();
    view.properties
        .push(SchemaProperty::new(field, None, Rc::new(leaf)));
    view.required.push(field.to_string());
    Rc::new(view)
}
