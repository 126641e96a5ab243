#![deny(missing_docs)]

//! # Schema Resolution
//!
//! Turns raw schema fragments into [`SchemaNode`]s.
//!
//! - **composition**: `allOf`/`anyOf` members and discriminators.
//! - **structs**: properties, array items, numeric bounds and body fallbacks.
//!
//! Schemas are resolved under one of three origins:
//! - *named*: declared under `components.schemas` or reached through `$ref`.
//!   Memoized by id and guarded against cycles by the active resolution path.
//! - *inline*: anonymous nested objects/arrays given a synthesized id and
//!   registered in the [`InlineTypeRegistry`](crate::oas::inline::InlineTypeRegistry).
//! - *anonymous*: leaves with an empty id, never registered.

pub mod composition;
pub mod structs;

pub use structs::with_body_fallback;

use crate::error::{AppError, AppResult};
use crate::oas::context::ResolutionContext;
use crate::oas::models::{SchemaFormat, SchemaItems, SchemaKind, SchemaNode, SchemaRef};
use crate::oas::naming::extract_discriminator_base_class;
use crate::oas::references::{RefResolver, ResolvedRef};
use crate::oas::shims::{from_fragment, ShimSchema};
use serde_json::Value;
use std::rc::Rc;
use tracing::debug;

/// How a fragment came to be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Origin {
    Named,
    Inline,
    Anonymous,
}

/// Returns the `$ref` of a fragment, if it is a reference.
pub(crate) fn reference_of(fragment: &Value) -> Option<&str> {
    fragment.get("$ref").and_then(Value::as_str)
}

/// Resolves schema fragments of one document.
#[derive(Debug, Clone, Copy)]
pub struct SchemaResolver<'a> {
    refs: RefResolver<'a>,
}

impl<'a> SchemaResolver<'a> {
    /// Creates a resolver over the document behind `refs`.
    pub fn new(refs: RefResolver<'a>) -> Self {
        Self { refs }
    }

    /// The reference resolver in use.
    pub fn refs(&self) -> RefResolver<'a> {
        self.refs
    }

    /// Resolves a named schema.
    ///
    /// Returns the memoized node when `id` was already finalized. When `id`
    /// is on the active resolution path the result is a placeholder, which
    /// is what terminates self- and mutually-referential graphs.
    /// `from_depth` marks requests made while resolving another schema.
    pub fn resolve_schema(
        &self,
        ctx: &mut ResolutionContext,
        id: &str,
        fragment: &Value,
        from_depth: bool,
    ) -> AppResult<SchemaRef> {
        self.resolve_node(ctx, id, fragment, from_depth, Origin::Named)
    }

    /// Resolves a `$ref` and names the result after its final pointer segment.
    ///
    /// Chains of references are followed to the first non-reference target.
    pub fn resolve_reference(
        &self,
        ctx: &mut ResolutionContext,
        reference: &str,
        from_depth: bool,
    ) -> AppResult<SchemaRef> {
        let target = self.follow(reference)?;
        self.resolve_node(ctx, &target.id, target.data, from_depth, Origin::Named)
    }

    /// Follows a chain of references to the first non-reference target.
    fn follow(&self, reference: &str) -> AppResult<ResolvedRef<'a>> {
        let mut target = self.refs.resolve(reference)?;
        let mut chain = vec![reference.to_string()];
        while let Some(next) = reference_of(target.data) {
            if chain.iter().any(|seen| seen == next) {
                return Err(AppError::MalformedFragment {
                    message: format!("circular reference chain through \"{}\"", next),
                    fragment: target.data.clone(),
                });
            }
            chain.push(next.to_string());
            target = self.refs.resolve(next)?;
        }
        Ok(target)
    }

    /// Resolves an anonymous nested schema under a synthesized id and registers it.
    ///
    /// Scalars keep the id but are not registered, since they never become
    /// types of their own.
    pub fn resolve_inline(
        &self,
        ctx: &mut ResolutionContext,
        id: &str,
        fragment: &Value,
    ) -> AppResult<SchemaRef> {
        self.resolve_node(ctx, id, fragment, false, Origin::Inline)
    }

    /// Resolves a leaf with an empty id.
    pub fn resolve_anonymous(
        &self,
        ctx: &mut ResolutionContext,
        fragment: &Value,
    ) -> AppResult<SchemaRef> {
        self.resolve_node(ctx, "", fragment, false, Origin::Anonymous)
    }

    /// Resolves either a `$ref` (as a named schema) or an inline fragment
    /// under `inline_id`; an empty `inline_id` means anonymous.
    pub(crate) fn resolve_nested(
        &self,
        ctx: &mut ResolutionContext,
        inline_id: &str,
        fragment: &Value,
    ) -> AppResult<SchemaRef> {
        if let Some(reference) = reference_of(fragment) {
            return self.resolve_reference(ctx, reference, true);
        }
        if inline_id.is_empty() {
            self.resolve_anonymous(ctx, fragment)
        } else {
            self.resolve_inline(ctx, inline_id, fragment)
        }
    }

    fn resolve_node(
        &self,
        ctx: &mut ResolutionContext,
        id: &str,
        fragment: &Value,
        from_depth: bool,
        origin: Origin,
    ) -> AppResult<SchemaRef> {
        let named = origin == Origin::Named && !id.is_empty();
        if named {
            if let Some(done) = ctx.finalized(id) {
                return Ok(done);
            }
        }

        let shim: ShimSchema = from_fragment(fragment)?;
        if let Some(reference) = shim.reference.as_deref() {
            return self.resolve_reference(ctx, reference, from_depth);
        }
        let kind = schema_kind(&shim, fragment)?;

        if named && ctx.is_resolving(id) {
            if !from_depth {
                debug!(schema = id, "top-level request for a schema already in progress");
            }
            debug!(schema = id, "breaking reference cycle with a placeholder");
            return self.placeholder(id, &shim, fragment, kind).map(Rc::new);
        }

        if named {
            ctx.enter(id);
        }
        let built = self.build(ctx, id, fragment, &shim, kind, origin == Origin::Inline);
        if named {
            ctx.leave(id);
        }
        let node = Rc::new(built?);

        match origin {
            Origin::Named if named => ctx.finalize(id, node.clone()),
            Origin::Inline if !kind.is_primitive() => ctx.register_inline(id, node.clone()),
            _ => {}
        }
        Ok(node)
    }

    fn build(
        &self,
        ctx: &mut ResolutionContext,
        id: &str,
        fragment: &Value,
        shim: &ShimSchema,
        kind: SchemaKind,
        is_inline: bool,
    ) -> AppResult<SchemaNode> {
        let mut node = self.header(id, shim, fragment, kind)?;
        node.is_inline = is_inline;
        if let Some(base) = extract_discriminator_base_class(shim.description.as_deref()) {
            ctx.add_discriminator_base(base);
        }
        structs::apply_bounds(&mut node, shim);

        if node.enum_values.is_some() {
            return Ok(node);
        }

        node.all_of = self.resolve_members(ctx, id, "allOf", shim.all_of())?;
        node.any_of = self.resolve_members(ctx, id, "anyOf", shim.any_of())?;
        if let Some(discriminator) = &shim.discriminator {
            node.discriminator =
                Some(self.resolve_discriminator(ctx, discriminator, fragment)?);
        }
        node.properties = self.resolve_properties(ctx, shim)?;
        node.required = shim.required.clone();
        composition::merge_inline_members(&mut node);
        node.items = self.resolve_items(ctx, id, shim)?;
        Ok(node)
    }

    /// The non-recursive part of a node, shared by full nodes and placeholders.
    fn header(
        &self,
        id: &str,
        shim: &ShimSchema,
        fragment: &Value,
        kind: SchemaKind,
    ) -> AppResult<SchemaNode> {
        let mut node = SchemaNode::new(id, kind);
        node.title = shim.title.clone();
        node.description = shim.description.clone();
        node.format = match shim.format.as_deref() {
            Some(value) => Some(SchemaFormat::parse(value).ok_or_else(|| {
                AppError::UnknownFormat {
                    value: value.to_string(),
                    fragment: fragment.clone(),
                }
            })?),
            None => None,
        };
        node.enum_values = shim.enum_values.clone();
        Ok(node)
    }

    /// A cycle-breaking stub: same name and shape keywords, no recursion.
    fn placeholder(
        &self,
        id: &str,
        shim: &ShimSchema,
        fragment: &Value,
        kind: SchemaKind,
    ) -> AppResult<SchemaNode> {
        let mut node = self.header(id, shim, fragment, kind)?;
        node.is_placeholder = true;
        node.required = shim.required.clone();
        if node.enum_values.is_some() {
            return Ok(node);
        }
        if let Some(discriminator) = &shim.discriminator {
            node.discriminator = Some(self.stub_discriminator(discriminator, fragment)?);
        }
        node.any_of = shim
            .any_of()
            .iter()
            .enumerate()
            .map(|(index, member)| self.stub(&format!("{}_item_{}", id, index), member))
            .collect::<AppResult<_>>()?;
        if let Some(items) = &shim.items {
            let item_id = format!("{}Item", id);
            let union = reference_of(items).is_none() && items.get("anyOf").is_some();
            node.items = Some(if union {
                let item_shim: ShimSchema = from_fragment(items)?;
                SchemaItems::Union(
                    item_shim
                        .any_of()
                        .iter()
                        .enumerate()
                        .map(|(index, member)| {
                            self.stub(&format!("{}_item_{}", item_id, index), member)
                        })
                        .collect::<AppResult<_>>()?,
                )
            } else {
                SchemaItems::Single(self.stub(&item_id, items)?)
            });
        }
        Ok(node)
    }

    /// One level of a placeholder's members: the header of the target,
    /// without recursing into it.
    fn stub(&self, inline_id: &str, fragment: &Value) -> AppResult<SchemaRef> {
        let (id, data, is_inline) = match reference_of(fragment) {
            Some(reference) => {
                let target = self.follow(reference)?;
                (target.id, target.data, false)
            }
            None => (inline_id.to_string(), fragment, true),
        };
        let shim: ShimSchema = from_fragment(data)?;
        let kind = schema_kind(&shim, data)?;
        let mut node = self.header(&id, &shim, data, kind)?;
        node.is_inline = is_inline;
        node.is_placeholder = !kind.is_primitive();
        Ok(Rc::new(node))
    }
}

/// Decides the kind of a fragment.
///
/// Empty fragments, composites and fragments without `type` are objects.
fn schema_kind(shim: &ShimSchema, fragment: &Value) -> AppResult<SchemaKind> {
    let is_empty = fragment.as_object().map_or(true, |map| map.is_empty());
    if is_empty || shim.all_of.is_some() || shim.any_of.is_some() {
        return Ok(SchemaKind::Object);
    }
    match shim.declared_type() {
        None => Ok(SchemaKind::Object),
        Some(value) => SchemaKind::parse(value).ok_or_else(|| AppError::UnknownType {
            value: value.to_string(),
            fragment: fragment.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn resolve(doc: &Value, name: &str) -> AppResult<(SchemaRef, ResolutionContext)> {
        let resolver = SchemaResolver::new(RefResolver::new(doc));
        let mut ctx = ResolutionContext::new();
        let fragment = &doc["components"]["schemas"][name];
        let node = resolver.resolve_schema(&mut ctx, name, fragment, false)?;
        Ok((node, ctx))
    }

    #[test]
    fn test_object_with_required() {
        let doc = load(
            r#"
components:
  schemas:
    User:
      type: object
      title: A user
      properties:
        id: {type: string}
        data: {type: integer}
      required: [id]
"#,
        );
        let (node, _) = resolve(&doc, "User").unwrap();
        assert_eq!(node.kind, SchemaKind::Object);
        assert_eq!(node.title.as_deref(), Some("A user"));
        assert_eq!(node.properties.len(), 2);
        assert!(node.is_required("id"));
        assert!(!node.is_required("data"));
        assert!(node.is_named());
    }

    #[test]
    fn test_kind_defaults_to_object() {
        let doc = load(
            r#"
components:
  schemas:
    Empty: {}
    Untyped:
      properties:
        a: {type: string}
"#,
        );
        assert_eq!(resolve(&doc, "Empty").unwrap().0.kind, SchemaKind::Object);
        assert_eq!(resolve(&doc, "Untyped").unwrap().0.kind, SchemaKind::Object);
    }

    #[test]
    fn test_unknown_type_and_format() {
        let doc = load(
            r#"
components:
  schemas:
    Upload: {type: file}
    Email: {type: string, format: email}
    Stamp: {type: string, format: datetime}
"#,
        );
        let err = resolve(&doc, "Upload").unwrap_err();
        assert!(matches!(err, AppError::UnknownType { ref value, .. } if value == "file"));
        assert_eq!(err.fragment(), Some(&serde_json::json!({"type": "file"})));

        let err = resolve(&doc, "Email").unwrap_err();
        assert!(matches!(err, AppError::UnknownFormat { ref value, .. } if value == "email"));

        let (stamp, _) = resolve(&doc, "Stamp").unwrap();
        assert_eq!(stamp.format, Some(SchemaFormat::DateTime));
    }

    #[test]
    fn test_self_reference_yields_placeholder() {
        let doc = load(
            r#"
components:
  schemas:
    Tree:
      type: object
      required: [value]
      properties:
        value: {type: string}
        parent:
          $ref: '#/components/schemas/Tree'
"#,
        );
        let (node, ctx) = resolve(&doc, "Tree").unwrap();
        assert!(!node.is_placeholder);
        assert_eq!(node.properties.len(), 2);

        let parent = &node.properties[1].schema;
        assert!(parent.is_placeholder);
        assert_eq!(parent.id, "Tree");
        assert!(parent.properties.is_empty());
        assert_eq!(parent.required, vec!["value".to_string()]);
        assert!(!ctx.is_resolving("Tree"));
    }

    #[test]
    fn test_mutual_reference_terminates() {
        let doc = load(
            r#"
components:
  schemas:
    Author:
      type: object
      properties:
        books:
          type: array
          items: {$ref: '#/components/schemas/Book'}
    Book:
      type: object
      properties:
        author: {$ref: '#/components/schemas/Author'}
"#,
        );
        let (author, ctx) = resolve(&doc, "Author").unwrap();
        let books = &author.properties[0].schema;
        assert_eq!(books.id, "books_list");
        let Some(SchemaItems::Single(book)) = &books.items else {
            panic!("expected single items");
        };
        assert!(!book.is_placeholder);
        assert!(book.properties[0].schema.is_placeholder);
        assert!(ctx.finalized("Book").is_some());
    }

    #[test]
    fn test_sibling_references_share_one_node() {
        let doc = load(
            r#"
components:
  schemas:
    Money: {type: object, properties: {amount: {type: integer}}}
    Order:
      type: object
      properties:
        total: {$ref: '#/components/schemas/Money'}
        tax: {$ref: '#/components/schemas/Money'}
"#,
        );
        let (order, _) = resolve(&doc, "Order").unwrap();
        let total = &order.properties[0].schema;
        let tax = &order.properties[1].schema;
        assert!(!total.is_placeholder);
        assert!(Rc::ptr_eq(total, tax));
    }

    #[test]
    fn test_enum_excludes_composition() {
        let doc = load(
            r#"
components:
  schemas:
    Status:
      type: string
      enum: [active, inactive]
      properties:
        ignored: {type: string}
"#,
        );
        let (node, _) = resolve(&doc, "Status").unwrap();
        assert_eq!(
            node.enum_values,
            Some(vec![serde_json::json!("active"), serde_json::json!("inactive")])
        );
        assert!(node.properties.is_empty());
    }

    #[test]
    fn test_discriminator_base_class_marker() {
        let doc = load(
            r#"
components:
  schemas:
    BasePet:
      type: object
      description: __discriminator__(BasePet.pet_type)
      properties:
        pet_type: {type: string}
"#,
        );
        let (_, ctx) = resolve(&doc, "BasePet").unwrap();
        assert_eq!(ctx.discriminator_base_classes()[0].attr, "pet_type");
    }

    #[test]
    fn test_placeholder_keeps_shallow_items_and_variants() {
        let doc = load(
            r#"
components:
  schemas:
    Trees:
      type: array
      items: {$ref: '#/components/schemas/Tree'}
    Tree:
      type: object
      properties:
        children: {$ref: '#/components/schemas/Trees'}
    Expr:
      anyOf:
        - $ref: '#/components/schemas/Lit'
        - type: object
          properties:
            left: {$ref: '#/components/schemas/Expr'}
    Lit: {type: integer}
"#,
        );
        let (trees, _) = resolve(&doc, "Trees").unwrap();
        let Some(SchemaItems::Single(tree)) = &trees.items else {
            panic!("expected single items");
        };
        let children = &tree.properties[0].schema;
        assert!(children.is_placeholder);
        let Some(SchemaItems::Single(stub)) = &children.items else {
            panic!("expected placeholder items");
        };
        assert_eq!(stub.id, "Tree");
        assert!(stub.is_placeholder);
        assert!(stub.properties.is_empty());

        let (expr, _) = resolve(&doc, "Expr").unwrap();
        let left = &expr.any_of[1].properties[0].schema;
        assert!(left.is_placeholder);
        let ids: Vec<_> = left.any_of.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["Lit", "Expr_item_1"]);
        assert_eq!(left.any_of[0].kind, SchemaKind::Integer);
        assert!(!left.any_of[0].is_placeholder);
        assert!(left.any_of[1].is_inline);
    }
}
