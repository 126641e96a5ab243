#![deny(missing_docs)]

//! # Parameter Resolution
//!
//! Resolves parameter objects (inline or `$ref`) into [`ParameterNode`]s.

use crate::error::{AppError, AppResult};
use crate::oas::context::ResolutionContext;
use crate::oas::models::{ParameterNode, SchemaProperty};
use crate::oas::naming::extract_safety_key;
use crate::oas::schemas::{reference_of, SchemaResolver};
use crate::oas::shims::{from_fragment, ShimParameter};
use serde_json::Value;

/// Resolves a parameter fragment.
///
/// A `$ref` parameter takes the component name as id; inline ones have an
/// empty id. The identifier honors a `__safety_key__(...)` override from the
/// schema description first, then from the parameter description.
pub fn resolve_parameter(
    schemas: &SchemaResolver<'_>,
    ctx: &mut ResolutionContext,
    fragment: &Value,
) -> AppResult<ParameterNode> {
    if let Some(reference) = reference_of(fragment) {
        let target = schemas.refs().resolve(reference)?;
        let mut node = resolve_parameter(schemas, ctx, target.data)?;
        node.id = target.id;
        return Ok(node);
    }

    let shim: ShimParameter = from_fragment(fragment)?;
    let raw_schema = shim.schema.as_ref().ok_or_else(|| AppError::MalformedFragment {
        message: format!("parameter \"{}\" has no \"schema\"", shim.name),
        fragment: fragment.clone(),
    })?;

    let schema = match reference_of(raw_schema) {
        Some(reference) => schemas.resolve_reference(ctx, reference, false)?,
        None => schemas.resolve_anonymous(ctx, raw_schema)?,
    };
    if schema.all_of.len() > 1 {
        return Err(AppError::TooManyAllOfMembers {
            parameter: shim.name.clone(),
            count: schema.all_of.len(),
            fragment: fragment.clone(),
        });
    }

    let safety_key = extract_safety_key(schema.description.as_deref())
        .or_else(|| extract_safety_key(shim.description.as_deref()));
    let naming = SchemaProperty::new(shim.name.as_str(), safety_key, schema);

    Ok(ParameterNode {
        id: String::new(),
        original_key: naming.original_key,
        resolved_key: naming.resolved_key,
        description: shim.description,
        location: shim.location,
        required: shim.required,
        schema: naming.schema,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::models::{ParameterLocation, SchemaKind};
    use crate::oas::references::RefResolver;

    fn load(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    const DOC: &str = r#"
components:
  schemas:
    Limit: {type: integer, format: int32}
    Paging: {type: object, properties: {page: {type: integer}}}
    Sorting: {type: object, properties: {order: {type: string}}}
    Filter:
      allOf:
        - $ref: '#/components/schemas/Paging'
        - $ref: '#/components/schemas/Sorting'
  parameters:
    LimitParam:
      name: limit
      in: query
      schema: {$ref: '#/components/schemas/Limit'}
paths:
  /items:
    get:
      parameters:
        - name: class
          in: query
          required: true
          schema:
            type: string
            description: __safety_key__(klass)
        - name: X-Request-Id
          in: header
          schema: {type: string}
        - name: filter
          in: query
          schema:
            allOf:
              - {type: string}
              - {type: integer}
        - $ref: '#/components/parameters/LimitParam'
        - name: bare
          in: query
        - name: query
          in: query
          schema: {$ref: '#/components/schemas/Filter'}
        - name: plain
          in: query
          description: __safety_key__(unused)
          schema: {type: string}
"#;

    fn param(doc: &Value, index: usize) -> AppResult<ParameterNode> {
        let resolver = SchemaResolver::new(RefResolver::new(doc));
        let mut ctx = ResolutionContext::new();
        resolve_parameter(
            &resolver,
            &mut ctx,
            &doc["paths"]["/items"]["get"]["parameters"][index],
        )
    }

    #[test]
    fn test_safety_key_override() {
        let doc = load(DOC);
        let node = param(&doc, 0).unwrap();
        assert_eq!(node.original_key, "class");
        assert_eq!(node.resolved_key, "klass");
        assert!(node.required);
        assert_eq!(node.location, ParameterLocation::Query);
        assert_eq!(node.id, "");
    }

    #[test]
    fn test_header_name_sanitized() {
        let doc = load(DOC);
        let node = param(&doc, 1).unwrap();
        assert_eq!(node.resolved_key, "X_Request_Id");
        assert!(!node.required);
        assert_eq!(node.location, ParameterLocation::Header);
    }

    #[test]
    fn test_multi_member_all_of_rejected() {
        let doc = load(DOC);
        match param(&doc, 2).unwrap_err() {
            AppError::TooManyAllOfMembers {
                parameter, count, ..
            } => {
                assert_eq!(parameter, "filter");
                assert_eq!(count, 2);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_reference_parameter() {
        let doc = load(DOC);
        let node = param(&doc, 3).unwrap();
        assert_eq!(node.id, "LimitParam");
        assert_eq!(node.original_key, "limit");
        assert_eq!(node.schema.id, "Limit");
        assert_eq!(node.schema.kind, SchemaKind::Integer);
    }

    #[test]
    fn test_missing_schema_is_malformed() {
        let doc = load(DOC);
        assert!(matches!(
            param(&doc, 4).unwrap_err(),
            AppError::MalformedFragment { .. }
        ));
    }

    #[test]
    fn test_referenced_multi_member_all_of_rejected() {
        let doc = load(DOC);
        match param(&doc, 5).unwrap_err() {
            AppError::TooManyAllOfMembers {
                parameter, count, ..
            } => {
                assert_eq!(parameter, "query");
                assert_eq!(count, 2);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_parameter_description_safety_key() {
        let doc = load(DOC);
        let node = param(&doc, 6).unwrap();
        assert_eq!(node.original_key, "plain");
        assert_eq!(node.resolved_key, "unused");
    }
}
