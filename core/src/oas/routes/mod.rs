#![deny(missing_docs)]

//! # Routes Module
//!
//! Entry point for resolving OpenAPI `paths`.
//! Scans each path item for the known HTTP methods and delegates to the
//! operation builder.

pub mod builder;

use crate::error::AppResult;
use crate::oas::context::ResolutionContext;
use crate::oas::models::{HttpMethod, PathNode};
use crate::oas::resolver::resolve_parameter;
use crate::oas::routes::builder::resolve_operation;
use crate::oas::schemas::SchemaResolver;
use crate::oas::shims::{from_fragment, ShimPathItem};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;

/// Resolves one path item.
///
/// Methods are visited in [`HttpMethod::ALL`] order; methods the client does
/// not support are logged and skipped.
pub fn resolve_path(
    schemas: &SchemaResolver<'_>,
    ctx: &mut ResolutionContext,
    path: &str,
    fragment: &Value,
) -> AppResult<PathNode> {
    let item: ShimPathItem = from_fragment(fragment)?;
    let mut shared = Vec::with_capacity(item.parameters.len());
    for raw in &item.parameters {
        shared.push(resolve_parameter(schemas, ctx, raw)?);
    }

    let mut operations = IndexMap::new();
    for method in HttpMethod::ALL {
        let Some(raw) = fragment.get(method.as_str()) else {
            continue;
        };
        if !method.is_supported() {
            warn!(%method, path, "HTTP method is not supported, skipping");
            continue;
        }
        let operation = resolve_operation(schemas, ctx, path, method, raw, &shared)?;
        operations.insert(method, operation);
    }

    Ok(PathNode {
        path_template: path.to_string(),
        summary: item.summary,
        description: item.description,
        operations,
    })
}

/// Resolves every path of the document, in declaration order.
pub fn resolve_paths(
    schemas: &SchemaResolver<'_>,
    ctx: &mut ResolutionContext,
    paths: &IndexMap<String, Value>,
) -> AppResult<IndexMap<String, PathNode>> {
    let mut resolved = IndexMap::with_capacity(paths.len());
    for (path, fragment) in paths {
        resolved.insert(path.clone(), resolve_path(schemas, ctx, path, fragment)?);
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::references::RefResolver;

    #[test]
    fn test_method_order_and_skipped_methods() {
        let doc: Value = serde_yaml::from_str(
            r#"
paths:
  /pets:
    summary: Pets
    post:
      operationId: createPet
      responses: {'201': {description: created}}
    head:
      responses: {'200': {description: ok}}
    get:
      operationId: listPets
      responses: {'200': {description: ok}}
    patch:
      operationId: patchPets
      responses: {'200': {description: ok}}
"#,
        )
        .unwrap();
        let schemas = SchemaResolver::new(RefResolver::new(&doc));
        let mut ctx = ResolutionContext::new();
        let node = resolve_path(&schemas, &mut ctx, "/pets", &doc["paths"]["/pets"]).unwrap();

        let methods: Vec<_> = node.operations.keys().map(HttpMethod::as_str).collect();
        assert_eq!(methods, vec!["get", "post", "patch"]);
        assert_eq!(node.summary.as_deref(), Some("Pets"));
    }
}
