#![deny(missing_docs)]

//! # Operation Builder
//!
//! Turns an operation fragment into an [`OperationNode`].

use crate::error::AppResult;
use crate::oas::context::ResolutionContext;
use crate::oas::models::{HttpMethod, OperationNode, ParameterNode};
use crate::oas::naming::{derive_handler_name, operation_fn_name};
use crate::oas::resolver::{resolve_parameter, resolve_request_body, resolve_response};
use crate::oas::schemas::SchemaResolver;
use crate::oas::shims::{from_fragment, ShimOperation};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

/// Resolves one operation of a path item.
///
/// `shared` are the already resolved path-level parameters; an operation
/// parameter with the same name and location replaces the shared one.
pub fn resolve_operation(
    schemas: &SchemaResolver<'_>,
    ctx: &mut ResolutionContext,
    path: &str,
    method: HttpMethod,
    fragment: &Value,
    shared: &[ParameterNode],
) -> AppResult<OperationNode> {
    let op: ShimOperation = from_fragment(fragment)?;
    let fn_name = match &op.operation_id {
        Some(id) => operation_fn_name(id),
        None => derive_handler_name(method.as_str(), path),
    };
    debug!(%method, path, fn_name = %fn_name, "resolving operation");

    let mut own = Vec::with_capacity(op.parameters.len());
    for raw in &op.parameters {
        own.push(resolve_parameter(schemas, ctx, raw)?);
    }
    let parameters = merge_parameters(shared, own);

    let request_body = match &op.request_body {
        Some(raw) => Some(resolve_request_body(schemas, ctx, raw)?),
        None => None,
    };

    let owner = op.operation_id.as_deref().unwrap_or(&fn_name).to_string();
    let mut responses = IndexMap::new();
    for (status, raw) in &op.responses {
        if status == "default" {
            warn!(operation = %owner, "\"default\" responses are not supported, skipping");
            continue;
        }
        let response = resolve_response(schemas, ctx, &owner, status, raw)?;
        responses.insert(status.clone(), response);
    }

    Ok(OperationNode {
        method,
        path: path.to_string(),
        operation_id: op.operation_id,
        fn_name,
        summary: op.summary,
        description: op.description,
        deprecated: op.deprecated,
        tags: op.tags,
        parameters,
        request_body,
        responses,
    })
}

/// Path-level parameters first, each replaced in place by an operation
/// parameter sharing its name and location; remaining operation parameters follow.
fn merge_parameters(shared: &[ParameterNode], own: Vec<ParameterNode>) -> Vec<ParameterNode> {
    let mut merged: Vec<ParameterNode> = shared.to_vec();
    for param in own {
        match merged.iter_mut().find(|p| {
            p.original_key == param.original_key && p.location == param.location
        }) {
            Some(existing) => *existing = param,
            None => merged.push(param),
        }
    }
    merged
}
