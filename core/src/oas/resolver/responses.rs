#![deny(missing_docs)]

//! # Response Resolution
//!
//! Resolves one entry of an operation's `responses` map.

use crate::error::{AppError, AppResult};
use crate::oas::context::ResolutionContext;
use crate::oas::models::ResponseNode;
use crate::oas::schemas::{reference_of, with_body_fallback, SchemaResolver};
use crate::oas::shims::{from_fragment, ShimResponse};
use serde_json::Value;
use tracing::warn;

/// Resolves a response for `status`.
///
/// `owner` is the operation identifier used to synthesize the id
/// `<owner>Response<status>`, under which an inline body schema is
/// registered. A `$ref` response takes the component name instead.
/// Referenced body schemas get the same scalar fallback as inline ones,
/// on a view that leaves the named node untouched.
pub fn resolve_response(
    schemas: &SchemaResolver<'_>,
    ctx: &mut ResolutionContext,
    owner: &str,
    status: &str,
    fragment: &Value,
) -> AppResult<ResponseNode> {
    let (id, fragment) = match reference_of(fragment) {
        Some(reference) => {
            let target = schemas.refs().resolve(reference)?;
            (target.id, target.data)
        }
        None => (format!("{}Response{}", owner, status), fragment),
    };

    let shim: ShimResponse = from_fragment(fragment)?;
    let mut node = ResponseNode {
        id,
        status_pattern: status.to_string(),
        description: shim.description,
        media_type: None,
        schema: None,
    };

    let Some((media_type, media)) = shim.content.first() else {
        return Ok(node);
    };
    if shim.content.len() > 1 {
        let err = AppError::UnsupportedMediaTypeCount {
            owner: node.id.clone(),
            media_types: shim.content.keys().cloned().collect(),
        };
        warn!("{}", err);
    }
    node.media_type = Some(media_type.clone());

    node.schema = match media.schema.as_ref() {
        None => None,
        Some(raw) => match reference_of(raw) {
            Some(reference) => Some(with_body_fallback(
                &schemas.resolve_reference(ctx, reference, false)?,
            )),
            None => {
                let resolved = schemas.resolve_inline(ctx, &node.id, raw)?;
                let body = with_body_fallback(&resolved);
                if !body.kind.is_primitive() || !body.properties.is_empty() {
                    ctx.register_inline(&node.id, body.clone());
                }
                Some(body)
            }
        },
    };
    Ok(node)
}
