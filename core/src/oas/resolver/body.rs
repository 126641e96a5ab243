#![deny(missing_docs)]

//! # Request Body Resolution
//!
//! Resolves `requestBody` into a [`RequestBodyNode`].
//!
//! Exactly one media type is supported; extra ones are logged and ignored.
//! Multipart bodies have their binary string properties moved out of the
//! body schema, since those travel as file uploads instead of fields.

use crate::error::{AppError, AppResult};
use crate::oas::context::ResolutionContext;
use crate::oas::models::{RequestBodyNode, SchemaNode, SchemaRef};
use crate::oas::schemas::{reference_of, with_body_fallback, SchemaResolver};
use crate::oas::shims::{from_fragment, ShimRequestBody};
use serde_json::Value;
use std::rc::Rc;
use tracing::warn;

const FORM_ENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART: &str = "multipart/form-data";

/// Resolves a request body fragment.
pub fn resolve_request_body(
    schemas: &SchemaResolver<'_>,
    ctx: &mut ResolutionContext,
    fragment: &Value,
) -> AppResult<RequestBodyNode> {
    if let Some(reference) = reference_of(fragment) {
        let target = schemas.refs().resolve(reference)?;
        let mut node = resolve_request_body(schemas, ctx, target.data)?;
        node.id = target.id;
        return Ok(node);
    }

    let shim: ShimRequestBody = from_fragment(fragment)?;
    let content = shim.content.as_ref().ok_or_else(|| AppError::MalformedFragment {
        message: "request body has no \"content\"".into(),
        fragment: fragment.clone(),
    })?;
    let Some((media_type, media)) = content.first() else {
        return Err(AppError::MalformedFragment {
            message: "request body declares no media type".into(),
            fragment: fragment.clone(),
        });
    };
    if content.len() > 1 {
        let err = AppError::UnsupportedMediaTypeCount {
            owner: "requestBody".into(),
            media_types: content.keys().cloned().collect(),
        };
        warn!("{}", err);
    }

    let raw_schema = media.schema.as_ref().ok_or_else(|| AppError::MalformedFragment {
        message: format!("media type \"{}\" has no \"schema\"", media_type),
        fragment: fragment.clone(),
    })?;
    let schema = match reference_of(raw_schema) {
        Some(reference) => schemas.resolve_reference(ctx, reference, false)?,
        None => schemas.resolve_anonymous(ctx, raw_schema)?,
    };

    let is_form_encoded = media_type == FORM_ENCODED;
    let is_multipart = media_type == MULTIPART;
    let (schema, file_properties, files_required) = if is_multipart {
        strip_file_properties(&schema)
    } else {
        (schema, Vec::new(), false)
    };

    Ok(RequestBodyNode {
        id: String::new(),
        description: shim.description,
        media_type: media_type.clone(),
        schema: with_body_fallback(&schema),
        required: shim.required,
        is_form_encoded,
        is_multipart,
        file_properties,
        files_required,
    })
}

/// Splits binary string properties off a multipart body.
///
/// Returns the remaining view, the stripped keys and whether any stripped
/// key was required. The input node is left untouched.
fn strip_file_properties(schema: &SchemaRef) -> (SchemaRef, Vec<String>, bool) {
    let files: Vec<String> = schema
        .properties
        .iter()
        .filter(|p| p.schema.is_binary_string())
        .map(|p| p.original_key.clone())
        .collect();
    if files.is_empty() {
        return (schema.clone(), files, false);
    }

    let files_required = files.iter().any(|key| schema.is_required(key));
    let mut view: SchemaNode = (**schema).clone();
    view.properties.retain(|p| !files.contains(&p.original_key));
    view.required.retain(|key| !files.contains(key));
    (Rc::new(view), files, files_required)
}
