#![deny(missing_docs)]

//! # Type Mapping
//!
//! Projects resolved schemas onto target-language type expressions and
//! response deserialization expressions.
//!
//! Every function is total over the nodes reachable from a
//! [`DocumentModel`](crate::oas::DocumentModel): the renderer never has to
//! inspect a schema itself.

use crate::error::{AppError, AppResult};
use crate::oas::models::{
    ResponseNode, SchemaFormat, SchemaItems, SchemaKind, SchemaNode, SchemaProperty, SchemaRef,
};
use crate::oas::naming::class_name;
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

/// Sentinel type for responses without a body.
pub const EMPTY_BODY: &str = "EmptyBody";

/// Trait for projecting schemas into a target language.
pub trait TypeProjector {
    /// Type expression of a schema.
    fn type_expr(&self, node: &SchemaNode) -> String;

    /// Type expression of a property, optional unless required by `owner`.
    fn property_type_expr(&self, owner: &SchemaNode, property: &SchemaProperty) -> String;

    /// Union of the types of every response, deduplicated in order.
    fn response_type_expr(&self, responses: &IndexMap<String, ResponseNode>) -> String;

    /// Per status pattern, the expression turning a raw HTTP response into the typed value.
    fn response_deserialize_expr(
        &self,
        responses: &IndexMap<String, ResponseNode>,
    ) -> AppResult<Vec<(String, String)>>;
}

/// Projects onto Python type hints for a pydantic-based client.
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonProjector;

impl TypeProjector for PythonProjector {
    fn type_expr(&self, node: &SchemaNode) -> String {
        if let Some(values) = &node.enum_values {
            return if node.is_named() {
                class_name(&node.id)
            } else {
                literal(values)
            };
        }

        match node.kind {
            SchemaKind::String => match node.format {
                Some(SchemaFormat::Binary) => "bytes".into(),
                Some(SchemaFormat::Uri) => "HttpUrl".into(),
                Some(SchemaFormat::Date) => "date".into(),
                Some(SchemaFormat::DateTime) => "datetime".into(),
                _ => "str".into(),
            },
            SchemaKind::Integer => "int".into(),
            SchemaKind::Number => "float".into(),
            SchemaKind::Boolean => "bool".into(),
            SchemaKind::Null => "None".into(),
            SchemaKind::Array => match &node.items {
                None => "list[Any]".into(),
                Some(SchemaItems::Single(item)) => format!("list[{}]", self.type_expr(item)),
                Some(SchemaItems::Union(variants)) => {
                    format!("list[{}]", union(variants.iter().flat_map(|v| self.members(v))))
                }
            },
            SchemaKind::Object => self.object_expr(node),
        }
    }

    fn property_type_expr(&self, owner: &SchemaNode, property: &SchemaProperty) -> String {
        let expr = self.type_expr(&property.schema);
        if owner.is_required(&property.original_key) {
            expr
        } else {
            format!("Optional[{}]", expr)
        }
    }

    fn response_type_expr(&self, responses: &IndexMap<String, ResponseNode>) -> String {
        if responses.is_empty() {
            return "None".into();
        }
        union(responses.values().flat_map(|response| match &response.schema {
            Some(schema) => self.members(schema),
            None => vec![EMPTY_BODY.to_string()],
        }))
    }

    fn response_deserialize_expr(
        &self,
        responses: &IndexMap<String, ResponseNode>,
    ) -> AppResult<Vec<(String, String)>> {
        responses
            .iter()
            .map(|(status, response)| {
                let expr = match &response.schema {
                    None => format!(
                        "{}(status_code=response.status_code, text=response.text)",
                        EMPTY_BODY
                    ),
                    Some(schema) => self.deserialize(&response.id, schema)?,
                };
                Ok((status.clone(), expr))
            })
            .collect()
    }
}

impl PythonProjector {
    fn object_expr(&self, node: &SchemaNode) -> String {
        if variant_nodes(node).is_some() {
            return union(self.members(node));
        }
        if node.is_empty_object() {
            return "dict[str, Any]".into();
        }
        if let Some(member) = collapsed_member(node) {
            return self.type_expr(member);
        }
        if node.id.is_empty() {
            return "dict[str, Any]".into();
        }
        class_name(&node.id)
    }

    /// Types a value of `node` can take, with nested unions flattened.
    fn members(&self, node: &SchemaNode) -> Vec<String> {
        match variant_nodes(node) {
            Some(variants) => variants
                .into_iter()
                .flat_map(|variant| self.members(variant))
                .collect(),
            None => vec![self.type_expr(node)],
        }
    }

    fn deserialize(&self, response_id: &str, schema: &SchemaRef) -> AppResult<String> {
        const BODY: &str = "response.json()";
        match schema.kind {
            SchemaKind::Object => Ok(self.parse_object(schema, BODY)),
            SchemaKind::Array => {
                let element = match &schema.items {
                    Some(SchemaItems::Single(item)) if item.kind == SchemaKind::Object => {
                        self.parse_object(item, "item")
                    }
                    Some(SchemaItems::Union(variants)) => {
                        any_of_call(variants.iter().flat_map(|v| self.members(v)), "item")
                    }
                    _ => return Ok(BODY.into()),
                };
                if element == "item" {
                    Ok(BODY.into())
                } else {
                    Ok(format!("[{} for item in {}]", element, BODY))
                }
            }
            SchemaKind::String if schema.is_binary_string() => Ok("response.content".into()),
            SchemaKind::String => Ok("response.text".into()),
            SchemaKind::Integer => Ok("int(response.text)".into()),
            SchemaKind::Number | SchemaKind::Boolean | SchemaKind::Null => {
                Err(AppError::UnsupportedResponseMapping {
                    response: response_id.to_string(),
                    kind: schema.kind.to_string(),
                })
            }
        }
    }

    /// Parsing expression of an object-kind value held in `value`.
    fn parse_object(&self, node: &SchemaNode, value: &str) -> String {
        if variant_nodes(node).is_some() {
            return any_of_call(self.members(node), value);
        }
        if let Some(member) = collapsed_member(node) {
            if member.kind == SchemaKind::Object {
                return self.parse_object(member, value);
            }
        }
        let expr = self.type_expr(node);
        if expr.starts_with("dict[") || node.enum_values.is_some() {
            value.to_string()
        } else {
            format!("{}.model_validate({})", expr, value)
        }
    }
}

/// Variants of a tagged or untagged union; `None` for plain objects.
fn variant_nodes(node: &SchemaNode) -> Option<Vec<&SchemaRef>> {
    if node.kind != SchemaKind::Object {
        return None;
    }
    if let Some(discriminator) = &node.discriminator {
        return Some(discriminator.mapping.values().collect());
    }
    if !node.any_of.is_empty() && node.properties.is_empty() {
        return Some(node.any_of.iter().collect());
    }
    None
}

/// A lone `allOf` member stands for an anonymous wrapper without fields of its own.
fn collapsed_member(node: &SchemaNode) -> Option<&SchemaRef> {
    match node.all_of.as_slice() {
        [member] if !node.is_named() && node.properties.is_empty() => Some(member),
        _ => None,
    }
}

fn any_of_call(variants: impl IntoIterator<Item = String>, value: &str) -> String {
    let unique: IndexSet<String> = variants.into_iter().collect();
    let list: Vec<_> = unique.into_iter().collect();
    format!("self._parse_any_of({}, [{}])", value, list.join(", "))
}

/// `Union[...]` of the distinct members, in order; a single member stands alone.
fn union(members: impl IntoIterator<Item = String>) -> String {
    let unique: IndexSet<String> = members.into_iter().collect();
    match unique.len() {
        0 => "Any".into(),
        1 => unique.into_iter().next().unwrap_or_default(),
        _ => {
            let list: Vec<_> = unique.into_iter().collect();
            format!("Union[{}]", list.join(", "))
        }
    }
}

fn literal(values: &[Value]) -> String {
    let items: Vec<String> = values
        .iter()
        .map(|value| match value {
            Value::String(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            Value::Bool(true) => "True".into(),
            Value::Bool(false) => "False".into(),
            Value::Null => "None".into(),
            other => other.to_string(),
        })
        .collect();
    format!("Literal[{}]", items.join(", "))
}
