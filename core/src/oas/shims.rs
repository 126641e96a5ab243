#![deny(missing_docs)]

//! # Fragment Shims
//!
//! Intermediate deserialization layer over raw document fragments.
//!
//! Absent keys decode to explicit defaults (empty maps, empty lists, `false`),
//! keys the resolvers cannot do without (`info.title`, parameter `name`/`in`)
//! are required, and any decoding failure is reported as
//! [`AppError::MalformedFragment`] carrying the fragment.
//!
//! Nested schemas stay as raw [`Value`]s: the schema resolver decides how to
//! name and register them.

use crate::error::{AppError, AppResult};
use crate::oas::models::ParameterLocation;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Number, Value};

/// Decodes a raw fragment into its typed shape.
pub(crate) fn from_fragment<T: DeserializeOwned>(fragment: &Value) -> AppResult<T> {
    T::deserialize(fragment).map_err(|e| AppError::MalformedFragment {
        message: e.to_string(),
        fragment: fragment.clone(),
    })
}

/// Root of an OpenAPI document (only the sections the resolvers read).
#[derive(Debug, Clone, Deserialize)]
pub struct ShimDocument {
    /// Document metadata.
    pub info: ShimInfo,
    /// Path items keyed by template.
    #[serde(default)]
    pub paths: IndexMap<String, Value>,
    /// Reusable definitions.
    #[serde(default)]
    pub components: ShimComponents,
}

/// `info` object.
#[derive(Debug, Clone, Deserialize)]
pub struct ShimInfo {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// Description.
    pub description: Option<String>,
}

/// `components` object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShimComponents {
    /// Reusable schemas.
    pub schemas: IndexMap<String, Value>,
    /// Reusable parameters.
    pub parameters: IndexMap<String, Value>,
}

/// A `type` declaration: a single keyword, or a list of keywords (OAS 3.1).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ShimType {
    /// `type: string`
    Single(String),
    /// `type: [string, "null"]`
    Multiple(Vec<String>),
}

impl ShimType {
    /// The keyword that decides the kind: the first non-`null` entry.
    pub fn primary(&self) -> &str {
        match self {
            ShimType::Single(t) => t,
            ShimType::Multiple(types) => types
                .iter()
                .find(|t| t.as_str() != "null")
                .or_else(|| types.first())
                .map(String::as_str)
                .unwrap_or("null"),
        }
    }
}

/// `exclusiveMinimum`/`exclusiveMaximum`: boolean (OAS 3.0) or the bound itself (OAS 3.1).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ShimExclusive {
    /// Modifies `minimum`/`maximum`.
    Flag(bool),
    /// Replaces `minimum`/`maximum`.
    Bound(Number),
}

/// Schema object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShimSchema {
    /// `$ref`
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    /// `type`
    #[serde(rename = "type")]
    pub schema_type: Option<ShimType>,
    /// `format`
    pub format: Option<String>,
    /// `title`
    pub title: Option<String>,
    /// `description`
    pub description: Option<String>,
    /// `enum`
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,
    /// `properties`, in declaration order.
    pub properties: IndexMap<String, Value>,
    /// `required`
    pub required: Vec<String>,
    /// `items`
    pub items: Option<Value>,
    /// `allOf`; `None` when the key is absent.
    #[serde(rename = "allOf")]
    pub all_of: Option<Vec<Value>>,
    /// `anyOf`; `None` when the key is absent.
    #[serde(rename = "anyOf")]
    pub any_of: Option<Vec<Value>>,
    /// `discriminator`
    pub discriminator: Option<ShimDiscriminator>,
    /// `minimum`
    pub minimum: Option<Number>,
    /// `maximum`
    pub maximum: Option<Number>,
    /// `exclusiveMinimum`
    #[serde(rename = "exclusiveMinimum")]
    pub exclusive_minimum: Option<ShimExclusive>,
    /// `exclusiveMaximum`
    #[serde(rename = "exclusiveMaximum")]
    pub exclusive_maximum: Option<ShimExclusive>,
}

impl ShimSchema {
    /// `allOf` members (empty when absent).
    pub fn all_of(&self) -> &[Value] {
        self.all_of.as_deref().unwrap_or_default()
    }

    /// `anyOf` members (empty when absent).
    pub fn any_of(&self) -> &[Value] {
        self.any_of.as_deref().unwrap_or_default()
    }

    /// The declared `type` keyword, if any.
    pub fn declared_type(&self) -> Option<&str> {
        self.schema_type.as_ref().map(ShimType::primary)
    }
}

/// Discriminator object. Both keys are validated by the schema resolver.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShimDiscriminator {
    /// `propertyName`
    #[serde(rename = "propertyName")]
    pub property_name: Option<String>,
    /// `mapping`: tag value to `$ref`.
    pub mapping: Option<IndexMap<String, String>>,
}

/// Parameter object.
#[derive(Debug, Clone, Deserialize)]
pub struct ShimParameter {
    /// `name`
    pub name: String,
    /// `in`
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// `required`
    #[serde(default)]
    pub required: bool,
    /// `description`
    pub description: Option<String>,
    /// `schema`
    pub schema: Option<Value>,
}

/// Media type object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShimMediaType {
    /// `schema`
    pub schema: Option<Value>,
}

/// Request body object. A `$ref` body is followed before decoding.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShimRequestBody {
    /// `description`
    pub description: Option<String>,
    /// `required`
    pub required: bool,
    /// `content`, keyed by media type.
    pub content: Option<IndexMap<String, ShimMediaType>>,
}

/// Response object. A `$ref` response is followed before decoding.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShimResponse {
    /// `description`
    pub description: Option<String>,
    /// `content`, keyed by media type.
    pub content: IndexMap<String, ShimMediaType>,
}

/// Operation object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShimOperation {
    /// `operationId`
    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,
    /// `summary`
    pub summary: Option<String>,
    /// `description`
    pub description: Option<String>,
    /// `deprecated`
    pub deprecated: bool,
    /// `tags`
    pub tags: Vec<String>,
    /// `parameters`
    pub parameters: Vec<Value>,
    /// `requestBody`
    #[serde(rename = "requestBody")]
    pub request_body: Option<Value>,
    /// `responses`, keyed by status pattern.
    pub responses: IndexMap<String, Value>,
}

/// Path item object. Operations are looked up by method on the raw value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShimPathItem {
    /// `summary`
    pub summary: Option<String>,
    /// `description`
    pub description: Option<String>,
    /// Parameters shared by every operation of the path.
    pub parameters: Vec<Value>,
}
