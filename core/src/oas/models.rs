#![deny(missing_docs)]

//! # OpenAPI Models
//!
//! Intermediate Representation (IR) produced by the resolvers.
//!
//! Nodes are immutable once built and shared through [`SchemaRef`]. Every
//! keyed collection is insertion-ordered, since the order of properties,
//! responses and operations ends up in generated source.

use crate::oas::naming::safe_identifier;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Number, Value};
use std::fmt;
use std::rc::Rc;

/// Shared handle to a resolved schema.
pub type SchemaRef = Rc<SchemaNode>;

/// The closed set of schema kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// `string`
    String,
    /// `number`
    Number,
    /// `integer`
    Integer,
    /// `boolean`
    Boolean,
    /// `array`
    Array,
    /// `object`
    Object,
    /// `null`
    Null,
}

impl SchemaKind {
    /// Parses a declared `type` value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "array" => Some(Self::Array),
            "object" => Some(Self::Object),
            "null" => Some(Self::Null),
            _ => None,
        }
    }

    /// The keyword as written in a document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Null => "null",
        }
    }

    /// Scalars (and `null`) never become named types of their own.
    pub fn is_primitive(&self) -> bool {
        match self {
            Self::String | Self::Number | Self::Integer | Self::Boolean | Self::Null => true,
            Self::Array | Self::Object => false,
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported `format` refinements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaFormat {
    /// `int32`
    Int32,
    /// `int64`
    Int64,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `date`
    Date,
    /// `byte`
    Byte,
    /// `binary`
    Binary,
    /// `date-time`
    DateTime,
    /// `password`
    Password,
    /// `uuid`
    Uuid,
    /// `uri`
    Uri,
    /// `hostname`
    Hostname,
    /// `ipv4`
    Ipv4,
    /// `ipv6`
    Ipv6,
}

impl SchemaFormat {
    const ALL: [SchemaFormat; 14] = [
        Self::Int32,
        Self::Int64,
        Self::Float,
        Self::Double,
        Self::Date,
        Self::Byte,
        Self::Binary,
        Self::DateTime,
        Self::Password,
        Self::Uuid,
        Self::Uri,
        Self::Hostname,
        Self::Ipv4,
        Self::Ipv6,
    ];

    /// Parses a declared `format`.
    ///
    /// Exact keywords match first; otherwise `-` and `_` are dropped and the
    /// remainder is compared case-insensitively, so `datetime` is `date-time`.
    pub fn parse(value: &str) -> Option<Self> {
        if let Some(format) = Self::ALL.iter().find(|f| f.as_str() == value) {
            return Some(*format);
        }
        let squashed: String = value
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        Self::ALL
            .iter()
            .find(|f| f.as_str().replace('-', "") == squashed)
            .copied()
    }

    /// The keyword as written in a document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float => "float",
            Self::Double => "double",
            Self::Date => "date",
            Self::Byte => "byte",
            Self::Binary => "binary",
            Self::DateTime => "date-time",
            Self::Password => "password",
            Self::Uuid => "uuid",
            Self::Uri => "uri",
            Self::Hostname => "hostname",
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
        }
    }
}

/// A `minimum` or `maximum` bound.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericBound {
    /// The bound value.
    pub value: Number,
    /// Whether the bound itself is excluded.
    pub exclusive: bool,
}

/// Items of an array schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaItems {
    /// Homogeneous items.
    Single(SchemaRef),
    /// Items declared as `anyOf`: each element is one of the variants.
    Union(Vec<SchemaRef>),
}

impl SchemaItems {
    /// All schemas an element may be.
    pub fn variants(&self) -> Vec<&SchemaRef> {
        match self {
            SchemaItems::Single(node) => vec![node],
            SchemaItems::Union(nodes) => nodes.iter().collect(),
        }
    }
}

/// A tagged union declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Discriminator {
    /// The property carrying the tag.
    pub property_name: String,
    /// Tag value to concrete schema, in declaration order.
    pub mapping: IndexMap<String, SchemaRef>,
}

/// A schema marked as generated base class via `__discriminator__(Class.attr)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscriminatorBaseClass {
    /// Class name.
    pub name: String,
    /// Attribute holding the tag.
    pub attr: String,
}

/// A fully resolved schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// Unique id within a run; empty for anonymous leaves.
    pub id: String,
    /// `title`
    pub title: Option<String>,
    /// `description`
    pub description: Option<String>,
    /// The schema kind.
    pub kind: SchemaKind,
    /// Optional refinement of the kind.
    pub format: Option<SchemaFormat>,
    /// Literal values, when the schema is an enumeration.
    pub enum_values: Option<Vec<Value>>,
    /// Properties in declaration order.
    pub properties: Vec<SchemaProperty>,
    /// Original keys of the required properties.
    pub required: Vec<String>,
    /// Array items.
    pub items: Option<SchemaItems>,
    /// `allOf` members.
    pub all_of: Vec<SchemaRef>,
    /// `anyOf` members.
    pub any_of: Vec<SchemaRef>,
    /// Tagged union declaration.
    pub discriminator: Option<Discriminator>,
    /// Lower bound.
    pub minimum: Option<NumericBound>,
    /// Upper bound.
    pub maximum: Option<NumericBound>,
    /// Stub emitted to break a reference cycle.
    pub is_placeholder: bool,
    /// Synthesized rather than declared under `components.schemas`.
    pub is_inline: bool,
}

impl SchemaNode {
    /// Creates an empty node of the given kind.
    pub fn new(id: impl Into<String>, kind: SchemaKind) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
            kind,
            format: None,
            enum_values: None,
            properties: Vec::new(),
            required: Vec::new(),
            items: None,
            all_of: Vec::new(),
            any_of: Vec::new(),
            discriminator: None,
            minimum: None,
            maximum: None,
            is_placeholder: false,
            is_inline: false,
        }
    }

    /// Declared under `components.schemas` (and therefore has its own generated type).
    pub fn is_named(&self) -> bool {
        !self.id.is_empty() && !self.is_inline
    }

    /// Whether the property with this original key is required.
    pub fn is_required(&self, key: &str) -> bool {
        self.required.iter().any(|r| r == key)
    }

    /// Required properties, in declaration order.
    pub fn required_properties(&self) -> Vec<&SchemaProperty> {
        self.properties
            .iter()
            .filter(|p| self.is_required(&p.original_key))
            .collect()
    }

    /// Optional properties, in declaration order.
    pub fn optional_properties(&self) -> Vec<&SchemaProperty> {
        self.properties
            .iter()
            .filter(|p| !self.is_required(&p.original_key))
            .collect()
    }

    /// `allOf` members declared in place (their fields merge into this node).
    pub fn inline_all_of(&self) -> Vec<&SchemaRef> {
        self.all_of.iter().filter(|m| !m.is_named()).collect()
    }

    /// `allOf` members that are named schemas (generated base classes).
    pub fn named_all_of(&self) -> Vec<&SchemaRef> {
        self.all_of.iter().filter(|m| m.is_named()).collect()
    }

    /// An object with nothing in it: projected as an untyped map.
    pub fn is_empty_object(&self) -> bool {
        self.kind == SchemaKind::Object
            && !self.is_placeholder
            && self.enum_values.is_none()
            && self.items.is_none()
            && self.properties.is_empty()
            && self.required.is_empty()
            && self.all_of.is_empty()
            && self.any_of.is_empty()
            && self.discriminator.is_none()
    }

    /// Whether this is a `string` with `format: binary`.
    pub fn is_binary_string(&self) -> bool {
        self.kind == SchemaKind::String && self.format == Some(SchemaFormat::Binary)
    }
}

/// A property of an object schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaProperty {
    /// Key as written in the document.
    pub original_key: String,
    /// Identifier-safe key used in generated code.
    pub resolved_key: String,
    /// The property schema.
    pub schema: SchemaRef,
}

impl SchemaProperty {
    /// Creates a property, honoring an explicit `__safety_key__` override.
    pub fn new(original_key: impl Into<String>, safety_key: Option<String>, schema: SchemaRef) -> Self {
        let original_key = original_key.into();
        let resolved_key = safety_key.unwrap_or_else(|| safe_identifier(&original_key));
        Self {
            original_key,
            resolved_key,
            schema,
        }
    }
}

/// Where a parameter travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Templated path segment.
    Path,
    /// Cookie.
    Cookie,
}

impl ParameterLocation {
    /// The keyword as written in a document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Header => "header",
            Self::Path => "path",
            Self::Cookie => "cookie",
        }
    }
}

/// A resolved parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterNode {
    /// Component name, or empty when declared inline.
    pub id: String,
    /// `name` as written in the document.
    pub original_key: String,
    /// Identifier-safe name used in generated code.
    pub resolved_key: String,
    /// `description`
    pub description: Option<String>,
    /// `in`
    pub location: ParameterLocation,
    /// `required`
    pub required: bool,
    /// The parameter schema.
    pub schema: SchemaRef,
}

/// A resolved request body.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestBodyNode {
    /// Component name, or empty when declared inline.
    pub id: String,
    /// `description`
    pub description: Option<String>,
    /// The chosen media type.
    pub media_type: String,
    /// Body schema (file properties stripped for multipart bodies).
    pub schema: SchemaRef,
    /// `required`
    pub required: bool,
    /// `application/x-www-form-urlencoded`
    pub is_form_encoded: bool,
    /// `multipart/form-data`
    pub is_multipart: bool,
    /// Keys of the binary properties moved out of the body.
    pub file_properties: Vec<String>,
    /// Whether any stripped binary property was required.
    pub files_required: bool,
}

/// A resolved response for one status pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseNode {
    /// Component name or synthesized `<operationId>Response<status>`.
    pub id: String,
    /// The status pattern (`200`, `4XX`, ...).
    pub status_pattern: String,
    /// `description`
    pub description: Option<String>,
    /// The chosen media type, when there is a body.
    pub media_type: Option<String>,
    /// Body schema; absent for empty bodies.
    pub schema: Option<SchemaRef>,
}

/// HTTP methods a path item may declare, in iteration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET
    Get,
    /// PUT
    Put,
    /// POST
    Post,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
    /// HEAD
    Head,
    /// PATCH
    Patch,
    /// TRACE
    Trace,
}

impl HttpMethod {
    /// Every method, in the order path items are scanned.
    pub const ALL: [HttpMethod; 8] = [
        Self::Get,
        Self::Put,
        Self::Post,
        Self::Delete,
        Self::Options,
        Self::Head,
        Self::Patch,
        Self::Trace,
    ];

    /// Lowercase key used in path items.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Put => "put",
            Self::Post => "post",
            Self::Delete => "delete",
            Self::Options => "options",
            Self::Head => "head",
            Self::Patch => "patch",
            Self::Trace => "trace",
        }
    }

    /// Methods the generated client exposes.
    pub fn is_supported(&self) -> bool {
        matches!(
            self,
            Self::Get | Self::Put | Self::Post | Self::Delete | Self::Patch
        )
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved endpoint operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationNode {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path template the operation belongs to.
    pub path: String,
    /// Declared `operationId`, if any.
    pub operation_id: Option<String>,
    /// Function name for the generated client.
    pub fn_name: String,
    /// `summary`
    pub summary: Option<String>,
    /// `description`
    pub description: Option<String>,
    /// `deprecated`
    pub deprecated: bool,
    /// `tags`
    pub tags: Vec<String>,
    /// Parameters, path-level ones first.
    pub parameters: Vec<ParameterNode>,
    /// Request body, if declared.
    pub request_body: Option<RequestBodyNode>,
    /// Responses keyed by status pattern.
    pub responses: IndexMap<String, ResponseNode>,
}

impl OperationNode {
    /// Parameters at a given location.
    pub fn params_in(&self, location: ParameterLocation) -> Vec<&ParameterNode> {
        self.parameters
            .iter()
            .filter(|p| p.location == location)
            .collect()
    }

    /// Path parameters.
    pub fn path_params(&self) -> Vec<&ParameterNode> {
        self.params_in(ParameterLocation::Path)
    }

    /// Query parameters.
    pub fn query_params(&self) -> Vec<&ParameterNode> {
        self.params_in(ParameterLocation::Query)
    }

    /// Header parameters.
    pub fn header_params(&self) -> Vec<&ParameterNode> {
        self.params_in(ParameterLocation::Header)
    }

    /// Cookie parameters.
    pub fn cookie_params(&self) -> Vec<&ParameterNode> {
        self.params_in(ParameterLocation::Cookie)
    }
}

/// A resolved path item.
#[derive(Debug, Clone, PartialEq)]
pub struct PathNode {
    /// The path template (e.g. `/pets/{petId}`).
    pub path_template: String,
    /// `summary`
    pub summary: Option<String>,
    /// `description`
    pub description: Option<String>,
    /// Operations keyed by method.
    pub operations: IndexMap<HttpMethod, OperationNode>,
}

/// Document metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    /// `info.title`
    pub title: String,
    /// `info.version`
    pub version: String,
    /// `info.description`
    pub description: Option<String>,
}
