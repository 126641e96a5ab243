//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace.
//!
//! Every fatal variant produced while resolving a document carries the raw
//! fragment that triggered it, so callers can print it as diagnostics.

use derive_more::{Display, From};
use serde_json::Value;

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// The document text could not be decoded into a nested map.
    #[from(ignore)]
    #[display("Failed to decode document: {_0}")]
    Decode(String),

    /// A `$ref` pointer does not lead anywhere in the document.
    #[from(ignore)]
    #[display("Unable to resolve \"{reference}\", document section \"{segment}\" not found")]
    UnresolvableReference {
        /// The full reference string.
        reference: String,
        /// The first segment that could not be found.
        segment: String,
    },

    /// A schema declares a `type` outside the supported set.
    #[from(ignore)]
    #[display("Unable to parse schema, unknown type \"{value}\"")]
    UnknownType {
        /// The declared type.
        value: String,
        /// The offending schema fragment.
        fragment: Value,
    },

    /// A schema declares a `format` outside the supported set.
    #[from(ignore)]
    #[display("Unable to parse schema, unknown format \"{value}\"")]
    UnknownFormat {
        /// The declared format.
        value: String,
        /// The offending schema fragment.
        fragment: Value,
    },

    /// A discriminator lacks `propertyName` or `mapping`, or maps to an unusable schema.
    #[from(ignore)]
    #[display("Invalid discriminator: {message}")]
    InvalidDiscriminator {
        /// What is wrong with the discriminator.
        message: String,
        /// The schema fragment owning the discriminator.
        fragment: Value,
    },

    /// More than one media type was declared on a body or response.
    ///
    /// Recovered by picking the first one; only ever logged.
    #[from(ignore)]
    #[display("Multiple media types on \"{owner}\" are not supported, using \"{}\"", media_types.first().map(String::as_str).unwrap_or_default())]
    UnsupportedMediaTypeCount {
        /// Identifier of the body or response.
        owner: String,
        /// All declared media types, in document order.
        media_types: Vec<String>,
    },

    /// A response schema shape that cannot be turned into a deserialization expression.
    #[from(ignore)]
    #[display("Unable to create response mapping of \"{response}\" (schema kind {kind})")]
    UnsupportedResponseMapping {
        /// Identifier of the response.
        response: String,
        /// The schema kind that has no mapping.
        kind: String,
    },

    /// A parameter schema uses `allOf` with more than one member.
    #[from(ignore)]
    #[display("\"allOf\" in parameter \"{parameter}\" can contain only one item, found {count}")]
    TooManyAllOfMembers {
        /// Name of the parameter.
        parameter: String,
        /// Number of `allOf` members found.
        count: usize,
        /// The parameter fragment.
        fragment: Value,
    },

    /// A fragment could not be decoded into its typed shape (missing key, wrong type).
    #[from(ignore)]
    #[display("Malformed fragment: {message}")]
    MalformedFragment {
        /// Decoder diagnostic, naming the offending key.
        message: String,
        /// The offending fragment.
        fragment: Value,
    },

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

impl AppError {
    /// Returns the raw fragment attached to this error, if any.
    pub fn fragment(&self) -> Option<&Value> {
        match self {
            AppError::UnknownType { fragment, .. }
            | AppError::UnknownFormat { fragment, .. }
            | AppError::InvalidDiscriminator { fragment, .. }
            | AppError::TooManyAllOfMembers { fragment, .. }
            | AppError::MalformedFragment { fragment, .. } => Some(fragment),
            _ => None,
        }
    }

    /// Whether generation can continue after this error (it is only ever logged).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::UnsupportedMediaTypeCount { .. })
    }
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;
