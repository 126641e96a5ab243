#![deny(missing_docs)]

//! # Naming Utilities
//!
//! Helpers for deriving identifier-safe names from document keys, plus the
//! description escape hatches (`__safety_key__(...)`, `__discriminator__(...)`).

use crate::oas::models::DiscriminatorBaseClass;
use heck::ToSnakeCase;
use regex::Regex;
use std::sync::OnceLock;

/// Keywords of the target language.
const RESERVED_WORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// Attribute names the generated model base class already uses.
const MODEL_RESERVED_NAMES: &[&str] = &["schema"];

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn is_reserved_word(s: &str) -> bool {
    RESERVED_WORDS.contains(&s)
}

/// Projects a document key onto a safe identifier.
///
/// Valid, non-reserved keys are kept as is. Otherwise `-`/`.` become `_`,
/// other symbols are dropped, leading non-letters are stripped, and a
/// trailing `_` is appended to reserved words.
///
/// e.g. `33with.dot-and-hyphens&*` -> `with_dot_and_hyphens`, `class` -> `class_`
pub fn safe_identifier(key: &str) -> String {
    if is_identifier(key) && !is_reserved_word(key) && !MODEL_RESERVED_NAMES.contains(&key) {
        return key.to_string();
    }

    let mut out = key.to_string();
    if !is_identifier(&out) {
        out = out.replace(['-', '.'], "_");
        out.retain(|c| c.is_ascii_alphanumeric() || c == '_');
        out = out
            .trim_start_matches(|c: char| !(c.is_ascii_alphabetic() || c == '_'))
            .to_string();
    }
    if out.is_empty() {
        out.push('_');
    }

    if is_reserved_word(&out) {
        out.push('_');
    }
    if MODEL_RESERVED_NAMES.contains(&out.as_str()) {
        out.push('_');
    }
    out
}

/// Converts a schema id into a class name.
///
/// Dots are dropped and the first character of every `_`-separated segment is
/// upper-cased; existing capitals are kept (`HTTPError` stays `HTTPError`).
///
/// e.g. `tags_listItem` -> `TagsListItem`
pub fn class_name(id: &str) -> String {
    id.replace('.', "")
        .split('_')
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Converts a mixed-case string into a snake_case variable name.
pub fn var_name(value: &str) -> String {
    value.to_snake_case()
}

/// Derives the client function name from an `operationId`.
///
/// e.g. `listPets` -> `list_pets`, `get-pet-by-id` -> `get_pet_by_id`
pub fn operation_fn_name(operation_id: &str) -> String {
    operation_id.replace('-', "_").to_snake_case()
}

/// Derives a function name from the HTTP method and path when `operationId` is missing.
///
/// e.g. `GET /users/{id}` -> `get_users_id`
pub fn derive_handler_name(method: &str, path: &str) -> String {
    let clean_path = path
        .trim_start_matches('/')
        .replace('-', "_")
        .replace('/', "_")
        .replace(['{', '}'], "");
    format!("{}_{}", method, clean_path).to_lowercase()
}

/// Extracts an explicit `__safety_key__(name)` override from a description.
pub fn extract_safety_key(description: Option<&str>) -> Option<String> {
    static SAFETY_KEY_RE: OnceLock<Regex> = OnceLock::new();
    let re = SAFETY_KEY_RE
        .get_or_init(|| Regex::new(r"__safety_key__\((?P<key>.+)\)").expect("Invalid regex"));
    re.captures(description?)
        .map(|caps| caps["key"].to_string())
}

/// Extracts a `__discriminator__(ClassName.attr)` marker from a description.
pub fn extract_discriminator_base_class(description: Option<&str>) -> Option<DiscriminatorBaseClass> {
    let description = description?;
    if !description.contains("__discriminator__") {
        return None;
    }
    static DISCRIMINATOR_RE: OnceLock<Regex> = OnceLock::new();
    let re = DISCRIMINATOR_RE.get_or_init(|| {
        Regex::new(r"__discriminator__\((?P<name>.+)\.(?P<attr>.+)\)").expect("Invalid regex")
    });
    re.captures(description).map(|caps| DiscriminatorBaseClass {
        name: caps["name"].to_string(),
        attr: caps["attr"].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_identifier() {
        assert_eq!(safe_identifier("name"), "name");
        assert_eq!(safe_identifier("class"), "class_");
        assert_eq!(safe_identifier("for"), "for_");
        assert_eq!(safe_identifier("schema"), "schema_");
        assert_eq!(safe_identifier("33with.dot-and-hyphens&*"), "with_dot_and_hyphens");
        assert_eq!(safe_identifier("x-request-id"), "x_request_id");
        assert_eq!(safe_identifier("&*"), "_");
    }

    #[test]
    fn test_class_name() {
        assert_eq!(class_name("Pet"), "Pet");
        assert_eq!(class_name("pet_list"), "PetList");
        assert_eq!(class_name("tags_listItem"), "TagsListItem");
        assert_eq!(class_name("getPetResponse200"), "GetPetResponse200");
        assert_eq!(class_name("HTTPError"), "HTTPError");
        assert_eq!(class_name("v1.Pet"), "V1Pet");
    }

    #[test]
    fn test_fn_names() {
        assert_eq!(operation_fn_name("listPets"), "list_pets");
        assert_eq!(operation_fn_name("get-pet"), "get_pet");
        assert_eq!(var_name("PetStoreItem"), "pet_store_item");
        assert_eq!(derive_handler_name("get", "/users"), "get_users");
        assert_eq!(
            derive_handler_name("post", "/users/{user-id}/Activate"),
            "post_users_user_id_activate"
        );
    }

    #[test]
    fn test_extract_safety_key() {
        assert_eq!(
            extract_safety_key(Some("Class name __safety_key__(class_)")),
            Some("class_".to_string())
        );
        assert_eq!(extract_safety_key(Some("plain")), None);
        assert_eq!(extract_safety_key(None), None);
    }

    #[test]
    fn test_extract_discriminator_base_class() {
        let base = extract_discriminator_base_class(Some("__discriminator__(BasePet.pet_type)"))
            .unwrap();
        assert_eq!(base.name, "BasePet");
        assert_eq!(base.attr, "pet_type");
        assert!(extract_discriminator_base_class(Some("no marker")).is_none());
    }
}
