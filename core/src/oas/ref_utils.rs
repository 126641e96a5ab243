#![deny(missing_docs)]

//! # Reference Utilities
//!
//! Helpers for splitting `$ref` strings and decoding JSON Pointer segments.
//!
//! External documents are never fetched: a reference with a document part is
//! only usable when that part names the current document through `$self`.

use percent_encoding::percent_decode_str;
use std::path::Path;
use url::Url;

/// Splits a reference into its document part and optional fragment (without `#`).
pub(crate) fn split_reference(ref_str: &str) -> (&str, Option<&str>) {
    match ref_str.split_once('#') {
        Some((document, fragment)) => (document, Some(fragment)),
        None => (ref_str, None),
    }
}

/// Normalizes a `$ref` to a local JSON Pointer (e.g. `#/components/...`).
///
/// Returns `None` if the reference is external or lacks a fragment.
pub(crate) fn normalize_ref_to_local(ref_str: &str, self_uri: Option<&str>) -> Option<String> {
    let (document, fragment) = split_reference(ref_str);
    let fragment = fragment?;
    if document.is_empty() {
        return Some(format!("#{}", fragment));
    }

    let self_uri = self_uri?;
    if ref_doc_matches_self(document, self_uri) {
        return Some(format!("#{}", fragment));
    }
    None
}

/// Decodes a JSON Pointer segment (handles `~1`, `~0` and percent-encoding).
pub(crate) fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}

fn ref_doc_matches_self(ref_doc: &str, self_uri: &str) -> bool {
    if ref_doc == self_uri {
        return true;
    }

    if let (Ok(ref_url), Ok(self_url)) = (Url::parse(ref_doc), Url::parse(self_uri)) {
        return ref_url.scheme() == self_url.scheme()
            && ref_url.host() == self_url.host()
            && ref_url.port() == self_url.port()
            && ref_url.path() == self_url.path();
    }

    // `$self` given as an absolute path (e.g. "/api/openapi.yaml").
    if self_uri.starts_with('/') {
        if let Ok(ref_url) = Url::parse(ref_doc) {
            return ref_url.path() == self_uri;
        }
    }

    if !self_uri.contains("://") && !ref_doc.contains("://") {
        return Path::new(ref_doc) == Path::new(self_uri);
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_ref_local_passthrough() {
        let normalized = normalize_ref_to_local("#/components/schemas/User", None).unwrap();
        assert_eq!(normalized, "#/components/schemas/User");
    }

    #[test]
    fn test_normalize_ref_self_absolute_match() {
        let self_uri = Some("https://example.com/openapi.yaml");
        let ref_str = "https://example.com/openapi.yaml#/components/schemas/User";
        let normalized = normalize_ref_to_local(ref_str, self_uri).unwrap();
        assert_eq!(normalized, "#/components/schemas/User");
    }

    #[test]
    fn test_normalize_ref_self_path_match() {
        let self_uri = Some("/api/openapi.yaml");
        let ref_str = "https://example.com/api/openapi.yaml#/components/schemas/User";
        let normalized = normalize_ref_to_local(ref_str, self_uri).unwrap();
        assert_eq!(normalized, "#/components/schemas/User");
    }

    #[test]
    fn test_normalize_ref_external_is_rejected() {
        assert!(normalize_ref_to_local("other.yaml#/components/schemas/User", None).is_none());
        assert!(normalize_ref_to_local(
            "other.yaml#/components/schemas/User",
            Some("openapi.yaml")
        )
        .is_none());
        assert!(normalize_ref_to_local("openapi.yaml", Some("openapi.yaml")).is_none());
    }

    #[test]
    fn test_decode_pointer_segment_percent_encoding() {
        let encoded = "User%20Profile~1details";
        let decoded = decode_pointer_segment(encoded);
        assert_eq!(decoded, "User Profile/details");
    }
}
