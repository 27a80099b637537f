//! IRI classification and resolution helpers

use oxiri::Iri;

/// Returns true if the string starts with an RFC 3986 scheme followed by `:`.
pub fn is_absolute(iri: &str) -> bool {
    match iri.find(':') {
        Some(colon) => {
            let scheme = &iri[..colon];
            !scheme.is_empty()
                && scheme.as_bytes()[0].is_ascii_alphabetic()
                && scheme
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'-' || b == b'.')
        }
        None => false,
    }
}

/// Split a compact IRI (`prefix:suffix`) into its parts.
///
/// Absolute IRIs with an authority (`http://...`) are not compact IRIs.
pub fn split_compact(value: &str) -> Option<(&str, &str)> {
    let (prefix, suffix) = value.split_once(':')?;
    if prefix.is_empty() || prefix.contains('/') || suffix.starts_with("//") {
        return None;
    }
    Some((prefix, suffix))
}

/// JSON-LD keywords recognized by the translator
pub fn is_keyword(value: &str) -> bool {
    matches!(
        value,
        "@base"
            | "@container"
            | "@context"
            | "@direction"
            | "@graph"
            | "@id"
            | "@import"
            | "@included"
            | "@index"
            | "@json"
            | "@language"
            | "@list"
            | "@nest"
            | "@none"
            | "@prefix"
            | "@propagate"
            | "@protected"
            | "@reverse"
            | "@set"
            | "@type"
            | "@value"
            | "@version"
            | "@vocab"
    )
}

/// Resolve a relative IRI reference against a base IRI
pub fn resolve(base: &str, relative: &str) -> Option<String> {
    let base = Iri::parse(base.to_string()).ok()?;
    base.resolve(relative).ok().map(|iri| iri.into_inner())
}
