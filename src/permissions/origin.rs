//! Origin helpers
//!
//! The store matches origins by exact string, so callers turn whatever URL
//! the web content reported into a normalized origin first.

/// Extract the origin (scheme + host + port) from a URL string.
///
/// Uses the WHATWG URL rules from the `url` crate, so the result is
/// normalized: scheme and host lowercased, default ports stripped,
/// userinfo, path, query and fragment dropped. Returns `None` for
/// malformed URLs and for opaque origins (`file:`, `data:`, `about:`).
pub fn extract_origin(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw.trim()).ok()?;
    let serialized = parsed.origin().ascii_serialization();
    // Opaque origins serialize as "null"
    if serialized == "null" {
        return None;
    }
    Some(serialized)
}

/// The strings a configured trusted entry matches.
///
/// Always the entry verbatim, plus the origin it stands for when that
/// differs (`https://example2.com/2` also trusts `https://example2.com`).
pub fn trusted_forms(raw: &str) -> Vec<String> {
    let mut forms = vec![raw.to_string()];
    if let Some(origin) = extract_origin(raw) {
        if origin != raw {
            forms.push(origin);
        }
    }
    forms
}
