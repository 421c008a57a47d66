//! JSON Pointer (RFC 6901) formatting.
//!
//! json-lossless reports round-trip mismatches as JSON Pointers built from
//! unescaped path steps.
//!
//! # Example
//!
//! ```
//! use json_lossless_pointer::format_json_pointer;
//!
//! assert_eq!(format_json_pointer(&["address", "city"]), "/address/city");
//! ```

/// Escapes a JSON Pointer path component.
///
/// Per RFC 6901, `/` is replaced with `~1` and `~` is replaced with `~0`.
///
/// # Example
///
/// ```
/// use json_lossless_pointer::escape_component;
///
/// assert_eq!(escape_component("a~b"), "a~0b");
/// assert_eq!(escape_component("c/d"), "c~1d");
/// assert_eq!(escape_component("no-escapes"), "no-escapes");
/// ```
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    // ~ first, or the ~ of ~1 would be escaped again
    component.replace('~', "~0").replace('/', "~1")
}

/// Formats unescaped path components into a JSON Pointer.
///
/// Returns an empty string for the root path.
///
/// # Example
///
/// ```
/// use json_lossless_pointer::format_json_pointer;
///
/// assert_eq!(format_json_pointer::<String>(&[]), "");
/// assert_eq!(format_json_pointer(&["a/b", "0"]), "/a~1b/0");
/// ```
pub fn format_json_pointer<S: AsRef<str>>(path: &[S]) -> String {
    let mut out = String::new();
    for component in path {
        out.push('/');
        out.push_str(&escape_component(component.as_ref()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_component() {
        assert_eq!(escape_component("foo"), "foo");
        assert_eq!(escape_component("a~b/c"), "a~0b~1c");
        assert_eq!(escape_component("~1"), "~01");
    }

    #[test]
    fn test_format_root_and_empty_key() {
        assert_eq!(format_json_pointer::<&str>(&[]), "");
        assert_eq!(format_json_pointer(&[""]), "/");
        assert_eq!(format_json_pointer(&["", ""]), "//");
    }
}
