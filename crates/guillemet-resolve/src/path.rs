//! Path utilities for logical template names
//!
//! All functions here are pure: same input, same output, no filesystem
//! access.

/// Splits a logical name or relative path into its non-empty segments.
///
/// The path is cleaned first: `.` segments are dropped, `..` pops the
/// previous segment, repeated and trailing slashes collapse, and a
/// single leading slash is ignored. An empty or root path yields an
/// empty vector.
///
/// # Examples
///
/// ```
/// use guillemet_resolve::path::segments;
///
/// assert_eq!(segments("/shop/items/"), vec!["shop", "items"]);
/// assert_eq!(segments("a/./b/../c"), vec!["a", "c"]);
/// assert!(segments("/").is_empty());
/// assert!(segments("").is_empty());
/// ```
pub fn segments(path: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            s => out.push(s.to_string()),
        }
    }
    out
}

/// Returns the extended extension of the final path component.
///
/// Dot-delimited suffixes are stripped one at a time and concatenated,
/// so `page.html.tmpl` has the extended extension `.html.tmpl`.
/// Stripping stops before the stem would become empty and before a
/// wildcard-braced stem is consumed: `{id.int}.html.tmpl` yields
/// `.html.tmpl`, not `.int}.html.tmpl`.
///
/// # Examples
///
/// ```
/// use guillemet_resolve::path::extended_extension;
///
/// assert_eq!(extended_extension("layout.html.tmpl"), ".html.tmpl");
/// assert_eq!(extended_extension("pages/{id.int}.html.tmpl"), ".html.tmpl");
/// assert_eq!(extended_extension(".hidden"), "");
/// assert_eq!(extended_extension("plain"), "");
/// ```
pub fn extended_extension(path: &str) -> String {
    let base = path.rsplit('/').next().unwrap_or(path);
    let mut stem = base;
    let mut ext = String::new();
    loop {
        // Stop only on a complete braced stem. A stem that merely
        // starts with `{` still carries suffixes to strip, as in
        // `{name}.html.tmpl`.
        if is_wildcard(stem) {
            return ext;
        }
        match stem.rfind('.') {
            // A dot at index 0 means the whole component is one
            // "extension" (e.g. `.hidden`), which has none.
            Some(i) if i > 0 => {
                ext.insert_str(0, &stem[i..]);
                stem = &stem[..i];
            }
            _ => return ext,
        }
    }
}

/// Whether a segment is syntactically a wildcard, `{name}` or
/// `{name.type}`.
pub fn is_wildcard(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}')
}

/// The inner spec of a wildcard segment: `{id.int}` → `id.int`.
///
/// Callers must check [`is_wildcard`] first.
pub fn wildcard_spec(segment: &str) -> &str {
    &segment[1..segment.len() - 1]
}
