//! # Guillemet Resolve
//!
//! File resolution for wildcard-capable template namespaces:
//! - Literal segments (`shop/cart`)
//! - Named wildcards (`{id}`, `{id.int64}`) on any path segment
//! - Implicit per-directory `index` files
//!
//! Given a logical name, a root directory and a file extension, the
//! resolver walks the matching subtree of the root, collects every
//! structurally matching file, and disambiguates segment by segment:
//! an exact literal always wins over a wildcard, and two wildcard
//! siblings competing at the same position are a fatal configuration
//! error, never silently ranked.
//!
//! Captured wildcard values are returned raw; typing of `{name.type}`
//! captures is the caller's concern.
//!
//! ## Example
//!
//! ```
//! use guillemet_resolve::{resolve, MemSource};
//!
//! let src = MemSource::new()
//!     .with("pages/products/{id.int}/reviews.html.tmpl", "...");
//!
//! let hit = resolve(&src, "pages", "products/42/reviews", ".html.tmpl").unwrap();
//! assert_eq!(hit.path, "products/{id.int}/reviews.html.tmpl");
//! assert_eq!(hit.params, vec![("id.int".to_string(), "42".to_string())]);
//! ```

use thiserror::Error;
use tracing::{debug, warn};

pub mod path;
mod source;
mod tree;

pub use source::{DiskSource, Entry, MemSource, Source, SourceError};

use path::{extended_extension, is_wildcard, segments, wildcard_spec};
use tree::SegmentTree;

/// A concrete file located for a logical name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Path of the matched file relative to the queried root,
    /// extension included. Wildcard segments appear verbatim, braces
    /// and all, because that is what the file is called on disk.
    pub path: String,
    /// Whether the match went through a per-directory `index` file.
    pub is_index: bool,
    /// Captured wildcard values, in path order: the wildcard spec
    /// without braces (`id` or `id.int`) paired with the raw query
    /// segment that stood in for it.
    pub params: Vec<(String, String)>,
}

/// Resolution failures.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No file under the root structurally matches the logical name.
    #[error("no template file found in the directory {dir} matching the filename {filename}")]
    NotFound { dir: String, filename: String },

    /// Two or more wildcard candidates compete for the same segment
    /// position. This is a defect in the template tree, not in the
    /// query.
    #[error(
        "ambiguous wildcard match in {dir} at segment {segment:?}: \
         competing candidates {candidates:?}"
    )]
    Ambiguous {
        dir: String,
        segment: String,
        candidates: Vec<String>,
    },

    /// The underlying source failed for a reason other than a missing
    /// entry.
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// A structurally matching file found during the walk, decomposed into
/// segments with the extension stripped. Whether the match is an index
/// file falls out of the tree walk, so only the segments are kept.
type Candidate = Vec<String>;

/// Locates the file under `root` matching the logical `name`.
///
/// A file matches structurally when its segment count equals the
/// query's (exact arity) or exceeds it by one with a final `index`
/// segment, every literal segment equals the corresponding query
/// segment, and its extended extension equals `ext`. Non-matching
/// directory branches are pruned without being descended into.
///
/// Tie-breaks: an exact literal beats a wildcard at the same position;
/// an exact-arity file beats a deeper `index` file; sibling wildcards
/// at one position are [`ResolveError::Ambiguous`].
pub fn resolve(
    source: &dyn Source,
    root: &str,
    name: &str,
    ext: &str,
) -> Result<Resolved, ResolveError> {
    let query = segments(name);

    let mut candidates = Vec::new();
    let mut prefix = Vec::new();
    walk(source, root, &mut prefix, &query, ext, &mut candidates)?;

    let expected = if query.is_empty() {
        format!("index{ext}")
    } else {
        format!("{}{ext}", query.join("/"))
    };

    if candidates.is_empty() {
        debug!(root, name, "no template candidates under root");
        return Err(ResolveError::NotFound {
            dir: root.to_string(),
            filename: expected,
        });
    }

    let mut tree = SegmentTree::new();
    for candidate in &candidates {
        tree.insert(candidate);
    }

    let mut node = &tree;
    let mut resolved: Vec<String> = Vec::with_capacity(query.len() + 1);
    let mut params = Vec::new();
    for q in &query {
        if let Some(child) = node.literal_child(q) {
            resolved.push(q.clone());
            node = child;
            continue;
        }
        match node.sole_child() {
            Ok(Some((seg, child))) => {
                // Pruning guarantees any non-exact branch is a wildcard.
                debug_assert!(is_wildcard(seg));
                params.push((wildcard_spec(seg).to_string(), q.clone()));
                resolved.push(seg.to_string());
                node = child;
            }
            Ok(None) => {
                return Err(ResolveError::NotFound {
                    dir: root.to_string(),
                    filename: expected,
                });
            }
            Err(siblings) => {
                warn!(
                    root,
                    segment = %q,
                    ?siblings,
                    "wildcard candidates compete for one segment position"
                );
                return Err(ResolveError::Ambiguous {
                    dir: root.to_string(),
                    segment: q.clone(),
                    candidates: siblings,
                });
            }
        }
    }

    // An exact-arity file wins; otherwise fall back to the directory's
    // index file.
    let is_index = if node.is_terminal() {
        false
    } else if node
        .literal_child("index")
        .is_some_and(SegmentTree::is_terminal)
    {
        resolved.push("index".to_string());
        true
    } else {
        return Err(ResolveError::NotFound {
            dir: root.to_string(),
            filename: expected,
        });
    };

    let path = format!("{}{ext}", resolved.join("/"));
    debug!(root, name, %path, is_index, "resolved template file");
    Ok(Resolved {
        path,
        is_index,
        params,
    })
}

/// Recursive pruned walk. `prefix` is the segment stack of the current
/// directory relative to the root.
fn walk(
    source: &dyn Source,
    root: &str,
    prefix: &mut Vec<String>,
    query: &[String],
    ext: &str,
    out: &mut Vec<Candidate>,
) -> Result<(), ResolveError> {
    let depth = prefix.len();
    let dir = if prefix.is_empty() {
        root.to_string()
    } else {
        format!("{root}/{}", prefix.join("/"))
    };

    let entries = match source.list(&dir) {
        Ok(entries) => entries,
        // A missing root simply yields no candidates.
        Err(SourceError::NotFound { .. }) => return Ok(()),
        Err(err) => return Err(err.into()),
    };

    for entry in entries {
        if entry.is_dir {
            // Descend only into branches that can still match: an
            // exact literal or a wildcard, and only while query
            // segments remain (an index file may sit one level below
            // the final query segment).
            if depth < query.len() && (entry.name == query[depth] || is_wildcard(&entry.name)) {
                prefix.push(entry.name);
                walk(source, root, prefix, query, ext, out)?;
                prefix.pop();
            }
            continue;
        }

        let fext = extended_extension(&entry.name);
        if fext != ext {
            continue;
        }
        let stem = &entry.name[..entry.name.len() - fext.len()];
        if stem.is_empty() {
            continue;
        }

        if depth == query.len() {
            if stem == "index" {
                let mut segs = prefix.clone();
                segs.push(stem.to_string());
                out.push(segs);
            }
        } else if depth + 1 == query.len() && (stem == query[depth] || is_wildcard(stem)) {
            let mut segs = prefix.clone();
            segs.push(stem.to_string());
            out.push(segs);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EXT: &str = ".html.tmpl";

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn literal_name_resolves_unchanged() {
        let src = MemSource::new()
            .with("pages/shop/cart.html.tmpl", "")
            .with("pages/shop/checkout.html.tmpl", "");

        let hit = resolve(&src, "pages", "shop/cart", EXT).unwrap();
        assert_eq!(hit.path, "shop/cart.html.tmpl");
        assert!(!hit.is_index);
        assert!(hit.params.is_empty());
    }

    #[test]
    fn lone_wildcard_captures_segment() {
        let src = MemSource::new().with("pages/users/{name}.html.tmpl", "");

        let hit = resolve(&src, "pages", "users/ada", EXT).unwrap();
        assert_eq!(hit.path, "users/{name}.html.tmpl");
        assert_eq!(hit.params, params(&[("name", "ada")]));
    }

    #[test]
    fn typed_wildcard_spec_is_captured_verbatim() {
        let src = MemSource::new().with("pages/products/{id.int}/reviews.html.tmpl", "");

        let hit = resolve(&src, "pages", "products/42/reviews", EXT).unwrap();
        assert_eq!(hit.path, "products/{id.int}/reviews.html.tmpl");
        assert_eq!(hit.params, params(&[("id.int", "42")]));
    }

    #[test]
    fn exact_literal_beats_wildcard_sibling() {
        let src = MemSource::new()
            .with("pages/users/admin.html.tmpl", "")
            .with("pages/users/{name}.html.tmpl", "");

        let hit = resolve(&src, "pages", "users/admin", EXT).unwrap();
        assert_eq!(hit.path, "users/admin.html.tmpl");
        assert!(hit.params.is_empty());

        let hit = resolve(&src, "pages", "users/ada", EXT).unwrap();
        assert_eq!(hit.path, "users/{name}.html.tmpl");
        assert_eq!(hit.params, params(&[("name", "ada")]));
    }

    #[test]
    fn sibling_wildcards_are_ambiguous() {
        let src = MemSource::new()
            .with("pages/{a}.html.tmpl", "")
            .with("pages/{b}.html.tmpl", "");

        let err = resolve(&src, "pages", "anything", EXT).unwrap_err();
        match err {
            ResolveError::Ambiguous {
                segment,
                candidates,
                ..
            } => {
                assert_eq!(segment, "anything");
                assert_eq!(candidates, vec!["{a}".to_string(), "{b}".to_string()]);
            }
            other => panic!("expected Ambiguous, got {other:?}"),
        }
    }

    #[test]
    fn sibling_wildcard_dirs_are_ambiguous() {
        let src = MemSource::new()
            .with("pages/{a}/view.html.tmpl", "")
            .with("pages/{b}/view.html.tmpl", "");

        assert!(matches!(
            resolve(&src, "pages", "x/view", EXT),
            Err(ResolveError::Ambiguous { .. })
        ));
    }

    #[test]
    fn index_file_fallback() {
        let src = MemSource::new().with("pages/shop/index.html.tmpl", "");

        let hit = resolve(&src, "pages", "shop", EXT).unwrap();
        assert_eq!(hit.path, "shop/index.html.tmpl");
        assert!(hit.is_index);
    }

    #[test]
    fn exact_file_beats_index_file() {
        let src = MemSource::new()
            .with("pages/shop.html.tmpl", "")
            .with("pages/shop/index.html.tmpl", "");

        let hit = resolve(&src, "pages", "shop", EXT).unwrap();
        assert_eq!(hit.path, "shop.html.tmpl");
        assert!(!hit.is_index);
    }

    #[test]
    fn root_index_matches_empty_name() {
        let src = MemSource::new().with("pages/index.html.tmpl", "");

        let hit = resolve(&src, "pages", "", EXT).unwrap();
        assert_eq!(hit.path, "index.html.tmpl");
        assert!(hit.is_index);

        let hit = resolve(&src, "pages", "/", EXT).unwrap();
        assert_eq!(hit.path, "index.html.tmpl");
    }

    #[test]
    fn wildcard_dir_with_index() {
        let src = MemSource::new().with("pages/{slug}/index.html.tmpl", "");

        let hit = resolve(&src, "pages", "hello-world", EXT).unwrap();
        assert_eq!(hit.path, "{slug}/index.html.tmpl");
        assert!(hit.is_index);
        assert_eq!(hit.params, params(&[("slug", "hello-world")]));
    }

    #[test]
    fn missing_name_is_not_found() {
        let src = MemSource::new().with("pages/shop.html.tmpl", "");

        let err = resolve(&src, "pages", "missing/deeply", EXT).unwrap_err();
        match err {
            ResolveError::NotFound { dir, filename } => {
                assert_eq!(dir, "pages");
                assert_eq!(filename, "missing/deeply.html.tmpl");
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn missing_root_is_not_found() {
        let src = MemSource::new();
        assert!(matches!(
            resolve(&src, "pages", "anything", EXT),
            Err(ResolveError::NotFound { .. })
        ));
    }

    #[test]
    fn wrong_extension_is_ignored() {
        let src = MemSource::new()
            .with("pages/shop.txt", "")
            .with("pages/shop.html", "");

        assert!(matches!(
            resolve(&src, "pages", "shop", EXT),
            Err(ResolveError::NotFound { .. })
        ));
    }

    #[test]
    fn arity_mismatch_is_not_found() {
        // A deeper file must not satisfy a shorter query, nor the
        // other way round.
        let src = MemSource::new().with("pages/a/b/c.html.tmpl", "");

        assert!(matches!(
            resolve(&src, "pages", "a/b", EXT),
            Err(ResolveError::NotFound { .. })
        ));
        assert!(matches!(
            resolve(&src, "pages", "a/b/c/d", EXT),
            Err(ResolveError::NotFound { .. })
        ));
        assert!(resolve(&src, "pages", "a/b/c", EXT).is_ok());
    }

    #[test]
    fn multiple_wildcards_in_one_path() {
        let src =
            MemSource::new().with("pages/top/{x}/mid/{y.int64}/leaf.html.tmpl", "");

        let hit = resolve(&src, "pages", "top/alpha/mid/321/leaf", EXT).unwrap();
        assert_eq!(hit.path, "top/{x}/mid/{y.int64}/leaf.html.tmpl");
        assert_eq!(hit.params, params(&[("x", "alpha"), ("y.int64", "321")]));
    }

    #[test]
    fn non_matching_branches_are_pruned() {
        // The sibling tree under `other` would be ambiguous if it were
        // ever considered; pruning must keep it out of play.
        let src = MemSource::new()
            .with("pages/shop/cart.html.tmpl", "")
            .with("pages/other/{a}.html.tmpl", "")
            .with("pages/other/{b}.html.tmpl", "");

        let hit = resolve(&src, "pages", "shop/cart", EXT).unwrap();
        assert_eq!(hit.path, "shop/cart.html.tmpl");
    }
}
