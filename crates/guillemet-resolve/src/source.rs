//! Filesystem seam for the resolver
//!
//! The resolver only ever needs two operations: list the entries of a
//! directory and read one file's bytes. Anything that can do both may
//! back a template tree, which keeps the walker testable without
//! touching a real disk.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// One directory entry as seen by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub is_dir: bool,
}

/// Errors raised by a template source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no such path: {path}")]
    NotFound { path: String },

    #[error("failed to access {path}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Read-only access to a template tree.
///
/// Paths are slash-separated and relative to the source's own root.
pub trait Source {
    /// Lists the entries directly under `dir`. A missing directory is
    /// reported as [`SourceError::NotFound`], not an empty listing.
    fn list(&self, dir: &str) -> Result<Vec<Entry>, SourceError>;

    /// Reads the bytes of the file at `path`.
    fn read(&self, path: &str) -> Result<Vec<u8>, SourceError>;
}

/// [`Source`] backed by the local filesystem.
#[derive(Debug, Clone)]
pub struct DiskSource {
    root: PathBuf,
}

impl DiskSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn full(&self, rel: &str) -> PathBuf {
        if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(rel)
        }
    }

    fn wrap(path: &Path, err: io::Error) -> SourceError {
        if err.kind() == io::ErrorKind::NotFound {
            SourceError::NotFound {
                path: path.display().to_string(),
            }
        } else {
            SourceError::Io {
                path: path.display().to_string(),
                source: err,
            }
        }
    }
}

impl Default for DiskSource {
    fn default() -> Self {
        Self::new(".")
    }
}

impl Source for DiskSource {
    fn list(&self, dir: &str) -> Result<Vec<Entry>, SourceError> {
        let full = self.full(dir);
        let mut entries = Vec::new();
        for entry in fs::read_dir(&full).map_err(|e| Self::wrap(&full, e))? {
            let entry = entry.map_err(|e| Self::wrap(&full, e))?;
            let file_type = entry.file_type().map_err(|e| Self::wrap(&full, e))?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                // Non-UTF-8 names can never match a logical name.
                continue;
            };
            entries.push(Entry {
                name,
                is_dir: file_type.is_dir(),
            });
        }
        // Stable order keeps walks and error messages deterministic.
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        let full = self.full(path);
        fs::read(&full).map_err(|e| Self::wrap(&full, e))
    }
}

/// In-memory [`Source`] for tests and embedded template sets.
#[derive(Debug, Clone, Default)]
pub struct MemSource {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file at a slash-separated relative path, creating all
    /// implied parent directories.
    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }

    /// Builder form of [`MemSource::insert`].
    pub fn with(mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.insert(path, contents);
        self
    }

    fn is_dir(&self, dir: &str) -> bool {
        let prefix = format!("{dir}/");
        self.files.keys().any(|k| k.starts_with(&prefix))
    }
}

impl Source for MemSource {
    fn list(&self, dir: &str) -> Result<Vec<Entry>, SourceError> {
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{dir}/")
        };

        let mut entries: Vec<Entry> = Vec::new();
        for key in self.files.keys() {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((child, _)) => {
                    let entry = Entry {
                        name: child.to_string(),
                        is_dir: true,
                    };
                    if !entries.contains(&entry) {
                        entries.push(entry);
                    }
                }
                None if !rest.is_empty() => entries.push(Entry {
                    name: rest.to_string(),
                    is_dir: false,
                }),
                None => {}
            }
        }

        if entries.is_empty() && !dir.is_empty() && !self.is_dir(dir) {
            return Err(SourceError::NotFound {
                path: dir.to_string(),
            });
        }
        Ok(entries)
    }

    fn read(&self, path: &str) -> Result<Vec<u8>, SourceError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                path: path.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn mem_source_lists_children() {
        let src = MemSource::new()
            .with("pages/index.html.tmpl", "x")
            .with("pages/shop/index.html.tmpl", "y")
            .with("layout.html.tmpl", "z");

        let top = src.list("").unwrap();
        assert_eq!(
            top,
            vec![
                Entry { name: "layout.html.tmpl".into(), is_dir: false },
                Entry { name: "pages".into(), is_dir: true },
            ]
        );

        let pages = src.list("pages").unwrap();
        assert_eq!(
            pages,
            vec![
                Entry { name: "index.html.tmpl".into(), is_dir: false },
                Entry { name: "shop".into(), is_dir: true },
            ]
        );
    }

    #[test]
    fn mem_source_missing_dir_is_not_found() {
        let src = MemSource::new().with("a/b.txt", "x");
        assert!(matches!(
            src.list("missing"),
            Err(SourceError::NotFound { .. })
        ));
    }

    #[test]
    fn mem_source_read() {
        let src = MemSource::new().with("a/b.txt", "hello");
        assert_eq!(src.read("a/b.txt").unwrap(), b"hello");
        assert!(matches!(
            src.read("a/missing.txt"),
            Err(SourceError::NotFound { .. })
        ));
    }
}
