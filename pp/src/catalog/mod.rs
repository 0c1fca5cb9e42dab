//! File catalog
//!
//! The catalog is the ordered listing of directories and candidate files under
//! a base directory. It is produced by [`scan`] and replaced wholesale on every
//! re-scan; nothing mutates a catalog in place.

mod config;
mod error;
mod scanner;

pub use config::{DEFAULT_EXTENSIONS, ScanConfig};
pub use error::CatalogError;
pub use scanner::scan;

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

/// A single directory or file discovered by a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Path relative to the base directory, `/`-separated
    pub path: String,
    /// Whether this entry is a directory
    pub is_dir: bool,
    /// Lowercased extension (empty for directories)
    pub extension: String,
}

impl CatalogEntry {
    /// Create a directory entry
    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_dir: true,
            extension: String::new(),
        }
    }

    /// Create a file entry, deriving the extension from the path
    pub fn file(path: impl Into<String>) -> Self {
        let path = path.into();
        let extension = file_extension(&path);
        Self {
            path,
            is_dir: false,
            extension,
        }
    }

    /// Final path component
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Number of `/`-separated components above this entry
    pub fn depth(&self) -> usize {
        self.path.matches('/').count()
    }
}

/// Lowercased suffix after the last dot of the final path component
///
/// Dotfiles such as `.env` report the name after the dot, matching what a
/// user would call the file's type.
pub(crate) fn file_extension(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    }
}

/// Order relative paths component by component
///
/// Every directory's children sort directly after it.
fn path_order(a: &str, b: &str) -> Ordering {
    a.split('/').cmp(b.split('/'))
}

/// The ordered result of scanning a base directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    base: PathBuf,
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Build a catalog, sorting entries by path component
    pub fn new(base: impl Into<PathBuf>, mut entries: Vec<CatalogEntry>) -> Self {
        entries.sort_by(|a, b| path_order(&a.path, &b.path));
        entries.dedup_by(|a, b| a.path == b.path);
        let base = base.into();
        debug!(?base, entries = entries.len(), "Catalog::new: called");
        Self { base, entries }
    }

    /// The directory this catalog was scanned from
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// All entries in path order
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by its relative path
    pub fn get(&self, path: &str) -> Option<&CatalogEntry> {
        self.entries
            .binary_search_by(|e| path_order(&e.path, path))
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// File entries only, in path order
    pub fn files(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| !e.is_dir)
    }

    pub fn file_count(&self) -> usize {
        self.files().count()
    }

    /// Files directly or transitively beneath a directory entry
    pub fn files_under<'a>(&'a self, dir: &str) -> impl Iterator<Item = &'a CatalogEntry> + 'a {
        let prefix = format!("{}/", dir);
        self.files().filter(move |e| e.path.starts_with(&prefix))
    }

    /// Absolute filesystem path for a relative catalog path
    pub fn absolute(&self, path: &str) -> PathBuf {
        path.split('/').fold(self.base.clone(), |acc, part| acc.join(part))
    }

    /// Relative paths of every entry, in order
    pub fn paths(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.path.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog::new(
            "/base",
            vec![
                CatalogEntry::file("src/main.rs"),
                CatalogEntry::dir("src"),
                CatalogEntry::file("README.md"),
                CatalogEntry::dir("src/util"),
                CatalogEntry::file("src/util/io.rs"),
            ],
        )
    }

    #[test]
    fn test_entries_sorted_by_path() {
        let catalog = sample();
        assert_eq!(
            catalog.paths(),
            vec!["README.md", "src", "src/main.rs", "src/util", "src/util/io.rs"]
        );
    }

    #[test]
    fn test_get_and_contains() {
        let catalog = sample();
        assert!(catalog.get("src").unwrap().is_dir);
        assert_eq!(catalog.get("src/main.rs").unwrap().extension, "rs");
        assert!(!catalog.contains("src/lib.rs"));
    }

    #[test]
    fn test_files_under_is_transitive() {
        let catalog = sample();
        let under: Vec<_> = catalog.files_under("src").map(|e| e.path.as_str()).collect();
        assert_eq!(under, vec!["src/main.rs", "src/util/io.rs"]);
        assert_eq!(catalog.files_under("src/util").count(), 1);
    }

    #[test]
    fn test_files_under_does_not_match_sibling_prefix() {
        let catalog = Catalog::new(
            "/base",
            vec![CatalogEntry::dir("src"), CatalogEntry::file("src2/a.rs"), CatalogEntry::file("src/b.rs")],
        );
        let under: Vec<_> = catalog.files_under("src").map(|e| e.path.as_str()).collect();
        assert_eq!(under, vec!["src/b.rs"]);
    }

    #[test]
    fn test_children_follow_their_directory() {
        let catalog = Catalog::new(
            "/base",
            vec![
                CatalogEntry::file("a-b.py"),
                CatalogEntry::file("a/x.py"),
                CatalogEntry::dir("a"),
                CatalogEntry::file("a.py"),
            ],
        );
        assert_eq!(catalog.paths(), vec!["a", "a/x.py", "a-b.py", "a.py"]);
        assert!(catalog.contains("a-b.py"));
        assert!(catalog.contains("a/x.py"));
        assert!(catalog.contains("a.py"));
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("a/b/Main.PY"), "py");
        assert_eq!(file_extension(".env"), "env");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension("Makefile"), "");
        assert_eq!(file_extension("dir.d/Makefile"), "");
        assert_eq!(file_extension("trailing."), "");
    }

    #[test]
    fn test_entry_name_and_depth() {
        let entry = CatalogEntry::file("src/util/io.rs");
        assert_eq!(entry.name(), "io.rs");
        assert_eq!(entry.depth(), 2);
    }
}
