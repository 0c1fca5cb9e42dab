//! Directory walker that produces a [`Catalog`]

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

use super::{Catalog, CatalogEntry, CatalogError, ScanConfig};

/// Scan a base directory into a catalog
///
/// Directories are listed whenever they are not hidden or excluded; files are
/// listed only when their extension is supported. Entries come back sorted by
/// path component, so scanning an unchanged tree twice yields equal catalogs.
///
/// Unreadable subdirectories are skipped with a warning; only an unreadable
/// or missing base directory fails the scan.
pub fn scan(base: &Path, config: &ScanConfig) -> Result<Catalog, CatalogError> {
    debug!(?base, "scan: called");

    let metadata = fs::metadata(base).map_err(|e| CatalogError::from_io(base, e))?;
    if !metadata.is_dir() {
        debug!(?base, "scan: base is not a directory");
        return Err(CatalogError::DirectoryNotFound {
            path: base.to_path_buf(),
        });
    }
    fs::read_dir(base).map_err(|e| CatalogError::from_io(base, e))?;

    let walker = WalkDir::new(base)
        .follow_links(config.follow_links)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !is_pruned(e, config));

    let mut entries = Vec::new();
    for item in walker {
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                if err.depth() == 0
                    && let Some(io) = err.io_error()
                {
                    return Err(CatalogError::from_io(base, std::io::Error::new(io.kind(), io.to_string())));
                }
                warn!(path = ?err.path(), error = %err, "Skipping unreadable entry");
                continue;
            }
        };

        let Some(relative) = relative_path(base, entry.path()) else {
            debug!(path = ?entry.path(), "scan: entry outside base, skipping");
            continue;
        };

        if entry.file_type().is_dir() {
            entries.push(CatalogEntry::dir(relative));
        } else if entry.file_type().is_file() {
            let candidate = CatalogEntry::file(relative);
            if config.accepts_extension(&candidate.extension) {
                entries.push(candidate);
            }
        } else {
            debug!(path = ?entry.path(), "scan: skipping special file");
        }
    }

    let catalog = Catalog::new(base, entries);
    info!(
        base = %base.display(),
        entries = catalog.len(),
        files = catalog.file_count(),
        "Scan complete"
    );
    Ok(catalog)
}

fn is_pruned(entry: &DirEntry, config: &ScanConfig) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    config.skips_name(&name, entry.file_type().is_dir())
}

/// `/`-joined path of `path` relative to `base`
fn relative_path(base: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(base).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() { None } else { Some(parts.join("/")) }
}
