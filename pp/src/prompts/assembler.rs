//! Prompt assembly
//!
//! Each selected file becomes one block:
//!
//! ```text
//! FILE {relative path}:
//! {content}
//! ```
//!
//! followed by a newline. Blocks are joined with a blank line in catalog
//! order, then substituted into the task type's `{content}` placeholder.

use std::fs;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::TaskTypeTemplate;
use super::error::FileUnreadable;
use crate::catalog::Catalog;
use crate::selection::SelectionState;

/// Result of assembling a selection into a template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Assembly {
    /// The rendered template
    pub text: String,
    /// Paths whose content made it into `text`, in catalog order
    pub included: Vec<String>,
    /// Selected paths that could not be read, in catalog order
    pub skipped: Vec<String>,
}

/// Format a single file block
pub fn file_block(path: &str, content: &str) -> String {
    format!("FILE {}:\n{}\n", path, content)
}

/// Read every selected file and render them into `template`
///
/// Unreadable files (deleted since selection, not UTF-8, permission denied)
/// are skipped and reported; assembly itself never fails.
pub fn assemble(catalog: &Catalog, selection: &SelectionState, template: &TaskTypeTemplate) -> Assembly {
    debug!(template = %template.name, selected = selection.len(), "assemble: called");
    let blocks = read_blocks(catalog, selection);
    let text = template.render(&blocks.text);
    info!(
        template = %template.name,
        included = blocks.included.len(),
        skipped = blocks.skipped.len(),
        "Assembled prompt"
    );
    Assembly { text, ..blocks }
}

/// Joined file blocks for the selection, before any template is applied
pub(crate) fn read_blocks(catalog: &Catalog, selection: &SelectionState) -> Assembly {
    let mut blocks = Vec::new();
    let mut included = Vec::new();
    let mut skipped = Vec::new();

    for entry in catalog.files().filter(|e| selection.contains(&e.path)) {
        let path = catalog.absolute(&entry.path);
        match fs::read_to_string(&path) {
            Ok(content) => {
                debug!(path = %entry.path, bytes = content.len(), "read_blocks: read file");
                blocks.push(file_block(&entry.path, &content));
                included.push(entry.path.clone());
            }
            Err(source) => {
                let err = FileUnreadable { path, source };
                warn!(error = %err, cause = %err.source, "Skipping selected file");
                skipped.push(entry.path.clone());
            }
        }
    }

    Assembly {
        text: blocks.join("\n"),
        included,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ScanConfig, scan};
    use std::path::Path;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, Catalog) {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.py"), "x").unwrap();
        fs::write(temp.path().join("b.py"), "y").unwrap();
        let catalog = scan(temp.path(), &ScanConfig::default()).unwrap();
        (temp, catalog)
    }

    fn select_all(catalog: &Catalog) -> SelectionState {
        let mut selection = SelectionState::new();
        selection.select_all(catalog);
        selection
    }

    #[test]
    fn test_assemble_two_files() {
        let (_temp, catalog) = fixture();
        let selection = select_all(&catalog);
        let template = TaskTypeTemplate::new("files", "FILES:\n{content}");

        let assembly = assemble(&catalog, &selection, &template);
        assert_eq!(assembly.text, "FILES:\nFILE a.py:\nx\n\nFILE b.py:\ny\n");
        assert_eq!(assembly.included, vec!["a.py", "b.py"]);
        assert!(assembly.skipped.is_empty());
    }

    #[test]
    fn test_assemble_empty_selection() {
        let (_temp, catalog) = fixture();
        let template = TaskTypeTemplate::new("files", "FILES:\n{content}");
        let assembly = assemble(&catalog, &SelectionState::new(), &template);
        assert_eq!(assembly.text, "FILES:\n");
        assert!(assembly.included.is_empty());
        assert!(assembly.skipped.is_empty());
    }

    #[test]
    fn test_assemble_skips_deleted_file() {
        let (temp, catalog) = fixture();
        let selection = select_all(&catalog);
        fs::remove_file(temp.path().join("a.py")).unwrap();

        let template = TaskTypeTemplate::new("files", "FILES:\n{content}");
        let assembly = assemble(&catalog, &selection, &template);
        assert_eq!(assembly.text, "FILES:\nFILE b.py:\ny\n");
        assert_eq!(assembly.included, vec!["b.py"]);
        assert_eq!(assembly.skipped, vec!["a.py"]);
    }

    #[test]
    fn test_assemble_skips_non_utf8_file() {
        let (temp, _) = fixture();
        fs::write(temp.path().join("c.txt"), [0xff, 0xfe, 0x00]).unwrap();
        let catalog = scan(temp.path(), &ScanConfig::default()).unwrap();
        let selection = select_all(&catalog);

        let assembly = assemble(&catalog, &selection, &TaskTypeTemplate::bare());
        assert_eq!(assembly.skipped, vec!["c.txt"]);
        assert_eq!(assembly.included.len(), 2);
    }

    #[test]
    fn test_assemble_nested_paths_in_catalog_order() {
        let temp = TempDir::new().unwrap();
        let write = |rel: &str, content: &str| {
            let path = temp.path().join(rel);
            fs::create_dir_all(path.parent().unwrap_or(Path::new("."))).unwrap();
            fs::write(path, content).unwrap();
        };
        write("z.rs", "z");
        write("src/m.rs", "m");
        write("a.rs", "a");
        let catalog = scan(temp.path(), &ScanConfig::default()).unwrap();
        let selection = select_all(&catalog);

        let assembly = assemble(&catalog, &selection, &TaskTypeTemplate::bare());
        assert_eq!(assembly.included, vec!["a.rs", "src/m.rs", "z.rs"]);
        assert!(assembly.text.starts_with("FILE a.rs:\na\n\nFILE src/m.rs:\nm\n"));
    }

    #[test]
    fn test_file_block_format() {
        assert_eq!(file_block("dir/x.rs", "fn main() {}"), "FILE dir/x.rs:\nfn main() {}\n");
    }
}
