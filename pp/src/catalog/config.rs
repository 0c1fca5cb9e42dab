//! Scan configuration

use serde::{Deserialize, Serialize};

/// Extensions picked up when no configuration overrides them
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "py", "js", "ts", "svelte", "css", "html", "json", "txt", "md", "xml", "yml", "yaml", "sql", "jsx", "tsx", "php",
    "rb", "java", "c", "cpp", "cs", "sh", "bash", "go", "rs", "swift", "kt", "r", "dart", "scala", "ini", "env",
    "toml", "scss", "less", "pl", "lua", "ps1", "vb", "bat", "coffee",
];

/// Configuration for the catalog scanner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Supported file extensions (case-insensitive, leading dot optional)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Include entries whose name starts with a dot
    #[serde(default, rename = "include-hidden")]
    pub include_hidden: bool,

    /// Directory names skipped wherever they appear
    #[serde(default, rename = "exclude-dirs")]
    pub exclude_dirs: Vec<String>,

    /// Follow symbolic links while walking
    #[serde(default, rename = "follow-links")]
    pub follow_links: bool,
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            include_hidden: false,
            exclude_dirs: Vec::new(),
            follow_links: false,
        }
    }
}

impl ScanConfig {
    /// Whether a file with this extension belongs in the catalog
    pub fn accepts_extension(&self, extension: &str) -> bool {
        !extension.is_empty()
            && self
                .extensions
                .iter()
                .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }

    /// Whether a directory entry with this name is pruned from the walk
    pub fn skips_name(&self, name: &str, is_dir: bool) -> bool {
        if !self.include_hidden && name.starts_with('.') {
            return true;
        }
        is_dir && self.exclude_dirs.iter().any(|d| d == name)
    }

    /// Whether any component of a relative path is hidden or excluded
    pub fn skips_relative(&self, relative: &str) -> bool {
        let parts: Vec<&str> = relative.split('/').filter(|p| !p.is_empty()).collect();
        let last = parts.len().saturating_sub(1);
        parts
            .iter()
            .enumerate()
            .any(|(i, part)| self.skips_name(part, i < last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert_eq!(config.extensions.len(), DEFAULT_EXTENSIONS.len());
        assert!(!config.include_hidden);
        assert!(config.exclude_dirs.is_empty());
        assert!(!config.follow_links);
    }

    #[test]
    fn test_accepts_extension_case_insensitive() {
        let config = ScanConfig {
            extensions: vec![".PY".to_string(), "rs".to_string()],
            ..Default::default()
        };
        assert!(config.accepts_extension("py"));
        assert!(config.accepts_extension("rs"));
        assert!(!config.accepts_extension("js"));
        assert!(!config.accepts_extension(""));
    }

    #[test]
    fn test_skips_hidden_and_excluded() {
        let config = ScanConfig {
            exclude_dirs: vec!["node_modules".to_string()],
            ..Default::default()
        };
        assert!(config.skips_name(".git", true));
        assert!(config.skips_name(".env", false));
        assert!(config.skips_name("node_modules", true));
        assert!(!config.skips_name("node_modules", false));
        assert!(!config.skips_name("src", true));
    }

    #[test]
    fn test_skips_relative() {
        let config = ScanConfig {
            exclude_dirs: vec!["target".to_string()],
            ..Default::default()
        };
        assert!(config.skips_relative(".git/HEAD"));
        assert!(config.skips_relative("target/debug/build.rs"));
        assert!(!config.skips_relative("src/target.rs"));
        assert!(!config.skips_relative("src/main.rs"));
    }

    #[test]
    fn test_include_hidden() {
        let config = ScanConfig {
            include_hidden: true,
            ..Default::default()
        };
        assert!(!config.skips_name(".github", true));
    }
}
