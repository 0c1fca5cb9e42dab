//! PromptPack configuration types and loading

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::ScanConfig;
use crate::estimate::EstimateConfig;
use crate::prompts::{PromptComposer, TemplateError, TemplateSet};
use crate::watcher::WatcherConfig;

/// Project-local config file name
pub const LOCAL_CONFIG: &str = ".promptpack.yml";

/// Main PromptPack configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Catalog scanning
    pub scan: ScanConfig,

    /// Change watching
    pub watch: WatcherConfig,

    /// Token estimation and difficulty levels
    pub estimate: EstimateConfig,

    /// Extra or overriding task types, name -> body with `{content}`
    #[serde(rename = "task-types")]
    pub task_types: BTreeMap<String, String>,

    /// Extra or overriding presets, name -> body
    pub presets: BTreeMap<String, String>,

    /// Handlebars layout replacing the built-in section layout
    pub layout: Option<String>,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .promptpack.yml
        let local_config = PathBuf::from(LOCAL_CONFIG);
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/promptpack/promptpack.yml
        if let Some(user_config) = Self::user_config_path()
            && user_config.exists()
        {
            match Self::load_from_file(&user_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read just the log level, before logging is set up
    ///
    /// Errors are swallowed; the full load reports them once logging works.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let candidates: Vec<PathBuf> = match config_path {
            Some(path) => vec![path.clone()],
            None => std::iter::once(PathBuf::from(LOCAL_CONFIG))
                .chain(Self::user_config_path())
                .collect(),
        };
        candidates
            .iter()
            .find(|p| p.exists())
            .and_then(|p| Self::load_from_file(p).ok())
            .and_then(|c| c.log_level)
    }

    fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("promptpack").join("promptpack.yml"))
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Built-in templates overlaid with the configured ones
    pub fn templates(&self) -> TemplateSet {
        TemplateSet::with_overrides(&self.task_types, &self.presets)
    }

    /// A composer using the configured templates, layout and estimator
    pub fn composer(&self) -> std::result::Result<PromptComposer, TemplateError> {
        match &self.layout {
            Some(layout) => PromptComposer::with_layout(self.templates(), self.estimate.clone(), layout),
            None => PromptComposer::new(self.templates(), self.estimate.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::EstimatorKind;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.log_level.is_none());
        assert!(config.scan.extensions.iter().any(|e| e == "rs"));
        assert_eq!(config.watch.debounce_ms, 300);
        assert_eq!(config.estimate.budget, 128_000);
        assert!(config.task_types.is_empty());
        assert!(config.layout.is_none());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
log-level: debug

scan:
  extensions: [rs, toml]
  include-hidden: true
  exclude-dirs: [target]

watch:
  debounce-ms: 1000

estimate:
  estimator: chars
  budget: 200000

task-types:
  docs: "Write docs for:\n{content}"

presets:
  terse: "One paragraph max."
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.scan.extensions, vec!["rs", "toml"]);
        assert!(config.scan.include_hidden);
        assert_eq!(config.scan.exclude_dirs, vec!["target"]);
        assert_eq!(config.watch.debounce_ms, 1000);
        assert_eq!(config.estimate.estimator, EstimatorKind::Chars);
        assert_eq!(config.estimate.budget, 200_000);
        assert_eq!(config.task_types["docs"], "Write docs for:\n{content}");
        assert_eq!(config.presets["terse"], "One paragraph max.");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
watch:
  enabled: false
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert!(!config.watch.enabled);

        // Defaults for unspecified
        assert_eq!(config.watch.debounce_ms, 300);
        assert_eq!(config.scan, ScanConfig::default());
        assert_eq!(config.estimate.difficulty.hard_files, 6);
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pp.yml");
        fs::write(&path, "log-level: warn\nestimate:\n  budget: 42\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.estimate.budget, 42);
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_explicit_path_missing_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load_log_level(Some(&path)).is_none());
    }

    #[test]
    fn test_templates_include_overrides() {
        let mut config = Config::default();
        config.task_types.insert("docs".to_string(), "Docs {content}".to_string());
        let templates = config.templates();
        assert!(templates.task_type("docs").is_ok());
        assert!(templates.task_type("bugfix").is_ok());
    }

    #[test]
    fn test_composer_rejects_bad_layout() {
        let config = Config {
            layout: Some("{{#if}}".to_string()),
            ..Default::default()
        };
        assert!(config.composer().is_err());
    }
}
