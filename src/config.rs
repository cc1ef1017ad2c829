//! Optional TOML settings for reading, writing and walking OPML documents.
//!
//! A missing or empty file yields `Config::default()`. Unknown keys are
//! accepted and logged as a warning, since they are usually typos.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::traverse::TraversalOptions;
use crate::xml::{XmlFormat, DEFAULT_MAX_DEPTH};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Library settings.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
///
/// ```toml
/// format = "indented"
/// max_depth = 256
///
/// [traversal]
/// strategy = "breadth_first"
/// path_delimiter = " > "
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Layout used by `Opml::save_with`.
    pub format: XmlFormat,

    /// Maximum element nesting accepted while parsing.
    pub max_depth: usize,

    /// Defaults for `Traverser::from_config`.
    pub traversal: TraversalOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            format: XmlFormat::Compact,
            max_depth: DEFAULT_MAX_DEPTH,
            traversal: TraversalOptions::default(),
        }
    }
}

impl Config {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 3] = ["format", "max_depth", "traversal"];

    const TRAVERSAL_KEYS: [&'static str; 2] = ["strategy", "path_delimiter"];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // SEC-014: Check file size before reading to prevent memory exhaustion
        // from a maliciously large or corrupted config file.
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let config = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            format = ?config.format,
            max_depth = config.max_depth,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parses configuration from TOML text. Blank text yields the defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            tracing::debug!("Config is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse as a raw table first to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in Self::unknown_keys(&raw) {
                tracing::warn!(key = %key, "Unknown key in config file, ignoring");
            }
        }

        Ok(toml::from_str(content)?)
    }

    /// Keys serde would silently drop, with `[traversal]` entries dotted.
    fn unknown_keys(raw: &toml::Table) -> Vec<String> {
        let mut unknown: Vec<String> = raw
            .keys()
            .filter(|key| !Self::KNOWN_KEYS.contains(&key.as_str()))
            .cloned()
            .collect();
        if let Some(traversal) = raw.get("traversal").and_then(|value| value.as_table()) {
            unknown.extend(
                traversal
                    .keys()
                    .filter(|key| !Self::TRAVERSAL_KEYS.contains(&key.as_str()))
                    .map(|key| format!("traversal.{}", key)),
            );
        }
        unknown
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traverse::TraversalStrategy;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.format, XmlFormat::Compact);
        assert_eq!(config.max_depth, 1024);
        assert_eq!(config.traversal.strategy, TraversalStrategy::DepthFirst);
        assert_eq!(config.traversal.path_delimiter, "/");
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/opml_core_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_empty_file_returns_default() {
        let dir = std::env::temp_dir().join("opml_core_config_test_empty");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_whitespace_only_returns_default() {
        let config = Config::from_toml_str("   \n  \n  ").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let config = Config::from_toml_str("format = \"indented\"\n").unwrap();
        assert_eq!(config.format, XmlFormat::Indented);
        assert_eq!(config.max_depth, 1024); // default
        assert_eq!(config.traversal, TraversalOptions::default()); // default
    }

    #[test]
    fn test_full_config() {
        let dir = std::env::temp_dir().join("opml_core_config_test_full");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        let content = r#"
format = "indented"
max_depth = 64

[traversal]
strategy = "breadth_first"
path_delimiter = " > "
"#;
        std::fs::write(&path, content).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.format, XmlFormat::Indented);
        assert_eq!(config.max_depth, 64);
        assert_eq!(config.traversal.strategy, TraversalStrategy::BreadthFirst);
        assert_eq!(config.traversal.path_delimiter, " > ");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_traversal_table() {
        let config = Config::from_toml_str("[traversal]\npath_delimiter = \"::\"\n").unwrap();
        assert_eq!(config.traversal.strategy, TraversalStrategy::DepthFirst);
        assert_eq!(config.traversal.path_delimiter, "::");
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let err = Config::from_toml_str("this is not [valid toml").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let content = r#"
format = "compact"
totally_fake_key = "should not fail"
another_unknown = 42
"#;
        let config = Config::from_toml_str(content).unwrap();
        assert_eq!(config.format, XmlFormat::Compact);
    }

    #[test]
    fn test_unknown_keys_reported_in_traversal_table() {
        let content = r#"
format = "compact"
formatt = "indented"

[traversal]
strategy = "breadth_first"
delimiter = " > "
"#;
        let raw: toml::Table = content.parse().unwrap();
        assert_eq!(
            Config::unknown_keys(&raw),
            ["formatt".to_string(), "traversal.delimiter".to_string()]
        );

        // The misspelled key is ignored, so the delimiter keeps its default.
        let config = Config::from_toml_str(content).unwrap();
        assert_eq!(config.traversal.strategy, TraversalStrategy::BreadthFirst);
        assert_eq!(config.traversal.path_delimiter, "/");
    }

    #[test]
    fn test_known_keys_not_reported() {
        let raw: toml::Table = "max_depth = 8\n[traversal]\npath_delimiter = \"::\"\n"
            .parse()
            .unwrap();
        assert!(Config::unknown_keys(&raw).is_empty());
    }

    #[test]
    fn test_unknown_enum_value_returns_error() {
        let result = Config::from_toml_str("format = \"pretty\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_wrong_type_returns_error() {
        // max_depth should be an integer, not a string
        assert!(Config::from_toml_str("max_depth = \"deep\"\n").is_err());
    }

    // SEC-014: File size limit
    #[test]
    fn test_too_large_file_rejected() {
        let dir = std::env::temp_dir().join("opml_core_config_test_too_large");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");

        // Write a file just over 1MB
        let content = "a".repeat(1_048_577);
        std::fs::write(&path, content).unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
