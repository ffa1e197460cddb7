//! Configuration utilities

use crate::data::DEFAULT_MAX_KEYWORDS;
use crate::sentiment::DEFAULT_ENGINES;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Analysis settings
    pub analysis: AnalysisSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Check settings that serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analysis.validate()?;
        self.logging.validate()
    }
}

/// Analysis-related settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Engine ids to run, in any order; registration order is kept
    pub engines: Vec<String>,
    /// Maximum keywords attached to each score
    pub max_keywords: usize,
    /// Score items on the rayon thread pool
    pub parallel: bool,
    /// Skip items published more than this many days before the batch time
    pub max_age_days: Option<i64>,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            engines: DEFAULT_ENGINES.iter().map(|id| id.to_string()).collect(),
            max_keywords: DEFAULT_MAX_KEYWORDS,
            parallel: false,
            max_age_days: None,
        }
    }
}

impl AnalysisSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.engines.is_empty() {
            return Err(ConfigError::Invalid("analysis.engines is empty".to_string()));
        }
        for (i, id) in self.engines.iter().enumerate() {
            if self.engines[..i].contains(id) {
                return Err(ConfigError::Invalid(format!(
                    "analysis.engines lists {} twice",
                    id
                )));
            }
        }
        if let Some(days) = self.max_age_days {
            if days < 0 {
                return Err(ConfigError::Invalid(format!(
                    "analysis.max_age_days must not be negative, got {}",
                    days
                )));
            }
        }
        Ok(())
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable JSON format
    pub json_format: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl LoggingSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        match self.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(ConfigError::Invalid(format!("unknown log level: {}", other))),
        }
    }
}

/// Load configuration from file, choosing the format by extension
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();
    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::FileError(e.to_string()))?;

    let config: AppConfig = match extension(path) {
        "json" => serde_json::from_str(&content).map_err(ConfigError::parse)?,
        "toml" => toml::from_str(&content).map_err(ConfigError::parse)?,
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(ConfigError::parse)?,
        other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
    };

    config.validate()?;
    Ok(config)
}

/// Save configuration to file, choosing the format by extension
pub fn save_config<P: AsRef<Path>>(config: &AppConfig, path: P) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let content = match extension(path) {
        "json" => serde_json::to_string_pretty(config).map_err(ConfigError::serialize)?,
        "toml" => toml::to_string_pretty(config).map_err(ConfigError::serialize)?,
        "yaml" | "yml" => serde_yaml::to_string(config).map_err(ConfigError::serialize)?,
        other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
    };

    std::fs::write(path, content).map_err(|e| ConfigError::FileError(e.to_string()))
}

fn extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("")
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read or written
    #[error("File error: {0}")]
    FileError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Serialize error: {0}")]
    SerializeError(String),
    /// Extension is not json, toml, yaml or yml
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
    /// Well-formed but unusable settings
    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    fn parse(e: impl std::fmt::Display) -> Self {
        ConfigError::ParseError(e.to_string())
    }

    fn serialize(e: impl std::fmt::Display) -> Self {
        ConfigError::SerializeError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.analysis.engines, vec!["lexicon", "valence", "phrase"]);
        assert_eq!(config.analysis.max_keywords, 10);
        assert!(!config.analysis.parallel);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_each_format() {
        let dir = tempdir().unwrap();
        let mut config = AppConfig::default();
        config.analysis.parallel = true;
        config.analysis.max_age_days = Some(7);
        config.logging.json_format = true;

        for name in ["config.json", "config.toml", "config.yaml"] {
            let path = dir.path().join(name);
            save_config(&config, &path).unwrap();
            let loaded = load_config(&path).unwrap();
            assert_eq!(loaded, config, "{}", name);
        }
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "[analysis]\nengines = [\"valence\"]\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.analysis.engines, vec!["valence"]);
        assert_eq!(config.analysis.max_keywords, 10);
        assert_eq!(config.logging, LoggingSettings::default());
    }

    #[test]
    fn test_unsupported_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::UnsupportedFormat(_))));
        assert!(matches!(
            save_config(&AppConfig::default(), &path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(load_config(&path), Err(ConfigError::FileError(_))));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");

        std::fs::write(&path, r#"{"analysis": {"engines": []}}"#).unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Invalid(_))));

        std::fs::write(&path, r#"{"analysis": {"engines": ["lexicon", "lexicon"]}}"#).unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Invalid(_))));

        std::fs::write(&path, r#"{"logging": {"level": "loud"}}"#).unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Invalid(_))));
    }
}
