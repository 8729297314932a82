//! TOML configuration file support.
//!
//! Settings shared by several runs can live in a config file instead of flags:
//!
//! ```toml
//! # groupxml.toml
//! [ingest]
//! missing_marker = "NA"
//! delimiter = ","
//! cancel_check_interval = 1024
//! reset_indexes = true
//! ```
//!
//! Command-line flags override values read from the file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use groupxml::groupxml::EngineConfig;
use groupxml::sink::SinkConfig;

/// Root configuration structure for groupxml.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Ingest-specific settings.
    #[serde(default)]
    pub ingest: IngestConfig,
}

/// Configuration for the ingest and check commands.
#[derive(Debug, Default, Deserialize)]
pub struct IngestConfig {
    /// Text written for missing values.
    pub missing_marker: Option<String>,

    /// Single ASCII column delimiter.
    pub delimiter: Option<char>,

    /// Closed elements between two cancellation checks.
    pub cancel_check_interval: Option<usize>,

    /// Clear cross-reference maps before each file.
    pub reset_indexes: Option<bool>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load `path` when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Engine settings, defaults filled in.
    pub fn engine_config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        EngineConfig {
            cancel_check_interval: self
                .ingest
                .cancel_check_interval
                .unwrap_or(defaults.cancel_check_interval),
            reset_indexes: self.ingest.reset_indexes.unwrap_or(defaults.reset_indexes),
        }
    }

    /// Sink settings with the command-line overrides applied.
    pub fn sink_config(
        &self,
        missing_marker: Option<String>,
        delimiter: Option<char>,
    ) -> Result<SinkConfig> {
        let mut config = SinkConfig::default();
        if let Some(marker) = missing_marker.or_else(|| self.ingest.missing_marker.clone()) {
            if marker.is_empty() {
                anyhow::bail!("Missing marker must not be empty: it would read as an empty value");
            }
            config.missing_marker = marker;
        }
        if let Some(delimiter) = delimiter.or(self.ingest.delimiter) {
            config.delimiter = delimiter_byte(delimiter)?;
            if delimiter == ',' {
                config.extension = "csv".to_string();
            }
        }
        Ok(config)
    }
}

fn delimiter_byte(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() || delimiter == '"' || delimiter == '\n' {
        anyhow::bail!("Unsupported delimiter {:?}: use a single ASCII character", delimiter);
    }
    Ok(delimiter as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [ingest]
            missing_marker = "NA"
            delimiter = ","
            cancel_check_interval = 1024
            reset_indexes = false
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.ingest.missing_marker.as_deref(), Some("NA"));
        assert_eq!(config.ingest.delimiter, Some(','));

        let engine = config.engine_config();
        assert_eq!(engine.cancel_check_interval, 1024);
        assert!(!engine.reset_indexes);

        let sink = config.sink_config(None, None).unwrap();
        assert_eq!(sink.delimiter, b',');
        assert_eq!(sink.missing_marker, "NA");
        assert_eq!(sink.extension, "csv");
    }

    #[test]
    fn test_flags_override_file() {
        let config = Config::from_str("[ingest]\nmissing_marker = \"NA\"\n").unwrap();
        let sink = config
            .sink_config(Some("-".to_string()), Some('|'))
            .unwrap();
        assert_eq!(sink.missing_marker, "-");
        assert_eq!(sink.delimiter, b'|');
        assert_eq!(sink.extension, "tsv");
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.ingest.cancel_check_interval, None);
        assert_eq!(config.engine_config().cancel_check_interval, 256);
        assert_eq!(config.sink_config(None, None).unwrap().delimiter, b'\t');
    }

    #[test]
    fn test_rejects_empty_missing_marker() {
        let config = Config::default();
        assert!(config.sink_config(Some(String::new()), None).is_err());

        let config = Config::from_str("[ingest]\nmissing_marker = \"\"\n").unwrap();
        assert!(config.sink_config(None, None).is_err());
        assert_eq!(
            config.sink_config(Some("NA".to_string()), None).unwrap().missing_marker,
            "NA"
        );
    }

    #[test]
    fn test_rejects_non_ascii_delimiter() {
        let config = Config::default();
        assert!(config.sink_config(None, Some('§')).is_err());
    }
}
