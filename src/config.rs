//! Timestamp format configuration.
//!
//! Administrators choose how annotated timestamps are displayed (elapsed
//! time since the build started, or the wall-clock instant) through a small
//! YAML config. [`FormatConfig::apply`] installs the configured format into
//! the process-wide provider; live sessions pick it up on their next line.

use crate::format::{self, ElapsedFormat, SystemClockFormat, TimestampFormat};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Which timestamp representation to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FormatMode {
    /// Time elapsed since the build started.
    #[default]
    Elapsed,
    /// The wall-clock instant the line was written, in UTC.
    SystemClock,
}

/// Timestamp display configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Timestamp representation to display.
    pub mode: FormatMode,
    /// strftime pattern for [`FormatMode::SystemClock`].
    pub clock_format: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            mode: FormatMode::default(),
            clock_format: SystemClockFormat::DEFAULT_PATTERN.to_string(),
        }
    }
}

impl FormatConfig {
    /// Load configuration from a YAML file, falling back to defaults when
    /// the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("format config not found at {path:?}, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read format config {path:?}"))?;
        let config: Self = serde_yaml_ng::from_str(&contents)
            .with_context(|| format!("failed to parse format config {path:?}"))?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_yaml_ng::to_string(self).context("failed to serialize format config")?;
        fs::write(path, contents)
            .with_context(|| format!("failed to write format config {path:?}"))
    }

    /// Build the configured timestamp format.
    pub fn to_format(&self) -> Arc<dyn TimestampFormat> {
        match self.mode {
            FormatMode::Elapsed => Arc::new(ElapsedFormat),
            FormatMode::SystemClock => Arc::new(SystemClockFormat::new(self.clock_format.clone())),
        }
    }

    /// Install the configured format as the process-wide provider.
    pub fn apply(&self) {
        log::info!("installing {:?} timestamp format", self.mode);
        format::set(self.to_format());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FormatConfig::default();
        assert_eq!(config.mode, FormatMode::Elapsed);
        assert_eq!(config.clock_format, "%H:%M:%S");
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = FormatConfig {
            mode: FormatMode::SystemClock,
            clock_format: "%H:%M:%S%.3f".to_string(),
        };
        let yaml = serde_yaml_ng::to_string(&config).unwrap();
        assert!(yaml.contains("mode: system-clock"));
        let parsed: FormatConfig = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let parsed: FormatConfig = serde_yaml_ng::from_str("mode: system-clock\n").unwrap();
        assert_eq!(parsed.mode, FormatMode::SystemClock);
        assert_eq!(parsed.clock_format, "%H:%M:%S");
    }

    #[test]
    fn test_load_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = FormatConfig::load(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, FormatConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("format.yaml");
        let config = FormatConfig {
            mode: FormatMode::SystemClock,
            clock_format: "%H:%M".to_string(),
        };
        config.save(&path).unwrap();
        assert_eq!(FormatConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("format.yaml");
        fs::write(&path, "mode: [nonsense").unwrap();
        assert!(FormatConfig::load(&path).is_err());
    }
}
