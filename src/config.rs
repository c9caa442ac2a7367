use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::classify::LevelThresholds;
use crate::error::{HeatmapError, Result};
use crate::months::DEFAULT_MINIMUM_FRACTION;
use crate::weeks::DEFAULT_MAX_WEEKS;

/// Tunables for one engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Lower bounds of intensity levels 1..=N
    pub level_thresholds: LevelThresholds,
    /// Floor applied to every month label width, in `[0, 1]`
    pub minimum_fraction: f64,
    /// Use server-side stats when they agree with the records
    pub trust_server_stats: bool,
    /// Largest grid accepted, in weeks from the first to the last record
    pub max_weeks: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            level_thresholds: LevelThresholds::default(),
            minimum_fraction: DEFAULT_MINIMUM_FRACTION,
            trust_server_stats: true,
            max_weeks: DEFAULT_MAX_WEEKS,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        self.level_thresholds.validate()?;
        if !(0.0..=1.0).contains(&self.minimum_fraction) {
            return Err(HeatmapError::InvalidConfig(format!(
                "minimum fraction must be within [0, 1], got {}",
                self.minimum_fraction
            )));
        }
        if self.max_weeks == 0 {
            return Err(HeatmapError::InvalidConfig(
                "max weeks must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load and validate a JSON config file. Missing fields keep their defaults.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: EngineConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON from: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config in: {}", path.display()))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.minimum_fraction, 0.05);
        assert!(config.trust_server_stats);
        assert_eq!(config.max_weeks, DEFAULT_MAX_WEEKS);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{ "minimumFraction": 0.1 }"#).unwrap();
        assert_eq!(config.minimum_fraction, 0.1);
        assert_eq!(config.level_thresholds, LevelThresholds::default());
    }

    #[test]
    fn test_minimum_fraction_range() {
        let config = EngineConfig {
            minimum_fraction: 1.5,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(HeatmapError::InvalidConfig(_))));

        let config = EngineConfig {
            minimum_fraction: f64::NAN,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_max_weeks_must_be_positive() {
        let config: EngineConfig = serde_json::from_str(r#"{ "maxWeeks": 0 }"#).unwrap();
        assert!(matches!(config.validate(), Err(HeatmapError::InvalidConfig(_))));

        let config: EngineConfig = serde_json::from_str(r#"{ "maxWeeks": 120 }"#).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_weeks, 120);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "levelThresholds": [1, 5, 10], "trustServerStats": false }}"#
        )
        .unwrap();

        let config = EngineConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.level_thresholds.max_level(), 3);
        assert!(!config.trust_server_stats);
    }

    #[test]
    fn test_load_rejects_bad_thresholds() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "levelThresholds": [0, 1] }}"#).unwrap();

        let err = EngineConfig::load_from_file(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("at least 1"));
    }
}
