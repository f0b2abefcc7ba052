//! Pipeline configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::MAX_SECTION_SCORE;
use crate::error::{LaunchLensError, Result};

/// Default time budget for one component generator call.
pub const DEFAULT_COMPONENT_TIMEOUT_MS: u64 = 30_000;
/// Score used for a section whose analyzer failed.
pub const DEFAULT_NEUTRAL_SECTION_SCORE: u8 = 50;

/// Tunables for one [`crate::TierOrchestrator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Time budget per component generator call, in milliseconds.
    pub component_timeout_ms: u64,
    /// Score substituted when a section analyzer fails.
    pub neutral_section_score: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            component_timeout_ms: DEFAULT_COMPONENT_TIMEOUT_MS,
            neutral_section_score: DEFAULT_NEUTRAL_SECTION_SCORE,
        }
    }
}

impl PipelineConfig {
    /// Component time budget as a duration.
    pub fn component_timeout(&self) -> Duration {
        Duration::from_millis(self.component_timeout_ms)
    }

    /// Parse a configuration from JSON, filling missing fields with defaults.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.neutral_section_score > MAX_SECTION_SCORE {
            return Err(LaunchLensError::Config(format!(
                "neutral_section_score {} exceeds {MAX_SECTION_SCORE}",
                self.neutral_section_score
            )));
        }
        if self.component_timeout_ms == 0 {
            return Err(LaunchLensError::Config(
                "component_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let config = PipelineConfig::from_json_str(r#"{"component_timeout_ms": 250}"#)
            .expect("config");
        assert_eq!(config.component_timeout(), Duration::from_millis(250));
        assert_eq!(config.neutral_section_score, DEFAULT_NEUTRAL_SECTION_SCORE);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(PipelineConfig::from_json_str(r#"{"neutral_section_score": 150}"#).is_err());
        assert!(PipelineConfig::from_json_str(r#"{"component_timeout_ms": 0}"#).is_err());
        assert!(PipelineConfig::from_json_str("not json").is_err());
    }
}
