//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Average rank at or below which a brand counts as a consistent performer.
pub const DEFAULT_CONSISTENCY_THRESHOLD: f64 = 2.0;

/// Tunables of the insight engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Consistency list cut-off (inclusive)
    pub consistency_threshold: f64,
    /// Report upstream `average_ranks` that disagree with recomputed ones
    pub check_upstream_averages: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            consistency_threshold: DEFAULT_CONSISTENCY_THRESHOLD,
            check_upstream_averages: true,
        }
    }
}

impl EngineConfig {
    /// Load and validate a configuration from JSON. Missing fields take
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] for undecodable JSON and
    /// [`Error::InvalidConfig`] for out-of-range values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the consistency threshold is not a
    /// finite number of at least 1.0 (the best possible rank).
    pub fn validate(&self) -> Result<()> {
        if !self.consistency_threshold.is_finite() || self.consistency_threshold < 1.0 {
            return Err(Error::InvalidConfig(format!(
                "consistency_threshold must be a finite number >= 1.0, got {}",
                self.consistency_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.consistency_threshold - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json(r#"{"consistency_threshold": 2.5}"#).unwrap();
        assert!((config.consistency_threshold - 2.5).abs() < f64::EPSILON);
        assert!(config.check_upstream_averages);
    }

    #[test]
    fn test_from_json_rejects_low_threshold() {
        let err = EngineConfig::from_json(r#"{"consistency_threshold": 0.5}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }
}
