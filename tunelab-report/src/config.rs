//! Serializable analysis configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::downsample::DownsampleConfig;
use crate::ratios::{DEFAULT_RISK_FREE_RATE, PERIODS_PER_YEAR};

/// Errors from loading or validating an analysis configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Parameters for a single analysis run.
///
/// The ratio constants live here as explicit, overridable values rather
/// than hidden module globals; the defaults encode the reporting
/// convention (0% risk-free rate, 365-day annualization for 24/7 markets).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Starting account equity, used to scale drawdown and seed CAGR.
    pub initial_capital: f64,

    /// Annual risk-free rate for Sharpe/Sortino excess returns.
    pub annual_risk_free_rate: f64,

    /// Annualization base in periods (days) per year. 365 by design; do
    /// not substitute the 252-day equity convention.
    pub periods_per_year: f64,

    /// Target return for the Sortino downside deviation.
    pub sortino_target_return: f64,

    /// Simulation length in bars, bounding event-time accounting.
    pub total_bars: usize,

    /// Equity curve downsampling settings.
    pub downsample: DownsampleConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            annual_risk_free_rate: DEFAULT_RISK_FREE_RATE,
            periods_per_year: PERIODS_PER_YEAR,
            sortino_target_return: 0.0,
            total_bars: 0,
            downsample: DownsampleConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse a config from TOML text and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_capital <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "initial_capital must be positive, got {}",
                self.initial_capital
            )));
        }
        if self.downsample.target_points == 0 {
            return Err(ConfigError::Invalid(
                "downsample.target_points must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downsample::DownsampleStrategy;

    #[test]
    fn defaults_encode_reporting_convention() {
        let config = AnalysisConfig::default();
        assert_eq!(config.annual_risk_free_rate, 0.0);
        assert_eq!(config.periods_per_year, 365.0);
        assert_eq!(config.sortino_target_return, 0.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn toml_roundtrip_with_overrides() {
        let text = r#"
            initial_capital = 50000.0
            annual_risk_free_rate = 0.02
            total_bars = 8760

            [downsample]
            strategy = "DRAWDOWN_PEAKS"
            target_points = 250
        "#;
        let config = AnalysisConfig::from_toml_str(text).unwrap();
        assert_eq!(config.initial_capital, 50_000.0);
        assert_eq!(config.annual_risk_free_rate, 0.02);
        assert_eq!(config.total_bars, 8_760);
        assert_eq!(config.downsample.strategy, DownsampleStrategy::DrawdownPeaks);
        assert_eq!(config.downsample.target_points, 250);
        // Unspecified fields keep their defaults.
        assert_eq!(config.periods_per_year, 365.0);
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let config = AnalysisConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn negative_capital_rejected() {
        let result = AnalysisConfig::from_toml_str("initial_capital = -5.0");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn zero_downsample_target_rejected() {
        let text = r#"
            [downsample]
            strategy = "LTTB"
            target_points = 0
        "#;
        let result = AnalysisConfig::from_toml_str(text);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let result = AnalysisConfig::from_toml_str("initial_capital = [");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
