//! Serializable engine configuration.
//!
//! Loaded from TOML; every field has a default, so an empty file is valid:
//!
//! ```toml
//! [risk]
//! account_size = 10000.0
//! risk_per_trade = 0.02
//! max_contracts = 10
//!
//! [prediction]
//! top_k = 3
//! unlimited_profit_multiple = 3.0
//! variable_profit_multiple = 1.0
//! audit_with_rules = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use optionlab_core::risk::{RiskConfigError, RiskManager};

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Risk(#[from] RiskConfigError),

    #[error("invalid prediction settings: {0}")]
    Prediction(String),
}

/// Top-level configuration for the prediction pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub risk: RiskConfig,
    pub prediction: PredictionConfig,
}

/// Account-level risk settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Account equity in dollars.
    pub account_size: f64,
    /// Fraction of the account risked per trade, in (0, 1].
    pub risk_per_trade: f64,
    /// Hard cap on contracts per trade.
    pub max_contracts: u32,
}

impl Default for RiskConfig {
    fn default() -> Self {
        let rm = RiskManager::default();
        Self {
            account_size: rm.account_size(),
            risk_per_trade: rm.risk_per_trade(),
            max_contracts: rm.max_contracts(),
        }
    }
}

/// How classifier output becomes a recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    /// Number of ranked labels kept (the top label plus alternatives).
    pub top_k: usize,
    /// Max-profit stand-in for unbounded strategies, as a multiple of max loss.
    pub unlimited_profit_multiple: f64,
    /// Max-profit stand-in for time spreads, as a multiple of max loss.
    pub variable_profit_multiple: f64,
    /// Also run the rule engine and record whether it agrees.
    pub audit_with_rules: bool,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            unlimited_profit_multiple: 3.0,
            variable_profit_multiple: 1.0,
            audit_with_rules: true,
        }
    }
}

impl EngineConfig {
    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject settings that would produce a meaningless pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.risk_manager()?;
        let p = &self.prediction;
        if p.top_k == 0 {
            return Err(ConfigError::Prediction("top_k must be at least 1".into()));
        }
        for (name, value) in [
            ("unlimited_profit_multiple", p.unlimited_profit_multiple),
            ("variable_profit_multiple", p.variable_profit_multiple),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Prediction(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn risk_manager(&self) -> Result<RiskManager, RiskConfigError> {
        RiskManager::new(
            self.risk.account_size,
            self.risk.risk_per_trade,
            self.risk.max_contracts,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.risk.account_size, 10_000.0);
        assert_eq!(config.risk.risk_per_trade, 0.02);
        assert_eq!(config.risk.max_contracts, 10);
        assert_eq!(config.prediction.top_k, 3);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [risk]
            account_size = 50000.0
            "#,
        )
        .unwrap();
        assert_eq!(config.risk.account_size, 50_000.0);
        assert_eq!(config.risk.max_contracts, 10);
        assert!(config.prediction.audit_with_rules);
        assert_eq!(config.risk_manager().unwrap().max_risk_amount(), 1_000.0);
    }

    #[test]
    fn invalid_risk_is_rejected() {
        let err = EngineConfig::from_toml_str(
            r#"
            [risk]
            risk_per_trade = 0.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Risk(RiskConfigError::RiskPerTrade(_))));
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let err = EngineConfig::from_toml_str("[prediction]\ntop_k = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Prediction(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = EngineConfig::from_toml_str("[risk\naccount_size = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn toml_roundtrip() {
        let mut config = EngineConfig::default();
        config.prediction.top_k = 5;
        let text = config.to_toml_string().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }
}
