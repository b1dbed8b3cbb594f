//! Market feature snapshots.
//!
//! A snapshot is one point in time for one underlying. Construction is the
//! only place values are checked: every required feature must be present and
//! finite. Nothing is ever back-filled with a default; a day without enough
//! history to compute a feature is rejected.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Published feature ordering consumed by the strategy classifier.
pub const FEATURE_NAMES: [&str; 84] = [
    "current_price",
    "return_1d",
    "return_3d",
    "return_5d",
    "return_10d",
    "return_20d",
    "return_50d",
    "rsi_14",
    "macd",
    "macd_signal",
    "macd_histogram",
    "adx_14",
    "atr_14",
    "sma_5",
    "sma_10",
    "sma_20",
    "sma_50",
    "sma_200",
    "price_vs_sma_5",
    "price_vs_sma_10",
    "price_vs_sma_20",
    "price_vs_sma_50",
    "price_vs_sma_200",
    "sma_alignment",
    "bb_upper",
    "bb_middle",
    "bb_lower",
    "bb_position",
    "volume_20d_avg",
    "volume_vs_avg",
    "hv_20d",
    "iv_atm",
    "iv_rank",
    "iv_percentile",
    "hv_iv_ratio",
    "resistance_level",
    "support_level",
    "distance_to_resistance",
    "distance_to_support",
    "position_in_range",
    "spy_return_1d",
    "vix_level",
    "vix_change",
    "trend_regime",
    "volatility_regime",
    "volume_regime",
    "put_call_volume_ratio",
    "put_call_oi_ratio",
    "total_option_volume",
    "total_open_interest",
    "atm_delta_call",
    "atm_delta_put",
    "atm_gamma",
    "atm_theta",
    "atm_vega",
    "max_pain_strike",
    "distance_to_max_pain",
    "obv",
    "stochastic_k",
    "stochastic_d",
    "cci",
    "williams_r",
    "mfi",
    "iv_skew",
    "iv_term_structure",
    "vix_vs_ma20",
    "volatility_trend",
    "parkinson_vol",
    "garman_klass_vol",
    "vol_of_vol",
    "gamma_exposure",
    "delta_exposure",
    "unusual_activity",
    "options_flow_sentiment",
    "resistance_2",
    "support_2",
    "range_width",
    "days_in_range",
    "breakout_probability",
    "spy_correlation",
    "spy_return_5d",
    "smh_vs_spy",
    "combined_state",
    "days_since_regime_change",
];

/// Features the strategy rules and parameter builders read.
pub const RULE_FEATURES: [&str; 6] = [
    "iv_rank",
    "adx_14",
    "trend_regime",
    "rsi_14",
    "price_vs_sma_20",
    "volatility_regime",
];

/// Highest regime code (strong up / very high volatility).
pub const MAX_REGIME: u8 = 4;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    #[error("missing required feature '{name}'")]
    Missing { name: String },

    #[error("feature '{name}' is not finite ({value})")]
    NotFinite { name: String, value: f64 },

    #[error("feature '{name}' out of range ({value})")]
    OutOfRange { name: String, value: f64 },
}

fn require(values: &HashMap<String, f64>, name: &str) -> Result<f64, FeatureError> {
    let value = *values.get(name).ok_or_else(|| FeatureError::Missing {
        name: name.to_string(),
    })?;
    finite(name, value)
}

fn finite(name: &str, value: f64) -> Result<f64, FeatureError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FeatureError::NotFinite {
            name: name.to_string(),
            value,
        })
    }
}

fn bounded(name: &str, value: f64, lo: f64, hi: f64) -> Result<f64, FeatureError> {
    let value = finite(name, value)?;
    if (lo..=hi).contains(&value) {
        Ok(value)
    } else {
        Err(FeatureError::OutOfRange {
            name: name.to_string(),
            value,
        })
    }
}

fn regime(name: &str, value: f64) -> Result<u8, FeatureError> {
    let value = finite(name, value)?;
    if value.fract() != 0.0 || value < 0.0 || value > f64::from(MAX_REGIME) {
        return Err(FeatureError::OutOfRange {
            name: name.to_string(),
            value,
        });
    }
    Ok(value as u8)
}

/// The validated subset of a snapshot that drives strategy selection.
///
/// Only built through [`RuleInputs::new`] (deserialization included), so the
/// rule predicates never see an out-of-range value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RuleInputsRepr")]
pub struct RuleInputs {
    /// 0–100.
    pub(crate) iv_rank: f64,
    /// Trend strength, ≥ 0.
    pub(crate) adx_14: f64,
    /// 0 = strong down, 2 = ranging, 4 = strong up.
    pub(crate) trend_regime: u8,
    /// 0–100.
    pub(crate) rsi_14: f64,
    /// Signed fractional deviation of price from its 20-day SMA.
    pub(crate) price_vs_sma_20: f64,
    /// 0 = very low, 4 = very high.
    pub(crate) volatility_regime: u8,
}

#[derive(Deserialize)]
struct RuleInputsRepr {
    iv_rank: f64,
    adx_14: f64,
    trend_regime: u8,
    rsi_14: f64,
    price_vs_sma_20: f64,
    volatility_regime: u8,
}

impl TryFrom<RuleInputsRepr> for RuleInputs {
    type Error = FeatureError;

    fn try_from(r: RuleInputsRepr) -> Result<Self, Self::Error> {
        Self::new(
            r.iv_rank,
            r.adx_14,
            r.trend_regime,
            r.rsi_14,
            r.price_vs_sma_20,
            r.volatility_regime,
        )
    }
}

impl RuleInputs {
    pub fn new(
        iv_rank: f64,
        adx_14: f64,
        trend_regime: u8,
        rsi_14: f64,
        price_vs_sma_20: f64,
        volatility_regime: u8,
    ) -> Result<Self, FeatureError> {
        let inputs = Self {
            iv_rank: bounded("iv_rank", iv_rank, 0.0, 100.0)?,
            adx_14: bounded("adx_14", adx_14, 0.0, f64::MAX)?,
            trend_regime: regime("trend_regime", f64::from(trend_regime))?,
            rsi_14: bounded("rsi_14", rsi_14, 0.0, 100.0)?,
            price_vs_sma_20: finite("price_vs_sma_20", price_vs_sma_20)?,
            volatility_regime: regime("volatility_regime", f64::from(volatility_regime))?,
        };
        Ok(inputs)
    }

    /// Build from a named feature bag. Only the rule features are required.
    pub fn from_map(values: &HashMap<String, f64>) -> Result<Self, FeatureError> {
        Self::new(
            require(values, "iv_rank")?,
            require(values, "adx_14")?,
            regime("trend_regime", require(values, "trend_regime")?)?,
            require(values, "rsi_14")?,
            require(values, "price_vs_sma_20")?,
            regime("volatility_regime", require(values, "volatility_regime")?)?,
        )
    }

    pub fn iv_rank(&self) -> f64 {
        self.iv_rank
    }

    pub fn adx_14(&self) -> f64 {
        self.adx_14
    }

    pub fn trend_regime(&self) -> u8 {
        self.trend_regime
    }

    pub fn rsi_14(&self) -> f64 {
        self.rsi_14
    }

    pub fn price_vs_sma_20(&self) -> f64 {
        self.price_vs_sma_20
    }

    pub fn volatility_regime(&self) -> u8 {
        self.volatility_regime
    }
}

/// Trend regime from ADX, MACD histogram and distance from the 50-day SMA.
pub fn trend_regime_from(adx: f64, macd_histogram: f64, price_vs_sma_50: f64) -> u8 {
    if adx > 30.0 && macd_histogram > 0.0 && price_vs_sma_50 > 0.02 {
        4
    } else if adx > 25.0 && price_vs_sma_50 > 0.0 {
        3
    } else if adx < 20.0 {
        2
    } else if adx > 25.0 && price_vs_sma_50 < 0.0 {
        1
    } else {
        0
    }
}

/// Volatility regime from IV rank.
pub fn volatility_regime_from(iv_rank: f64) -> u8 {
    if iv_rank > 75.0 {
        4
    } else if iv_rank > 60.0 {
        3
    } else if iv_rank > 40.0 {
        2
    } else if iv_rank > 25.0 {
        1
    } else {
        0
    }
}

/// A complete, validated feature vector for one underlying on one day.
///
/// Deserializes from `values` alone; the rule inputs are re-derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SnapshotRepr")]
pub struct MarketFeatureSnapshot {
    values: Vec<f64>,
    rules: RuleInputs,
}

#[derive(Deserialize)]
struct SnapshotRepr {
    values: Vec<f64>,
}

impl TryFrom<SnapshotRepr> for MarketFeatureSnapshot {
    type Error = FeatureError;

    fn try_from(r: SnapshotRepr) -> Result<Self, Self::Error> {
        Self::from_ordered(r.values)
    }
}

impl MarketFeatureSnapshot {
    /// Build from a named feature bag; every published feature must be present.
    ///
    /// Extra keys are ignored.
    pub fn from_map(values: &HashMap<String, f64>) -> Result<Self, FeatureError> {
        let ordered = FEATURE_NAMES
            .iter()
            .map(|name| require(values, name))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_ordered(ordered)
    }

    /// Build from a vector already in [`FEATURE_NAMES`] order.
    pub fn from_ordered(values: Vec<f64>) -> Result<Self, FeatureError> {
        if values.len() != FEATURE_NAMES.len() {
            let missing = FEATURE_NAMES
                .get(values.len())
                .copied()
                .unwrap_or("<extra feature>");
            return Err(FeatureError::Missing {
                name: missing.to_string(),
            });
        }
        for (name, value) in FEATURE_NAMES.iter().zip(&values) {
            finite(name, *value)?;
        }

        let at = |name: &str| values[feature_index(name).unwrap_or(0)];
        let rules = RuleInputs::new(
            at("iv_rank"),
            at("adx_14"),
            regime("trend_regime", at("trend_regime"))?,
            at("rsi_14"),
            at("price_vs_sma_20"),
            regime("volatility_regime", at("volatility_regime"))?,
        )?;
        bounded("current_price", at("current_price"), f64::MIN_POSITIVE, f64::MAX)?;

        Ok(Self { values, rules })
    }

    pub fn rule_inputs(&self) -> &RuleInputs {
        &self.rules
    }

    pub fn current_price(&self) -> f64 {
        self.get("current_price").unwrap_or_default()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        feature_index(name).map(|i| self.values[i])
    }

    /// The full vector in published order.
    pub fn to_feature_vector(&self) -> &[f64] {
        &self.values
    }

    /// Project onto an arbitrary ordering (e.g. the one a model was trained with).
    pub fn ordered<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<f64>, FeatureError> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.get(name).ok_or_else(|| FeatureError::Missing {
                    name: name.to_string(),
                })
            })
            .collect()
    }
}

/// Position of a feature in [`FEATURE_NAMES`].
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_NAMES.iter().position(|n| *n == name)
}
