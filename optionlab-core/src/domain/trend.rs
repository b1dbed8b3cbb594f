//! Trend-strength classification.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::features::RuleInputs;

/// How unambiguous the current directional move is.
///
/// `VeryStrong` needs ADX, RSI and the trend regime to agree at their
/// extremes; `Strong` accepts a looser one-sided match; `Moderate` only looks
/// at ADX.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendStrength {
    VeryStrong,
    Strong,
    Moderate,
    Weak,
}

impl TrendStrength {
    pub fn classify(inputs: &RuleInputs) -> Self {
        let RuleInputs {
            adx_14: adx,
            rsi_14: rsi,
            trend_regime: regime,
            ..
        } = *inputs;

        if adx > 30.0 && ((rsi > 65.0 && regime >= 4) || (rsi < 35.0 && regime == 0)) {
            Self::VeryStrong
        } else if adx > 25.0 && ((rsi > 60.0 && regime >= 3) || (rsi < 40.0 && regime <= 1)) {
            Self::Strong
        } else if adx > 20.0 {
            Self::Moderate
        } else {
            Self::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryStrong => "VERY_STRONG",
            Self::Strong => "STRONG",
            Self::Moderate => "MODERATE",
            Self::Weak => "WEAK",
        }
    }
}

impl fmt::Display for TrendStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
