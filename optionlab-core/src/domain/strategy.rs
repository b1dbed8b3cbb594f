//! The closed set of option strategies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One of the ten tradable strategies.
///
/// Both the rule engine and the parameter generator match on this enum
/// exhaustively; adding a variant forces both to be updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyLabel {
    IronCondor,
    IronButterfly,
    LongCall,
    LongPut,
    BullCallSpread,
    BearPutSpread,
    LongStraddle,
    LongStrangle,
    CalendarSpread,
    DiagonalSpread,
}

/// A label string outside the closed strategy set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported strategy: {0}")]
pub struct UnsupportedStrategy(pub String);

/// How a strategy's expiration is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DteProfile {
    /// Iron condor / butterfly: richer premium, shorter expiry.
    PremiumSelling,
    /// Long call / put: cheap premium and strong trend, longer expiry.
    LongPremium,
    /// Bull call / bear put spreads.
    Vertical,
    /// Everything else.
    Standard,
}

/// Descriptive metadata for display and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrategyInfo {
    pub description: &'static str,
    pub conditions: &'static str,
    pub target_pct: (f64, f64),
    pub risk_profile: &'static str,
    pub ideal_market: &'static str,
}

impl StrategyLabel {
    /// All strategies in canonical order.
    pub const ALL: [StrategyLabel; 10] = [
        Self::IronCondor,
        Self::IronButterfly,
        Self::LongCall,
        Self::LongPut,
        Self::BullCallSpread,
        Self::BearPutSpread,
        Self::LongStraddle,
        Self::LongStrangle,
        Self::CalendarSpread,
        Self::DiagonalSpread,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IronCondor => "IRON_CONDOR",
            Self::IronButterfly => "IRON_BUTTERFLY",
            Self::LongCall => "LONG_CALL",
            Self::LongPut => "LONG_PUT",
            Self::BullCallSpread => "BULL_CALL_SPREAD",
            Self::BearPutSpread => "BEAR_PUT_SPREAD",
            Self::LongStraddle => "LONG_STRADDLE",
            Self::LongStrangle => "LONG_STRANGLE",
            Self::CalendarSpread => "CALENDAR_SPREAD",
            Self::DiagonalSpread => "DIAGONAL_SPREAD",
        }
    }

    pub fn dte_profile(&self) -> DteProfile {
        match self {
            Self::IronCondor | Self::IronButterfly => DteProfile::PremiumSelling,
            Self::LongCall | Self::LongPut => DteProfile::LongPremium,
            Self::BullCallSpread | Self::BearPutSpread => DteProfile::Vertical,
            Self::LongStraddle
            | Self::LongStrangle
            | Self::CalendarSpread
            | Self::DiagonalSpread => DteProfile::Standard,
        }
    }

    /// Expected share of labelled days, in percent.
    pub fn target_band(&self) -> (f64, f64) {
        self.info().target_pct
    }

    pub fn info(&self) -> StrategyInfo {
        match self {
            Self::IronCondor => StrategyInfo {
                description: "Sell OTM call spread + OTM put spread",
                conditions: "High IV (52-75) + Ranging (ADX < 25) + Neutral RSI (45-55)",
                target_pct: (20.0, 30.0),
                risk_profile: "Defined risk, neutral",
                ideal_market: "High volatility, sideways movement",
            },
            Self::IronButterfly => StrategyInfo {
                description: "Sell ATM call + ATM put, buy OTM wings",
                conditions: "Very High IV (>68) + Very Ranging (ADX < 20)",
                target_pct: (10.0, 15.0),
                risk_profile: "Defined risk, neutral, tighter profit zone",
                ideal_market: "Very high volatility, very stable price",
            },
            Self::LongCall => StrategyInfo {
                description: "Buy OTM call option",
                conditions: "Low IV (<46) + Strong Uptrend (ADX > 21, trend >= 3, RSI > 54)",
                target_pct: (15.0, 20.0),
                risk_profile: "Limited risk, unlimited upside",
                ideal_market: "Low volatility, strong bullish trend",
            },
            Self::LongPut => StrategyInfo {
                description: "Buy OTM put option",
                conditions: "Low IV (<48) + Strong Downtrend OR Bearish Signals",
                target_pct: (15.0, 20.0),
                risk_profile: "Limited risk, high downside profit",
                ideal_market: "Low volatility, strong bearish trend",
            },
            Self::BullCallSpread => StrategyInfo {
                description: "Buy call, sell higher strike call",
                conditions: "Medium-High IV (56-63) + Strong Bullish (trend >= 3, ADX > 26, RSI > 62)",
                target_pct: (10.0, 15.0),
                risk_profile: "Defined risk, defined profit",
                ideal_market: "Medium volatility, moderate uptrend",
            },
            Self::BearPutSpread => StrategyInfo {
                description: "Buy put, sell lower strike put",
                conditions: "Medium-High IV (54-65) + Strong Bearish (trend <= 1, ADX > 22, RSI < 45)",
                target_pct: (10.0, 15.0),
                risk_profile: "Defined risk, defined profit",
                ideal_market: "Medium volatility, moderate downtrend",
            },
            Self::LongStraddle => StrategyInfo {
                description: "Buy ATM call + ATM put (same strike)",
                conditions: "Low IV (<35) + Very Neutral (RSI 45-58, ADX < 17)",
                target_pct: (5.0, 10.0),
                risk_profile: "Limited risk, profit from large move either direction",
                ideal_market: "Low volatility expecting expansion, uncertain direction",
            },
            Self::LongStrangle => StrategyInfo {
                description: "Buy OTM call + OTM put (different strikes)",
                conditions: "Low IV (<36) + Neutral (RSI 44-59, ADX < 25)",
                target_pct: (5.0, 10.0),
                risk_profile: "Limited risk, cheaper than straddle",
                ideal_market: "Low volatility expecting expansion, uncertain direction",
            },
            Self::CalendarSpread => StrategyInfo {
                description: "Sell near-term option, buy far-term option (same strike)",
                conditions: "Low IV (<42) + Very Neutral (ADX < 20, RSI 42-58, |price vs SMA20| < 2.2%)",
                target_pct: (3.0, 5.0),
                risk_profile: "Limited risk, profit from time decay",
                ideal_market: "Low volatility, very stable price",
            },
            Self::DiagonalSpread => StrategyInfo {
                description: "Sell near-term option, buy far-term option (different strikes)",
                conditions: "Medium IV (45-60) + Slight Bias (0.5-1.2% from SMA, ADX < 15)",
                target_pct: (3.0, 5.0),
                risk_profile: "Limited risk, combines time decay + directional",
                ideal_market: "Medium volatility, slight directional bias",
            },
        }
    }
}

impl fmt::Display for StrategyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyLabel {
    type Err = UnsupportedStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnsupportedStrategy(s.to_string()))
    }
}
