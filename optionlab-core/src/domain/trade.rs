//! TradeParameters — a fully specified, sized trade for one strategy.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::option::OptionType;
use super::strategy::StrategyLabel;
use super::trend::TrendStrength;

/// Shares controlled by one option contract.
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

/// Best-case outcome of a position at expiration.
///
/// Long-premium strategies have no upper bound; time spreads depend on the
/// future volatility path and are reported qualitatively.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MaxProfitRepr", into = "MaxProfitRepr")]
pub enum MaxProfit {
    Amount(f64),
    Unlimited,
    Variable,
}

impl MaxProfit {
    pub fn amount(&self) -> Option<f64> {
        match self {
            Self::Amount(v) => Some(*v),
            Self::Unlimited | Self::Variable => None,
        }
    }

    pub fn scaled(&self, contracts: u32) -> Self {
        match self {
            Self::Amount(v) => Self::Amount(v * f64::from(contracts)),
            other => *other,
        }
    }

    /// Numeric stand-in for risk checks on non-numeric outcomes.
    pub fn estimate(&self, max_loss: f64, unlimited_multiple: f64, variable_multiple: f64) -> f64 {
        match self {
            Self::Amount(v) => *v,
            Self::Unlimited => max_loss.abs() * unlimited_multiple,
            Self::Variable => max_loss.abs() * variable_multiple,
        }
    }
}

impl fmt::Display for MaxProfit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount(v) => write!(f, "${v:.2}"),
            Self::Unlimited => f.write_str("Unlimited"),
            Self::Variable => f.write_str("Variable"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum MaxProfitRepr {
    Amount(f64),
    Label(String),
}

impl From<MaxProfit> for MaxProfitRepr {
    fn from(value: MaxProfit) -> Self {
        match value {
            MaxProfit::Amount(v) => Self::Amount(v),
            MaxProfit::Unlimited => Self::Label("Unlimited".into()),
            MaxProfit::Variable => Self::Label("Variable".into()),
        }
    }
}

impl TryFrom<MaxProfitRepr> for MaxProfit {
    type Error = String;

    fn try_from(value: MaxProfitRepr) -> Result<Self, Self::Error> {
        match value {
            MaxProfitRepr::Amount(v) => Ok(Self::Amount(v)),
            MaxProfitRepr::Label(s) if s.eq_ignore_ascii_case("unlimited") => Ok(Self::Unlimited),
            MaxProfitRepr::Label(s) if s.eq_ignore_ascii_case("variable") => Ok(Self::Variable),
            MaxProfitRepr::Label(s) => Err(format!("unknown max profit '{s}'")),
        }
    }
}

/// Whether opening the position pays or collects premium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashFlow {
    Debit,
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LegAction {
    Buy,
    Sell,
}

/// One executable leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub action: LegAction,
    pub option_type: OptionType,
    pub strike: f64,
    pub dte: u32,
    /// Ask for bought legs, bid for sold legs.
    pub price: f64,
    pub contracts: u32,
}

/// Directional lean of a diagonal spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bias {
    Bullish,
    Bearish,
}

/// Strike/expiry layout, one shape per strategy family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "structure", rename_all = "snake_case")]
pub enum TradeStructure {
    SingleLeg {
        option_type: OptionType,
        strike: f64,
        dte: u32,
        target_delta: f64,
    },
    Vertical {
        option_type: OptionType,
        long_strike: f64,
        short_strike: f64,
        dte: u32,
        spread_width: f64,
    },
    Straddle {
        strike: f64,
        dte: u32,
    },
    Strangle {
        call_strike: f64,
        put_strike: f64,
        dte: u32,
        strike_width: f64,
    },
    IronCondor {
        put_long_strike: f64,
        put_short_strike: f64,
        call_short_strike: f64,
        call_long_strike: f64,
        dte: u32,
        profit_zone_width: f64,
    },
    IronButterfly {
        center_strike: f64,
        long_put_strike: f64,
        long_call_strike: f64,
        dte: u32,
        wing_width: f64,
        profit_zone_width: f64,
    },
    Calendar {
        option_type: OptionType,
        strike: f64,
        near_dte: u32,
        far_dte: u32,
    },
    Diagonal {
        option_type: OptionType,
        long_strike: f64,
        short_strike: f64,
        near_dte: u32,
        far_dte: u32,
        bias: Bias,
    },
}

/// A complete trade specification.
///
/// Dollar figures are reported per contract and in total (per contract ×
/// `contracts`). Built once per generation call and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeParameters {
    pub strategy: StrategyLabel,
    pub structure: TradeStructure,
    pub legs: Vec<Leg>,
    pub contracts: u32,

    // ── Entry ──
    pub cash_flow: CashFlow,
    pub premium_per_contract: f64,
    pub total_premium: f64,

    // ── Risk ──
    pub max_loss_per_contract: f64,
    pub max_loss: f64,
    pub max_profit_per_contract: MaxProfit,
    pub max_profit: MaxProfit,
    /// Ascending; empty when the payoff depends on a later expiration.
    pub breakevens: Vec<f64>,
    pub risk_reward_ratio: Option<f64>,

    // ── Context ──
    pub iv_rank: f64,
    pub trend_strength: TrendStrength,
    /// Deltas the strikes were searched for, empty when chosen by price only.
    #[serde(default)]
    pub target_deltas: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl TradeParameters {
    /// Earliest expiration among the legs.
    pub fn nearest_dte(&self) -> u32 {
        self.legs.iter().map(|l| l.dte).min().unwrap_or_default()
    }

    pub fn strikes(&self) -> Vec<f64> {
        let mut strikes: Vec<f64> = self.legs.iter().map(|l| l.strike).collect();
        strikes.sort_by(f64::total_cmp);
        strikes.dedup();
        strikes
    }
}
