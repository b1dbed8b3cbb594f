//! Strategy rule engine.
//!
//! A deterministic, ordered cascade of threshold rules over [`RuleInputs`].
//! Rules are evaluated top to bottom and the first match wins; if nothing
//! matches, a fallback cascade always produces a label, so the engine is total.
//!
//! Order matters. Narrow rules sit above the broad ones that would otherwise
//! absorb their observations: the diagonal spread is checked first, the iron
//! condor second, and so on. The thresholds are calibrated against the
//! frequency bands in [`StrategyLabel::target_band`]; see [`distribution`].

pub mod distribution;

use serde::Serialize;
use tracing::debug;

use crate::domain::{MarketFeatureSnapshot, RuleInputs, StrategyLabel};

pub use distribution::{validate_strategy_distribution, DistributionReport, StrategyShare};

/// One entry of the priority list.
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub label: StrategyLabel,
    pub predicate: fn(&RuleInputs) -> bool,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("label", &self.label)
            .finish()
    }
}

/// Medium IV, perfectly neutral regime, a slight lean off the 20-day SMA and
/// almost no trend. Rarest label, so it is checked first.
fn diagonal_spread(x: &RuleInputs) -> bool {
    let lean = x.price_vs_sma_20.abs();
    x.iv_rank > 45.0
        && x.iv_rank < 60.0
        && x.trend_regime == 2
        && lean > 0.005
        && lean < 0.012
        && x.adx_14 < 15.0
}

fn iron_condor(x: &RuleInputs) -> bool {
    x.iv_rank > 52.0
        && x.iv_rank < 75.0
        && x.adx_14 < 25.0
        && x.rsi_14 > 45.0
        && x.rsi_14 < 55.0
}

fn iron_butterfly(x: &RuleInputs) -> bool {
    x.iv_rank > 68.0 && x.adx_14 < 20.0
}

fn long_call(x: &RuleInputs) -> bool {
    x.iv_rank < 46.0 && x.adx_14 > 21.0 && x.trend_regime >= 3 && x.rsi_14 > 54.0
}

/// Three confirming paths: a trending market with any bearish signal, a
/// moderately trending one with a clearly bearish oscillator or price, or a
/// deeply oversold RSI regardless of trend.
fn long_put(x: &RuleInputs) -> bool {
    if x.iv_rank >= 48.0 {
        return false;
    }
    let trending_bearish = x.adx_14 > 20.0
        && (x.trend_regime <= 1 || x.rsi_14 < 42.0 || x.price_vs_sma_20 < -0.025);
    let moderate_bearish =
        x.adx_14 >= 15.0 && (x.rsi_14 < 38.0 || x.price_vs_sma_20 < -0.035);
    let oversold = x.rsi_14 < 33.0;
    trending_bearish || moderate_bearish || oversold
}

fn bull_call_spread(x: &RuleInputs) -> bool {
    (56.0..=63.0).contains(&x.iv_rank)
        && x.trend_regime >= 3
        && x.adx_14 > 26.0
        && x.rsi_14 > 62.0
}

fn bear_put_spread(x: &RuleInputs) -> bool {
    (54.0..=65.0).contains(&x.iv_rank)
        && x.trend_regime <= 1
        && x.adx_14 > 22.0
        && x.rsi_14 < 45.0
}

fn long_straddle(x: &RuleInputs) -> bool {
    x.iv_rank < 35.0 && x.rsi_14 > 45.0 && x.rsi_14 < 58.0 && x.adx_14 < 17.0
}

fn long_strangle(x: &RuleInputs) -> bool {
    x.iv_rank < 36.0 && x.rsi_14 > 44.0 && x.rsi_14 < 59.0 && x.adx_14 < 25.0
}

fn calendar_spread(x: &RuleInputs) -> bool {
    x.iv_rank < 42.0
        && x.adx_14 < 20.0
        && x.rsi_14 > 42.0
        && x.rsi_14 < 58.0
        && x.price_vs_sma_20.abs() < 0.022
}

/// The priority list, highest priority first.
pub const RULES: [Rule; 10] = [
    Rule {
        name: "diagonal_spread",
        label: StrategyLabel::DiagonalSpread,
        predicate: diagonal_spread,
    },
    Rule {
        name: "iron_condor",
        label: StrategyLabel::IronCondor,
        predicate: iron_condor,
    },
    Rule {
        name: "iron_butterfly",
        label: StrategyLabel::IronButterfly,
        predicate: iron_butterfly,
    },
    Rule {
        name: "long_call",
        label: StrategyLabel::LongCall,
        predicate: long_call,
    },
    Rule {
        name: "long_put",
        label: StrategyLabel::LongPut,
        predicate: long_put,
    },
    Rule {
        name: "bull_call_spread",
        label: StrategyLabel::BullCallSpread,
        predicate: bull_call_spread,
    },
    Rule {
        name: "bear_put_spread",
        label: StrategyLabel::BearPutSpread,
        predicate: bear_put_spread,
    },
    Rule {
        name: "long_straddle",
        label: StrategyLabel::LongStraddle,
        predicate: long_straddle,
    },
    Rule {
        name: "long_strangle",
        label: StrategyLabel::LongStrangle,
        predicate: long_strangle,
    },
    Rule {
        name: "calendar_spread",
        label: StrategyLabel::CalendarSpread,
        predicate: calendar_spread,
    },
];

/// Last resort when no rule matched. Always returns a label.
pub fn fallback(x: &RuleInputs) -> StrategyLabel {
    if x.iv_rank > 55.0 {
        StrategyLabel::IronCondor
    } else if x.iv_rank < 35.0 {
        if x.rsi_14 >= 50.0 {
            StrategyLabel::LongCall
        } else {
            StrategyLabel::LongPut
        }
    } else if x.rsi_14 > 58.0 && x.adx_14 > 18.0 {
        StrategyLabel::BullCallSpread
    } else if x.rsi_14 < 42.0 && x.adx_14 > 18.0 {
        StrategyLabel::BearPutSpread
    } else {
        StrategyLabel::IronCondor
    }
}

/// Which step of the cascade produced a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleMatch {
    /// Position in [`RULES`] and the rule's name.
    Rule { index: usize, name: &'static str },
    Fallback,
}

/// A label plus the step that chose it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub label: StrategyLabel,
    pub matched: RuleMatch,
}

/// Stateless; construct freely or use the `Default`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrategyRuleEngine;

impl StrategyRuleEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn rules(&self) -> &'static [Rule] {
        &RULES
    }

    /// Label for a set of rule inputs.
    pub fn select(&self, inputs: &RuleInputs) -> StrategyLabel {
        self.explain(inputs).label
    }

    pub fn select_snapshot(&self, snapshot: &MarketFeatureSnapshot) -> StrategyLabel {
        self.select(snapshot.rule_inputs())
    }

    /// Label and the rule that produced it.
    pub fn explain(&self, inputs: &RuleInputs) -> Decision {
        let decision = RULES
            .iter()
            .enumerate()
            .find(|(_, rule)| (rule.predicate)(inputs))
            .map(|(index, rule)| Decision {
                label: rule.label,
                matched: RuleMatch::Rule {
                    index,
                    name: rule.name,
                },
            })
            .unwrap_or_else(|| Decision {
                label: fallback(inputs),
                matched: RuleMatch::Fallback,
            });

        debug!(label = %decision.label, matched = ?decision.matched, "strategy rule matched");
        decision
    }
}
