//! Domain types for OptionLab

pub mod features;
pub mod ids;
pub mod option;
pub mod strategy;
pub mod trade;
pub mod trend;

pub use features::{
    feature_index, trend_regime_from, volatility_regime_from, FeatureError,
    MarketFeatureSnapshot, RuleInputs, FEATURE_NAMES, RULE_FEATURES,
};
pub use ids::RecommendationId;
pub use option::{ChainError, OptionChain, OptionContract, OptionType};
pub use strategy::{DteProfile, StrategyInfo, StrategyLabel, UnsupportedStrategy};
pub use trade::{
    Bias, CashFlow, Leg, LegAction, MaxProfit, TradeParameters, TradeStructure,
    CONTRACT_MULTIPLIER,
};
pub use trend::TrendStrength;
