//! OptionLab Core — domain types, strategy rules, contract selection, risk, trade generation.
//!
//! This crate contains the decision engine:
//! - Domain types (feature snapshots, option chains, strategy labels, trades)
//! - Ordered rule cascade that labels market conditions with one of ten strategies
//! - Strike and expiration selection against a chain snapshot
//! - Risk manager for position sizing and trade approval
//! - Parameter generator that turns a label + chain into a sized trade
//! - Seeded synthetic market generator for tests, benches and demos
//!
//! Everything here is synchronous and allocation-light. No function holds
//! global state; the same chain and risk manager may be shared freely across
//! threads.

pub mod domain;
pub mod params;
pub mod risk;
pub mod rng;
pub mod rules;
pub mod selection;
pub mod synthetic;

pub use domain::{
    ChainError, FeatureError, MarketFeatureSnapshot, MaxProfit, OptionChain, OptionContract,
    OptionType, RuleInputs, StrategyLabel, TradeParameters, TrendStrength,
};
pub use params::{GenerateError, ParameterGenerator};
pub use risk::{RiskManager, RiskValidation};
pub use rules::StrategyRuleEngine;
