//! Parameter generator — strategy label + option chain → sized trade.
//!
//! Every builder follows the same steps: classify trend strength, pick the
//! expiration, pick strikes by delta (or by price), read quotes off the chain,
//! compute the payoff, then size with the [`RiskManager`] and scale the
//! per-contract economics by the contract count.
//!
//! A strike/expiration the chain does not list is an error for that one call.
//! Nothing is substituted.

mod directional;
mod income;
pub mod payoff;
mod time_spread;
mod vertical;
mod volatility;

use thiserror::Error;
use tracing::debug;

use crate::domain::{
    ChainError, Leg, LegAction, MarketFeatureSnapshot, OptionChain, OptionType, RuleInputs,
    StrategyLabel, TradeParameters, TradeStructure, TrendStrength, UnsupportedStrategy,
};
use crate::risk::RiskManager;
use crate::selection::{DteSelector, StrikeSelector};

use payoff::Payoff;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    UnsupportedStrategy(#[from] UnsupportedStrategy),
}

/// Turns a strategy label into a complete, sized trade.
///
/// Holds only the risk configuration; one generator can serve any number of
/// chains, from any number of threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParameterGenerator {
    risk: RiskManager,
}

impl ParameterGenerator {
    pub fn new(risk: RiskManager) -> Self {
        Self { risk }
    }

    pub fn risk_manager(&self) -> &RiskManager {
        &self.risk
    }

    pub fn generate(
        &self,
        label: StrategyLabel,
        chain: &OptionChain,
        inputs: &RuleInputs,
    ) -> Result<TradeParameters, GenerateError> {
        let ctx = BuildContext::new(chain, inputs, &self.risk);
        let draft = match label {
            StrategyLabel::LongCall => directional::long_option(&ctx, OptionType::Call),
            StrategyLabel::LongPut => directional::long_option(&ctx, OptionType::Put),
            StrategyLabel::BullCallSpread => vertical::debit_spread(&ctx, OptionType::Call),
            StrategyLabel::BearPutSpread => vertical::debit_spread(&ctx, OptionType::Put),
            StrategyLabel::LongStraddle => volatility::straddle(&ctx),
            StrategyLabel::LongStrangle => volatility::strangle(&ctx),
            StrategyLabel::IronCondor => income::iron_condor(&ctx),
            StrategyLabel::IronButterfly => income::iron_butterfly(&ctx),
            StrategyLabel::CalendarSpread => time_spread::calendar(&ctx),
            StrategyLabel::DiagonalSpread => time_spread::diagonal(&ctx),
        }?;

        let trade = ctx.finish(draft);
        debug!(
            strategy = %trade.strategy,
            contracts = trade.contracts,
            premium = trade.premium_per_contract,
            max_loss = trade.max_loss,
            "trade parameters generated"
        );
        Ok(trade)
    }

    /// Same as [`generate`](Self::generate) for a label given as text.
    pub fn generate_named(
        &self,
        label: &str,
        chain: &OptionChain,
        inputs: &RuleInputs,
    ) -> Result<TradeParameters, GenerateError> {
        let label: StrategyLabel = label.parse()?;
        self.generate(label, chain, inputs)
    }

    pub fn generate_for_snapshot(
        &self,
        label: StrategyLabel,
        chain: &OptionChain,
        snapshot: &MarketFeatureSnapshot,
    ) -> Result<TradeParameters, GenerateError> {
        self.generate(label, chain, snapshot.rule_inputs())
    }
}

// ─── Builder plumbing ────────────────────────────────────────────────

/// A priced, unsized trade produced by one builder.
pub(crate) struct Draft {
    pub strategy: StrategyLabel,
    pub structure: TradeStructure,
    pub legs: Vec<Leg>,
    pub payoff: Payoff,
    pub target_deltas: Vec<f64>,
    pub note: Option<&'static str>,
}

/// Everything a builder reads, borrowed for the duration of one call.
pub(crate) struct BuildContext<'a> {
    pub chain: &'a OptionChain,
    pub strikes: StrikeSelector<'a>,
    pub dtes: DteSelector,
    pub inputs: &'a RuleInputs,
    pub strength: TrendStrength,
    risk: &'a RiskManager,
}

impl<'a> BuildContext<'a> {
    fn new(chain: &'a OptionChain, inputs: &'a RuleInputs, risk: &'a RiskManager) -> Self {
        Self {
            chain,
            strikes: StrikeSelector::new(chain),
            dtes: DteSelector::new(chain),
            inputs,
            strength: TrendStrength::classify(inputs),
            risk,
        }
    }

    pub fn iv_rank(&self) -> f64 {
        self.inputs.iv_rank
    }

    /// Expiration for `label` under an explicit trend strength.
    pub fn dte(&self, label: StrategyLabel, strength: TrendStrength) -> Result<u32, ChainError> {
        self.dtes.select(label.dte_profile(), self.iv_rank(), strength)
    }

    /// Bought leg, priced at the ask.
    pub fn buy(&self, option_type: OptionType, strike: f64, dte: u32) -> Result<Leg, ChainError> {
        Ok(Leg {
            action: LegAction::Buy,
            option_type,
            strike,
            dte,
            price: self.chain.ask(strike, option_type, dte)?,
            contracts: 1,
        })
    }

    /// Sold leg, priced at the bid.
    pub fn sell(&self, option_type: OptionType, strike: f64, dte: u32) -> Result<Leg, ChainError> {
        Ok(Leg {
            action: LegAction::Sell,
            option_type,
            strike,
            dte,
            price: self.chain.bid(strike, option_type, dte)?,
            contracts: 1,
        })
    }

    /// Size the draft and scale its economics.
    fn finish(&self, draft: Draft) -> TradeParameters {
        let Draft {
            strategy,
            structure,
            legs,
            mut payoff,
            target_deltas,
            note,
        } = draft;
        payoff.breakevens.sort_by(f64::total_cmp);

        let contracts = self.risk.calculate_position_size(payoff.max_loss);
        let n = f64::from(contracts);
        let risk_reward_ratio = payoff.risk_reward();

        TradeParameters {
            strategy,
            structure,
            legs: legs.into_iter().map(|leg| Leg { contracts, ..leg }).collect(),
            contracts,
            cash_flow: payoff.cash_flow,
            premium_per_contract: payoff.premium,
            total_premium: payoff.premium * n,
            max_loss_per_contract: payoff.max_loss,
            max_loss: payoff.max_loss * n,
            max_profit_per_contract: payoff.max_profit,
            max_profit: payoff.max_profit.scaled(contracts),
            breakevens: payoff.breakevens,
            risk_reward_ratio,
            iv_rank: self.inputs.iv_rank,
            trend_strength: self.strength,
            target_deltas,
            note: note.map(str::to_string),
        }
    }
}
