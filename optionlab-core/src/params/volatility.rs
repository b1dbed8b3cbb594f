//! Long straddle and long strangle.
//!
//! Both pick their expiration as if the trend were moderate: the trade is a
//! bet on the size of the move, not its direction.

use super::{payoff, BuildContext, Draft, GenerateError};
use crate::domain::{OptionType, StrategyLabel, TradeStructure, TrendStrength};

pub(super) fn straddle(ctx: &BuildContext<'_>) -> Result<Draft, GenerateError> {
    let strategy = StrategyLabel::LongStraddle;
    let dte = ctx.dte(strategy, TrendStrength::Moderate)?;

    let call_atm = ctx.strikes.by_delta(0.50, OptionType::Call, dte)?;
    let put_atm = ctx.strikes.by_delta(-0.50, OptionType::Put, dte)?;
    let strike = ctx
        .strikes
        .by_price((call_atm + put_atm) / 2.0, OptionType::Call, dte)?;

    let call = ctx.buy(OptionType::Call, strike, dte)?;
    let put = ctx.buy(OptionType::Put, strike, dte)?;

    Ok(Draft {
        strategy,
        structure: TradeStructure::Straddle { strike, dte },
        payoff: payoff::long_volatility(strike, strike, put.price, call.price),
        legs: vec![call, put],
        target_deltas: vec![0.50, -0.50],
        note: None,
    })
}

pub(super) fn strangle(ctx: &BuildContext<'_>) -> Result<Draft, GenerateError> {
    let strategy = StrategyLabel::LongStrangle;
    let dte = ctx.dte(strategy, TrendStrength::Moderate)?;
    let delta = if ctx.iv_rank() < 30.0 { 0.35 } else { 0.25 };

    let call_strike = ctx.strikes.by_delta(delta, OptionType::Call, dte)?;
    let put_strike = ctx.strikes.by_delta(-delta, OptionType::Put, dte)?;
    let call = ctx.buy(OptionType::Call, call_strike, dte)?;
    let put = ctx.buy(OptionType::Put, put_strike, dte)?;

    Ok(Draft {
        strategy,
        structure: TradeStructure::Strangle {
            call_strike,
            put_strike,
            dte,
            strike_width: call_strike - put_strike,
        },
        payoff: payoff::long_volatility(put_strike, call_strike, put.price, call.price),
        legs: vec![call, put],
        target_deltas: vec![delta, -delta],
        note: None,
    })
}
