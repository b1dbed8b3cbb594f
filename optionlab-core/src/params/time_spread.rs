//! Calendar and diagonal spreads: short the near expiration, long the far.

use super::{payoff, BuildContext, Draft, GenerateError};
use crate::domain::{Bias, OptionType, StrategyLabel, TradeStructure};

pub(super) fn calendar(ctx: &BuildContext<'_>) -> Result<Draft, GenerateError> {
    let (near_dte, far_dte) = ctx.dtes.near_far()?;
    let strike = ctx.strikes.by_delta(0.50, OptionType::Call, near_dte)?;
    let option_type = if ctx.inputs.rsi_14 > 50.0 {
        OptionType::Call
    } else {
        OptionType::Put
    };

    let near = ctx.sell(option_type, strike, near_dte)?;
    let far = ctx.buy(option_type, strike, far_dte)?;
    let payoff = payoff::time_spread(far.price, near.price);

    Ok(Draft {
        strategy: StrategyLabel::CalendarSpread,
        structure: TradeStructure::Calendar {
            option_type,
            strike,
            near_dte,
            far_dte,
        },
        payoff,
        legs: vec![near, far],
        target_deltas: vec![0.50],
        note: Some("Profit maximized if price stays near strike at near expiration"),
    })
}

pub(super) fn diagonal(ctx: &BuildContext<'_>) -> Result<Draft, GenerateError> {
    let (near_dte, far_dte) = ctx.dtes.near_far()?;
    let (option_type, bias) = if ctx.inputs.rsi_14 > 55.0 {
        (OptionType::Call, Bias::Bullish)
    } else {
        (OptionType::Put, Bias::Bearish)
    };
    let long_delta = 0.50 * option_type.sign();
    let short_delta = 0.30 * option_type.sign();

    let long_strike = ctx.strikes.by_delta(long_delta, option_type, far_dte)?;
    let short_strike = ctx.strikes.by_delta(short_delta, option_type, near_dte)?;
    let near = ctx.sell(option_type, short_strike, near_dte)?;
    let far = ctx.buy(option_type, long_strike, far_dte)?;
    let payoff = payoff::time_spread(far.price, near.price);

    Ok(Draft {
        strategy: StrategyLabel::DiagonalSpread,
        structure: TradeStructure::Diagonal {
            option_type,
            long_strike,
            short_strike,
            near_dte,
            far_dte,
            bias,
        },
        payoff,
        legs: vec![near, far],
        target_deltas: vec![long_delta, short_delta],
        note: Some("Roll short option at expiration to continue position"),
    })
}
