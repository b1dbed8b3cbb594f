//! Debit verticals: bull call spread and bear put spread.

use super::{payoff, BuildContext, Draft, GenerateError};
use crate::domain::{OptionType, StrategyLabel, TradeStructure};

/// (long, short) unsigned deltas. Lower IV buys a tighter, cheaper spread.
fn leg_deltas(iv_rank: f64) -> (f64, f64) {
    if iv_rank < 50.0 {
        (0.50, 0.30)
    } else {
        (0.60, 0.25)
    }
}

pub(super) fn debit_spread(
    ctx: &BuildContext<'_>,
    option_type: OptionType,
) -> Result<Draft, GenerateError> {
    let strategy = match option_type {
        OptionType::Call => StrategyLabel::BullCallSpread,
        OptionType::Put => StrategyLabel::BearPutSpread,
    };
    let dte = ctx.dte(strategy, ctx.strength)?;
    let (long_delta, short_delta) = leg_deltas(ctx.iv_rank());
    let sign = option_type.sign();
    let (long_delta, short_delta) = (long_delta * sign, short_delta * sign);

    let long_strike = ctx.strikes.by_delta(long_delta, option_type, dte)?;
    let short_strike = ctx.strikes.by_delta(short_delta, option_type, dte)?;
    let long = ctx.buy(option_type, long_strike, dte)?;
    let short = ctx.sell(option_type, short_strike, dte)?;

    Ok(Draft {
        strategy,
        structure: TradeStructure::Vertical {
            option_type,
            long_strike,
            short_strike,
            dte,
            spread_width: payoff::spread_width(option_type, long_strike, short_strike),
        },
        payoff: payoff::debit_vertical(option_type, long_strike, short_strike, long.price, short.price),
        legs: vec![long, short],
        target_deltas: vec![long_delta, short_delta],
        note: None,
    })
}
