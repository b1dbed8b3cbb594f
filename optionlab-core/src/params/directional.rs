//! Long call and long put.

use super::{payoff, BuildContext, Draft, GenerateError};
use crate::domain::{OptionType, StrategyLabel, TradeStructure};

/// Unsigned delta to buy: closer to the money when options are cheap.
pub(crate) fn target_delta(iv_rank: f64) -> f64 {
    if iv_rank < 30.0 {
        0.50
    } else if iv_rank < 40.0 {
        0.40
    } else {
        0.30
    }
}

pub(super) fn long_option(
    ctx: &BuildContext<'_>,
    option_type: OptionType,
) -> Result<Draft, GenerateError> {
    let strategy = match option_type {
        OptionType::Call => StrategyLabel::LongCall,
        OptionType::Put => StrategyLabel::LongPut,
    };
    let dte = ctx.dte(strategy, ctx.strength)?;
    let delta = target_delta(ctx.iv_rank()) * option_type.sign();
    let strike = ctx.strikes.by_delta(delta, option_type, dte)?;
    let leg = ctx.buy(option_type, strike, dte)?;

    Ok(Draft {
        strategy,
        structure: TradeStructure::SingleLeg {
            option_type,
            strike,
            dte,
            target_delta: delta,
        },
        payoff: payoff::long_option(option_type, strike, leg.price),
        legs: vec![leg],
        target_deltas: vec![delta],
        note: None,
    })
}
