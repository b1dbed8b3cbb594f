//! Short premium: iron condor and iron butterfly.

use super::payoff::{self, IronLegs};
use super::{BuildContext, Draft, GenerateError};
use crate::domain::{OptionType, StrategyLabel, TradeStructure, TrendStrength};

/// (short, long) unsigned deltas. Very rich premium affords wider wings.
fn condor_deltas(iv_rank: f64) -> (f64, f64) {
    if iv_rank > 70.0 {
        (0.20, 0.10)
    } else {
        (0.25, 0.15)
    }
}

/// Wing distance from the center strike, as a fraction of it.
fn butterfly_wing_pct(iv_rank: f64) -> f64 {
    if iv_rank > 75.0 {
        0.07
    } else {
        0.05
    }
}

pub(super) fn iron_condor(ctx: &BuildContext<'_>) -> Result<Draft, GenerateError> {
    let strategy = StrategyLabel::IronCondor;
    let dte = ctx.dte(strategy, TrendStrength::Weak)?;
    let (short_delta, long_delta) = condor_deltas(ctx.iv_rank());

    let put_short = ctx.strikes.by_delta(-short_delta, OptionType::Put, dte)?;
    let put_long = ctx.strikes.by_delta(-long_delta, OptionType::Put, dte)?;
    let call_short = ctx.strikes.by_delta(short_delta, OptionType::Call, dte)?;
    let call_long = ctx.strikes.by_delta(long_delta, OptionType::Call, dte)?;

    let legs = [
        ctx.buy(OptionType::Put, put_long, dte)?,
        ctx.sell(OptionType::Put, put_short, dte)?,
        ctx.sell(OptionType::Call, call_short, dte)?,
        ctx.buy(OptionType::Call, call_long, dte)?,
    ];
    let iron = IronLegs {
        put_long,
        put_short,
        call_short,
        call_long,
        put_long_ask: legs[0].price,
        put_short_bid: legs[1].price,
        call_short_bid: legs[2].price,
        call_long_ask: legs[3].price,
    };

    Ok(Draft {
        strategy,
        structure: TradeStructure::IronCondor {
            put_long_strike: put_long,
            put_short_strike: put_short,
            call_short_strike: call_short,
            call_long_strike: call_long,
            dte,
            profit_zone_width: call_short - put_short,
        },
        payoff: payoff::short_iron(&iron),
        legs: legs.to_vec(),
        target_deltas: vec![-long_delta, -short_delta, short_delta, long_delta],
        note: None,
    })
}

pub(super) fn iron_butterfly(ctx: &BuildContext<'_>) -> Result<Draft, GenerateError> {
    let strategy = StrategyLabel::IronButterfly;
    let dte = ctx.dte(strategy, TrendStrength::Weak)?;

    let center = ctx.strikes.by_delta(0.50, OptionType::Call, dte)?;
    let wing_pct = butterfly_wing_pct(ctx.iv_rank());
    let long_put = ctx
        .strikes
        .by_price(center * (1.0 - wing_pct), OptionType::Put, dte)?;
    let long_call = ctx
        .strikes
        .by_price(center * (1.0 + wing_pct), OptionType::Call, dte)?;

    let legs = [
        ctx.buy(OptionType::Put, long_put, dte)?,
        ctx.sell(OptionType::Put, center, dte)?,
        ctx.sell(OptionType::Call, center, dte)?,
        ctx.buy(OptionType::Call, long_call, dte)?,
    ];
    let iron = IronLegs {
        put_long: long_put,
        put_short: center,
        call_short: center,
        call_long: long_call,
        put_long_ask: legs[0].price,
        put_short_bid: legs[1].price,
        call_short_bid: legs[2].price,
        call_long_ask: legs[3].price,
    };
    let payoff = payoff::short_iron(&iron);
    let credit_per_share = payoff.premium / crate::domain::CONTRACT_MULTIPLIER;

    Ok(Draft {
        strategy,
        structure: TradeStructure::IronButterfly {
            center_strike: center,
            long_put_strike: long_put,
            long_call_strike: long_call,
            dte,
            wing_width: iron.wing_width(),
            profit_zone_width: 2.0 * credit_per_share,
        },
        payoff,
        legs: legs.to_vec(),
        target_deltas: vec![0.50],
        note: None,
    })
}
