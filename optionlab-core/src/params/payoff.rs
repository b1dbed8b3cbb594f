//! Expiration payoff formulas, one per strategy family.
//!
//! Inputs are per-share quotes; outputs are per-contract dollars
//! (× [`CONTRACT_MULTIPLIER`]). Breakevens are underlying prices, ascending.

use crate::domain::{CashFlow, MaxProfit, OptionType, CONTRACT_MULTIPLIER};

/// Per-contract economics of a position before sizing.
#[derive(Debug, Clone, PartialEq)]
pub struct Payoff {
    pub cash_flow: CashFlow,
    /// Debit paid or credit received.
    pub premium: f64,
    pub max_loss: f64,
    pub max_profit: MaxProfit,
    pub breakevens: Vec<f64>,
}

impl Payoff {
    /// Numeric reward over risk, when both are known and the risk is positive.
    pub fn risk_reward(&self) -> Option<f64> {
        match self.max_profit {
            MaxProfit::Amount(profit) if self.max_loss > 0.0 => Some(profit / self.max_loss),
            _ => None,
        }
    }
}

/// Single long call or put bought at `ask`.
pub fn long_option(option_type: OptionType, strike: f64, ask: f64) -> Payoff {
    let breakeven = match option_type {
        OptionType::Call => strike + ask,
        OptionType::Put => strike - ask,
    };
    Payoff {
        cash_flow: CashFlow::Debit,
        premium: ask * CONTRACT_MULTIPLIER,
        max_loss: ask * CONTRACT_MULTIPLIER,
        max_profit: MaxProfit::Unlimited,
        breakevens: vec![breakeven],
    }
}

/// Debit vertical: bull call (long below short) or bear put (long above short).
///
/// ```text
/// net_debit  = (long_ask - short_bid) * 100
/// max_profit = width * 100 - net_debit
/// breakeven  = long_strike ± net_debit / 100
/// ```
pub fn debit_vertical(
    option_type: OptionType,
    long_strike: f64,
    short_strike: f64,
    long_ask: f64,
    short_bid: f64,
) -> Payoff {
    let net_debit = (long_ask - short_bid) * CONTRACT_MULTIPLIER;
    let width = spread_width(option_type, long_strike, short_strike);
    let per_share = net_debit / CONTRACT_MULTIPLIER;
    let breakeven = match option_type {
        OptionType::Call => long_strike + per_share,
        OptionType::Put => long_strike - per_share,
    };
    Payoff {
        cash_flow: CashFlow::Debit,
        premium: net_debit,
        max_loss: net_debit,
        max_profit: MaxProfit::Amount(width * CONTRACT_MULTIPLIER - net_debit),
        breakevens: vec![breakeven],
    }
}

/// Strike distance in the profitable direction of a debit vertical.
pub fn spread_width(option_type: OptionType, long_strike: f64, short_strike: f64) -> f64 {
    match option_type {
        OptionType::Call => short_strike - long_strike,
        OptionType::Put => long_strike - short_strike,
    }
}

/// Long call plus long put; a straddle when the strikes coincide.
pub fn long_volatility(put_strike: f64, call_strike: f64, put_ask: f64, call_ask: f64) -> Payoff {
    let per_share = call_ask + put_ask;
    let cost = per_share * CONTRACT_MULTIPLIER;
    Payoff {
        cash_flow: CashFlow::Debit,
        premium: cost,
        max_loss: cost,
        max_profit: MaxProfit::Unlimited,
        breakevens: vec![put_strike - per_share, call_strike + per_share],
    }
}

/// Strikes and quotes of a four-leg short iron position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IronLegs {
    pub put_long: f64,
    pub put_short: f64,
    pub call_short: f64,
    pub call_long: f64,
    pub put_long_ask: f64,
    pub put_short_bid: f64,
    pub call_short_bid: f64,
    pub call_long_ask: f64,
}

impl IronLegs {
    /// The wider of the two wings, in strike points.
    pub fn wing_width(&self) -> f64 {
        (self.put_short - self.put_long).max(self.call_long - self.call_short)
    }
}

/// Iron condor or iron butterfly (the butterfly shares one short strike).
///
/// ```text
/// net_credit = (short bids - long asks) * 100
/// max_loss   = wing_width * 100 - net_credit
/// breakevens = put_short - credit/100, call_short + credit/100
/// ```
pub fn short_iron(legs: &IronLegs) -> Payoff {
    let net_credit = (legs.put_short_bid + legs.call_short_bid
        - legs.put_long_ask
        - legs.call_long_ask)
        * CONTRACT_MULTIPLIER;
    let per_share = net_credit / CONTRACT_MULTIPLIER;
    Payoff {
        cash_flow: CashFlow::Credit,
        premium: net_credit,
        max_loss: legs.wing_width() * CONTRACT_MULTIPLIER - net_credit,
        max_profit: MaxProfit::Amount(net_credit),
        breakevens: vec![legs.put_short - per_share, legs.call_short + per_share],
    }
}

/// Calendar or diagonal: long the far expiration, short the near one.
///
/// Profit depends on the volatility path after the near leg expires, so
/// neither a number nor breakevens are reported for it.
pub fn time_spread(far_ask: f64, near_bid: f64) -> Payoff {
    let net_debit = (far_ask - near_bid) * CONTRACT_MULTIPLIER;
    Payoff {
        cash_flow: CashFlow::Debit,
        premium: net_debit,
        max_loss: net_debit,
        max_profit: MaxProfit::Variable,
        breakevens: Vec::new(),
    }
}
