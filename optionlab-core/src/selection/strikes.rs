//! Strike selection by delta or by price.
//!
//! Both modes look at one option type and one expiration. If the expiration
//! has no contracts of that type the search widens to every expiration before
//! giving up. Ties go to the first contract in chain order.

use tracing::{debug, warn};

use crate::domain::{ChainError, OptionChain, OptionContract, OptionType};

/// Read-only nearest-match lookups over a chain.
#[derive(Debug, Clone, Copy)]
pub struct StrikeSelector<'a> {
    chain: &'a OptionChain,
}

impl<'a> StrikeSelector<'a> {
    pub fn new(chain: &'a OptionChain) -> Self {
        Self { chain }
    }

    /// Contract whose |delta| is closest to |target_delta|.
    pub fn contract_by_delta(
        &self,
        target_delta: f64,
        option_type: OptionType,
        dte: u32,
    ) -> Result<&'a OptionContract, ChainError> {
        let target = target_delta.abs();
        let best = self.nearest(option_type, dte, |c| (c.delta.abs() - target).abs())?;
        debug!(
            %option_type,
            dte,
            target_delta,
            strike = best.strike,
            delta = best.delta,
            "strike selected by delta"
        );
        Ok(best)
    }

    /// Contract whose strike is closest to `target_price`.
    pub fn contract_by_price(
        &self,
        target_price: f64,
        option_type: OptionType,
        dte: u32,
    ) -> Result<&'a OptionContract, ChainError> {
        let best = self.nearest(option_type, dte, |c| (c.strike - target_price).abs())?;
        debug!(%option_type, dte, target_price, strike = best.strike, "strike selected by price");
        Ok(best)
    }

    pub fn by_delta(
        &self,
        target_delta: f64,
        option_type: OptionType,
        dte: u32,
    ) -> Result<f64, ChainError> {
        self.contract_by_delta(target_delta, option_type, dte)
            .map(|c| c.strike)
    }

    pub fn by_price(
        &self,
        target_price: f64,
        option_type: OptionType,
        dte: u32,
    ) -> Result<f64, ChainError> {
        self.contract_by_price(target_price, option_type, dte)
            .map(|c| c.strike)
    }

    fn nearest<F>(
        &self,
        option_type: OptionType,
        dte: u32,
        distance: F,
    ) -> Result<&'a OptionContract, ChainError>
    where
        F: Fn(&OptionContract) -> f64,
    {
        let at_dte = first_minimum(
            self.chain
                .of_type(option_type)
                .filter(|c| c.dte == dte),
            &distance,
        );
        if let Some(best) = at_dte {
            return Ok(best);
        }

        warn!(%option_type, dte, "no contracts at requested expiration, searching all expirations");
        first_minimum(self.chain.of_type(option_type), &distance)
            .ok_or(ChainError::NoMatchingContract { option_type, dte })
    }
}

/// Minimum by `distance`; the earliest element wins ties.
fn first_minimum<'a, I, F>(candidates: I, distance: &F) -> Option<&'a OptionContract>
where
    I: Iterator<Item = &'a OptionContract>,
    F: Fn(&OptionContract) -> f64,
{
    let mut best: Option<(&OptionContract, f64)> = None;
    for contract in candidates {
        let d = distance(contract);
        match best {
            Some((_, best_d)) if d >= best_d => {}
            _ => best = Some((contract, d)),
        }
    }
    best.map(|(c, _)| c)
}
