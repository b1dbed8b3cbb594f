//! Seeded synthetic markets: rule inputs, feature snapshots and
//! Black-Scholes priced option chains.
//!
//! Used by tests, benches and the CLI demo. Nothing here is meant to resemble
//! a particular underlying; the goal is a chain with realistic shape (smile,
//! widening spreads, several expirations) and feature values inside their
//! documented ranges.

use rand::Rng;
use statrs::distribution::{Continuous, ContinuousCDF, Normal};
use std::collections::HashMap;
use thiserror::Error;

use crate::domain::{
    volatility_regime_from, ChainError, FeatureError, MarketFeatureSnapshot, OptionChain,
    OptionContract, OptionType, RuleInputs, FEATURE_NAMES,
};
use crate::rng::SeedHierarchy;

/// Expirations listed by [`ChainSpec::new`].
pub const DEFAULT_DTES: [u32; 6] = [7, 14, 21, 30, 45, 60];

const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Feature(#[from] FeatureError),
    #[error(transparent)]
    Chain(#[from] ChainError),
}

/// Shape of a synthetic chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSpec {
    pub spot: f64,
    /// Annualized at-the-money volatility.
    pub atm_iv: f64,
    pub dtes: Vec<u32>,
    pub risk_free_rate: f64,
    /// Strike grid spacing in price units.
    pub strike_step: f64,
    /// Strikes listed on each side of the money.
    pub strikes_per_side: u32,
}

impl ChainSpec {
    /// Default grid wide enough to reach the 10-delta wings of the longest
    /// expiration.
    pub fn new(spot: f64, atm_iv: f64) -> Self {
        let dtes = DEFAULT_DTES.to_vec();
        let strike_step = strike_step_for(spot);
        let longest = f64::from(dtes.iter().copied().max().unwrap_or(30)) / DAYS_PER_YEAR;
        let reach = (3.0 * atm_iv * longest.sqrt()).clamp(0.10, 0.90) * spot;
        let strikes_per_side = ((reach / strike_step).ceil() as u32).clamp(5, 200);
        Self {
            spot,
            atm_iv,
            dtes,
            risk_free_rate: 0.04,
            strike_step,
            strikes_per_side,
        }
    }
}

/// Listed-strike spacing typical for an underlying at this price.
pub fn strike_step_for(spot: f64) -> f64 {
    if spot < 25.0 {
        0.5
    } else if spot < 200.0 {
        1.0
    } else if spot < 500.0 {
        2.5
    } else {
        5.0
    }
}

/// At-the-money volatility implied by an IV rank, 12 % to 52 %.
pub fn atm_iv_for_rank(iv_rank: f64) -> f64 {
    0.12 + 0.004 * iv_rank.clamp(0.0, 100.0)
}

/// Build a full call/put chain over the standard strike grid and expirations.
///
/// Rows are ordered by expiration, then strike, calls before puts.
pub fn black_scholes_chain(spec: &ChainSpec) -> Result<OptionChain, ChainError> {
    let normal = Normal::new(0.0, 1.0).map_err(|e| ChainError::InvalidContract {
        reason: e.to_string(),
    })?;
    let center = (spec.spot / spec.strike_step).round() * spec.strike_step;
    let side = i64::from(spec.strikes_per_side);

    let mut contracts = Vec::new();
    for &dte in &spec.dtes {
        for i in -side..=side {
            let strike = center + i as f64 * spec.strike_step;
            if strike <= 0.0 {
                continue;
            }
            for option_type in [OptionType::Call, OptionType::Put] {
                contracts.push(price_contract(&normal, spec, strike, option_type, dte));
            }
        }
    }
    OptionChain::new(contracts)
}

/// Volatility smile: higher away from the money, a little higher on the put side.
fn smile(atm_iv: f64, moneyness: f64) -> f64 {
    (atm_iv * (1.0 + 0.5 * moneyness * moneyness) - 0.1 * moneyness * atm_iv).max(0.05)
}

fn price_contract(
    normal: &Normal,
    spec: &ChainSpec,
    strike: f64,
    option_type: OptionType,
    dte: u32,
) -> OptionContract {
    let s = spec.spot;
    let r = spec.risk_free_rate;
    let t = f64::from(dte.max(1)) / DAYS_PER_YEAR;
    let iv = smile(spec.atm_iv, (strike / s).ln());
    let vol_t = iv * t.sqrt();

    let d1 = ((s / strike).ln() + (r + 0.5 * iv * iv) * t) / vol_t;
    let d2 = d1 - vol_t;
    let discount = (-r * t).exp();
    let pdf = normal.pdf(d1);

    let (fair, delta, rho_term) = match option_type {
        OptionType::Call => (
            s * normal.cdf(d1) - strike * discount * normal.cdf(d2),
            normal.cdf(d1),
            -r * strike * discount * normal.cdf(d2),
        ),
        OptionType::Put => (
            strike * discount * normal.cdf(-d2) - s * normal.cdf(-d1),
            normal.cdf(d1) - 1.0,
            r * strike * discount * normal.cdf(-d2),
        ),
    };
    let gamma = pdf / (s * vol_t);
    let vega = s * pdf * t.sqrt() / 100.0;
    let theta = (-(s * pdf * iv) / (2.0 * t.sqrt()) + rho_term) / DAYS_PER_YEAR;

    let mid = fair.max(0.01);
    let half_spread = (mid * 0.02).max(0.025);
    let bid = ((mid - half_spread) * 100.0).round().max(0.0) / 100.0;
    let ask = ((mid + half_spread) * 100.0).round() / 100.0;

    // Open interest peaks at the money and fades into the wings.
    let moneyness = (strike / s).ln().abs();
    let open_interest = (5_000.0 * (-moneyness * 12.0).exp()).round() as u64 + 10;

    OptionContract {
        strike,
        option_type,
        dte,
        expiration: None,
        bid,
        ask: ask.max(bid),
        volume: open_interest / 5,
        open_interest,
        iv,
        delta: delta.clamp(-1.0, 1.0),
        gamma,
        theta,
        vega,
    }
}

/// One draw of rule inputs covering the full documented ranges.
pub fn sample_rule_inputs<R: Rng + ?Sized>(rng: &mut R) -> RuleInputs {
    let iv_rank = rng.gen_range(0.0..100.0);
    // Every range sits inside the bounds `RuleInputs::new` enforces.
    RuleInputs {
        iv_rank,
        adx_14: rng.gen_range(5.0..45.0),
        trend_regime: rng.gen_range(0..=4),
        rsi_14: rng.gen_range(20.0..80.0),
        price_vs_sma_20: rng.gen_range(-0.06..0.06),
        volatility_regime: volatility_regime_from(iv_rank),
    }
}

/// A complete feature snapshot around the given rule inputs.
///
/// Every published feature receives a value; the ones the rules read come
/// from `inputs`, the rest are plausible noise.
pub fn feature_snapshot<R: Rng + ?Sized>(
    rng: &mut R,
    inputs: &RuleInputs,
    spot: f64,
) -> Result<MarketFeatureSnapshot, FeatureError> {
    let mut values: HashMap<String, f64> = FEATURE_NAMES
        .iter()
        .map(|name| (name.to_string(), rng.gen_range(-1.0..1.0)))
        .collect();

    let sma_20 = spot / (1.0 + inputs.price_vs_sma_20);
    let atm_iv = atm_iv_for_rank(inputs.iv_rank);
    let known = [
        ("current_price", spot),
        ("iv_rank", inputs.iv_rank),
        ("iv_percentile", inputs.iv_rank),
        ("adx_14", inputs.adx_14),
        ("trend_regime", f64::from(inputs.trend_regime)),
        ("rsi_14", inputs.rsi_14),
        ("price_vs_sma_20", inputs.price_vs_sma_20),
        ("sma_20", sma_20),
        ("bb_middle", sma_20),
        ("volatility_regime", f64::from(inputs.volatility_regime)),
        ("iv_atm", atm_iv),
        ("hv_20d", atm_iv * rng.gen_range(0.8..1.2)),
        ("vix_level", 12.0 + inputs.iv_rank * 0.25),
        ("volume_20d_avg", rng.gen_range(1.0e6..5.0e7)),
    ];
    for (name, value) in known {
        values.insert(name.to_string(), value);
    }
    MarketFeatureSnapshot::from_map(&values)
}

/// One synthetic symbol-day.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub symbol: String,
    pub snapshot: MarketFeatureSnapshot,
    pub chain: OptionChain,
}

/// Seeded source of synthetic markets.
///
/// Each `(symbol, index)` pair draws from its own sub-seed, so scenarios can
/// be generated in any order or in parallel with identical results.
#[derive(Debug, Clone, Copy)]
pub struct MarketGenerator {
    seeds: SeedHierarchy,
}

impl MarketGenerator {
    pub fn new(master_seed: u64) -> Self {
        Self {
            seeds: SeedHierarchy::new(master_seed),
        }
    }

    pub fn seeds(&self) -> &SeedHierarchy {
        &self.seeds
    }

    /// `count` independent rule-input draws.
    pub fn rule_inputs(&self, stream: &str, count: usize) -> Vec<RuleInputs> {
        let mut rng = self.seeds.rng_for(stream, 0);
        (0..count).map(|_| sample_rule_inputs(&mut rng)).collect()
    }

    pub fn scenario(&self, symbol: &str, index: u64) -> Result<Scenario, ScenarioError> {
        let mut rng = self.seeds.rng_for(symbol, index);
        let inputs = sample_rule_inputs(&mut rng);
        self.scenario_with(symbol, index, &inputs)
    }

    /// Scenario around fixed rule inputs; only the spot and noise are drawn.
    pub fn scenario_with(
        &self,
        symbol: &str,
        index: u64,
        inputs: &RuleInputs,
    ) -> Result<Scenario, ScenarioError> {
        let mut rng = self.seeds.rng_for(symbol, index.wrapping_add(1 << 32));
        let spot: f64 = rng.gen_range(40.0..450.0);
        let spot = (spot * 100.0).round() / 100.0;
        let snapshot = feature_snapshot(&mut rng, inputs, spot)?;
        let chain = black_scholes_chain(&ChainSpec::new(spot, atm_iv_for_rank(inputs.iv_rank)))?;
        Ok(Scenario {
            symbol: symbol.to_string(),
            snapshot,
            chain,
        })
    }
}
