//! Option contracts and the immutable chain snapshot they live in.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Strikes are compared with this tolerance when looking up an exact contract.
const STRIKE_EPSILON: f64 = 1e-9;

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Call => "call",
            Self::Put => "put",
        }
    }

    /// +1 for calls, -1 for puts.
    pub fn sign(&self) -> f64 {
        match self {
            Self::Call => 1.0,
            Self::Put => -1.0,
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionType {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(Self::Call),
            "put" | "p" => Ok(Self::Put),
            other => Err(ChainError::InvalidContract {
                reason: format!("unknown option type '{other}'"),
            }),
        }
    }
}

/// A single row of an option chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    pub strike: f64,
    pub option_type: OptionType,
    pub dte: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<NaiveDate>,
    pub bid: f64,
    pub ask: f64,
    pub volume: u64,
    pub open_interest: u64,
    pub iv: f64,
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
}

impl OptionContract {
    /// Mid-point of the quoted market.
    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    /// Check the row-level invariants of a tradable contract.
    pub fn validate(&self) -> Result<(), ChainError> {
        let invalid = |reason: String| Err(ChainError::InvalidContract { reason });

        if !(self.strike.is_finite() && self.strike > 0.0) {
            return invalid(format!("strike must be positive, got {}", self.strike));
        }
        if !(self.bid.is_finite() && self.ask.is_finite()) || self.bid < 0.0 || self.ask < 0.0 {
            return invalid(format!(
                "{} {} quotes must be non-negative (bid {}, ask {})",
                self.option_type, self.strike, self.bid, self.ask
            ));
        }
        if self.bid > self.ask {
            return invalid(format!(
                "{} {} bid {} exceeds ask {}",
                self.option_type, self.strike, self.bid, self.ask
            ));
        }
        if !(self.iv.is_finite() && self.iv > 0.0) {
            return invalid(format!(
                "{} {} implied volatility must be positive, got {}",
                self.option_type, self.strike, self.iv
            ));
        }
        let delta_ok = match self.option_type {
            OptionType::Call => (0.0..=1.0).contains(&self.delta),
            OptionType::Put => (-1.0..=0.0).contains(&self.delta),
        };
        if !delta_ok {
            return invalid(format!(
                "{} {} delta {} outside the range for its type",
                self.option_type, self.strike, self.delta
            ));
        }
        if ![self.gamma, self.theta, self.vega].iter().all(|g| g.is_finite()) {
            return invalid(format!("{} {} has non-finite greeks", self.option_type, self.strike));
        }
        Ok(())
    }

    fn matches(&self, strike: f64, option_type: OptionType, dte: u32) -> bool {
        self.option_type == option_type
            && self.dte == dte
            && (self.strike - strike).abs() < STRIKE_EPSILON
    }
}

/// Chain lookup and validation failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChainError {
    #[error("option chain is empty")]
    EmptyChain,

    #[error("no {option_type} contracts in chain (requested {dte} DTE)")]
    NoMatchingContract { option_type: OptionType, dte: u32 },

    #[error("contract not found: {option_type} {strike} {dte}DTE")]
    ContractNotFound {
        option_type: OptionType,
        strike: f64,
        dte: u32,
    },

    #[error("invalid contract: {reason}")]
    InvalidContract { reason: String },
}

/// All tradable contracts for one underlying at one snapshot time.
///
/// Row order is preserved from construction; strike selection breaks ties by
/// this order. The chain cannot be mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChain {
    contracts: Vec<OptionContract>,
}

impl OptionChain {
    pub fn new(contracts: Vec<OptionContract>) -> Result<Self, ChainError> {
        if contracts.is_empty() {
            return Err(ChainError::EmptyChain);
        }
        for contract in &contracts {
            contract.validate()?;
        }
        Ok(Self { contracts })
    }

    pub fn contracts(&self) -> &[OptionContract] {
        &self.contracts
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    /// Distinct expirations, ascending.
    pub fn available_dtes(&self) -> Vec<u32> {
        let mut dtes: Vec<u32> = self.contracts.iter().map(|c| c.dte).collect();
        dtes.sort_unstable();
        dtes.dedup();
        dtes
    }

    /// Contracts of one type, in chain order.
    pub fn of_type(&self, option_type: OptionType) -> impl Iterator<Item = &OptionContract> {
        self.contracts
            .iter()
            .filter(move |c| c.option_type == option_type)
    }

    /// Exact lookup by strike, type and expiration. No substitution.
    pub fn find(
        &self,
        strike: f64,
        option_type: OptionType,
        dte: u32,
    ) -> Result<&OptionContract, ChainError> {
        self.contracts
            .iter()
            .find(|c| c.matches(strike, option_type, dte))
            .ok_or(ChainError::ContractNotFound {
                option_type,
                strike,
                dte,
            })
    }

    /// Price paid to buy the contract.
    pub fn ask(&self, strike: f64, option_type: OptionType, dte: u32) -> Result<f64, ChainError> {
        self.find(strike, option_type, dte).map(|c| c.ask)
    }

    /// Price received to sell the contract.
    pub fn bid(&self, strike: f64, option_type: OptionType, dte: u32) -> Result<f64, ChainError> {
        self.find(strike, option_type, dte).map(|c| c.bid)
    }
}
