//! Risk manager — contract sizing and the trade-approval gate.
//!
//! Sizing turns a per-contract worst case into a contract count that keeps the
//! whole position inside the account's risk budget. Validation is a pure
//! judgement over a finished trade; a rejection is an ordinary result, not an
//! error.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Trades must pay back more than this fraction of what they put at risk.
pub const MIN_RISK_REWARD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskConfigError {
    #[error("account_size must be positive, got {0}")]
    AccountSize(f64),
    #[error("risk_per_trade must be in (0, 1], got {0}")]
    RiskPerTrade(f64),
    #[error("max_contracts must be at least 1")]
    MaxContracts,
}

/// Per-caller risk configuration. Immutable once built.
///
/// # Formula
/// ```text
/// max_risk_amount = account_size * risk_per_trade
/// contracts = clamp(floor(max_risk_amount / max_loss_per_contract), 1, max_contracts)
/// ```
///
/// # Example
/// - Account: $10,000, risk 2% → $200 budget
/// - Max loss per contract: $150
/// - Contracts: floor(200 / 150) = 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RiskManagerRepr")]
pub struct RiskManager {
    account_size: f64,
    risk_per_trade: f64,
    max_contracts: u32,
}

#[derive(Deserialize)]
struct RiskManagerRepr {
    account_size: f64,
    risk_per_trade: f64,
    max_contracts: u32,
}

impl TryFrom<RiskManagerRepr> for RiskManager {
    type Error = RiskConfigError;

    fn try_from(r: RiskManagerRepr) -> Result<Self, Self::Error> {
        Self::new(r.account_size, r.risk_per_trade, r.max_contracts)
    }
}

impl Default for RiskManager {
    fn default() -> Self {
        Self {
            account_size: 10_000.0,
            risk_per_trade: 0.02,
            max_contracts: 10,
        }
    }
}

impl RiskManager {
    pub fn new(
        account_size: f64,
        risk_per_trade: f64,
        max_contracts: u32,
    ) -> Result<Self, RiskConfigError> {
        if !(account_size.is_finite() && account_size > 0.0) {
            return Err(RiskConfigError::AccountSize(account_size));
        }
        if !(risk_per_trade > 0.0 && risk_per_trade <= 1.0) {
            return Err(RiskConfigError::RiskPerTrade(risk_per_trade));
        }
        if max_contracts == 0 {
            return Err(RiskConfigError::MaxContracts);
        }
        Ok(Self {
            account_size,
            risk_per_trade,
            max_contracts,
        })
    }

    pub fn account_size(&self) -> f64 {
        self.account_size
    }

    pub fn risk_per_trade(&self) -> f64 {
        self.risk_per_trade
    }

    pub fn max_contracts(&self) -> u32 {
        self.max_contracts
    }

    /// Dollar budget for a single trade.
    pub fn max_risk_amount(&self) -> f64 {
        self.account_size * self.risk_per_trade
    }

    /// Number of contracts to trade, always in `1..=max_contracts`.
    ///
    /// A non-positive risk unit cannot be sized against and returns 1.
    pub fn calculate_position_size(&self, max_loss_per_contract: f64) -> u32 {
        if max_loss_per_contract <= 0.0 || max_loss_per_contract.is_nan() {
            return 1;
        }
        // `as` saturates, so an enormous budget/loss ratio still clamps cleanly.
        let raw = (self.max_risk_amount() / max_loss_per_contract).floor() as u32;
        let contracts = raw.clamp(1, self.max_contracts);
        debug!(max_loss_per_contract, contracts, "position sized");
        contracts
    }

    /// Approve or reject a trade by its total worst case and best case.
    pub fn validate_trade(&self, max_loss: f64, max_profit: f64) -> RiskValidation {
        let loss = max_loss.abs();
        let risk_reward_ratio = if max_loss == 0.0 { 0.0 } else { max_profit / loss };
        let risk_percentage = loss / self.account_size;

        let mut rejections = Vec::new();
        if risk_percentage > self.risk_per_trade {
            rejections.push(RiskRejection::RiskTooHigh {
                risk_percentage,
                limit: self.risk_per_trade,
            });
        }
        if risk_reward_ratio <= MIN_RISK_REWARD {
            rejections.push(RiskRejection::RewardTooLow {
                risk_reward_ratio,
                minimum: MIN_RISK_REWARD,
            });
        }

        RiskValidation {
            approved: rejections.is_empty(),
            risk_reward_ratio,
            risk_percentage,
            max_risk_amount: self.max_risk_amount(),
            rejections,
        }
    }
}

/// Why the approval gate failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RiskRejection {
    RiskTooHigh { risk_percentage: f64, limit: f64 },
    RewardTooLow { risk_reward_ratio: f64, minimum: f64 },
}

impl std::fmt::Display for RiskRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RiskTooHigh {
                risk_percentage,
                limit,
            } => write!(
                f,
                "risk {:.2}% of account exceeds {:.2}% limit",
                risk_percentage * 100.0,
                limit * 100.0
            ),
            Self::RewardTooLow {
                risk_reward_ratio,
                minimum,
            } => write!(f, "risk/reward {risk_reward_ratio:.2} not above {minimum:.2}"),
        }
    }
}

/// Derived judgement over a trade's worst and best case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskValidation {
    pub approved: bool,
    pub risk_reward_ratio: f64,
    pub risk_percentage: f64,
    pub max_risk_amount: f64,
    pub rejections: Vec<RiskRejection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_by_floor_of_budget() {
        let rm = RiskManager::new(10_000.0, 0.02, 10).unwrap();
        assert_eq!(rm.calculate_position_size(150.0), 1);
        assert_eq!(rm.calculate_position_size(40.0), 5);
        assert_eq!(rm.calculate_position_size(66.0), 3);
    }

    #[test]
    fn size_never_zero_or_above_cap() {
        let rm = RiskManager::default();
        assert_eq!(rm.calculate_position_size(5_000.0), 1);
        assert_eq!(rm.calculate_position_size(0.01), 10);
        assert_eq!(rm.calculate_position_size(f64::MIN_POSITIVE), 10);
    }

    #[test]
    fn non_positive_loss_sizes_to_one() {
        let rm = RiskManager::default();
        assert_eq!(rm.calculate_position_size(0.0), 1);
        assert_eq!(rm.calculate_position_size(-25.0), 1);
        assert_eq!(rm.calculate_position_size(f64::NAN), 1);
    }

    #[test]
    fn deserialization_goes_through_new() {
        let rm: RiskManager = serde_json::from_str(
            r#"{"account_size":25000.0,"risk_per_trade":0.01,"max_contracts":4}"#,
        )
        .unwrap();
        assert_eq!(rm.max_contracts(), 4);
        assert_eq!(rm.calculate_position_size(100.0), 2);

        let zero_cap = r#"{"account_size":10000.0,"risk_per_trade":0.02,"max_contracts":0}"#;
        let err = serde_json::from_str::<RiskManager>(zero_cap).unwrap_err();
        assert!(err.to_string().contains("max_contracts"));
        let big_risk = r#"{"account_size":10000.0,"risk_per_trade":1.5,"max_contracts":5}"#;
        assert!(serde_json::from_str::<RiskManager>(big_risk).is_err());
    }

    #[test]
    fn poor_reward_is_rejected() {
        let rm = RiskManager::default();
        let v = rm.validate_trade(-300.0, 100.0);
        assert!(!v.approved);
        assert!((v.risk_reward_ratio - 0.3333).abs() < 1e-3);
        assert!(v
            .rejections
            .iter()
            .any(|r| matches!(r, RiskRejection::RewardTooLow { .. })));
    }

    #[test]
    fn zero_loss_gives_zero_ratio() {
        let rm = RiskManager::default();
        let v = rm.validate_trade(0.0, 100.0);
        assert_eq!(v.risk_reward_ratio, 0.0);
        assert_eq!(v.risk_percentage, 0.0);
        assert!(!v.approved);
    }

    #[test]
    fn approves_inside_budget_with_good_reward() {
        let rm = RiskManager::default();
        let v = rm.validate_trade(150.0, 300.0);
        assert!(v.approved);
        assert_eq!(v.risk_reward_ratio, 2.0);
        assert_eq!(v.risk_percentage, 0.015);
        assert!(v.rejections.is_empty());
    }

    #[test]
    fn ratio_of_exactly_half_is_rejected() {
        let rm = RiskManager::default();
        assert!(!rm.validate_trade(100.0, 50.0).approved);
    }

    #[test]
    fn invalid_configs_rejected() {
        assert!(RiskManager::new(0.0, 0.02, 10).is_err());
        assert!(RiskManager::new(10_000.0, 0.0, 10).is_err());
        assert!(RiskManager::new(10_000.0, 1.5, 10).is_err());
        assert_eq!(
            RiskManager::new(10_000.0, 0.02, 0),
            Err(RiskConfigError::MaxContracts)
        );
    }
}
