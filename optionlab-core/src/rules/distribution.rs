//! Label-frequency validation against the calibrated target bands.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::StrategyLabel;

/// Realized share of one strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyShare {
    pub label: StrategyLabel,
    pub count: usize,
    pub percentage: f64,
    pub target: (f64, f64),
    pub within_target: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionReport {
    pub total: usize,
    /// One entry per strategy, in canonical order.
    pub shares: Vec<StrategyShare>,
    /// Strategies that never occurred.
    pub missing: Vec<StrategyLabel>,
}

impl DistributionReport {
    /// Every strategy occurred and landed inside its band.
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty() && self.shares.iter().all(|s| s.within_target)
    }

    pub fn share(&self, label: StrategyLabel) -> Option<&StrategyShare> {
        self.shares.iter().find(|s| s.label == label)
    }

    pub fn out_of_band(&self) -> impl Iterator<Item = &StrategyShare> {
        self.shares.iter().filter(|s| !s.within_target)
    }
}

/// Count labels and compare each percentage with its target band.
pub fn validate_strategy_distribution(labels: &[StrategyLabel]) -> DistributionReport {
    let mut counts: BTreeMap<StrategyLabel, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(*label).or_default() += 1;
    }

    let total = labels.len();
    let shares: Vec<StrategyShare> = StrategyLabel::ALL
        .iter()
        .map(|&label| {
            let count = counts.get(&label).copied().unwrap_or(0);
            let percentage = if total == 0 {
                0.0
            } else {
                count as f64 * 100.0 / total as f64
            };
            let target = label.target_band();
            StrategyShare {
                label,
                count,
                percentage,
                target,
                within_target: count > 0 && percentage >= target.0 && percentage <= target.1,
            }
        })
        .collect();

    let missing = shares
        .iter()
        .filter(|s| s.count == 0)
        .map(|s| s.label)
        .collect();

    DistributionReport {
        total,
        shares,
        missing,
    }
}
