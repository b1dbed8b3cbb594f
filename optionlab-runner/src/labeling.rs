//! Batch labeling — the rule engine over many snapshots at once.
//!
//! Labels are the training targets for a learned classifier, so every row
//! keeps its date and the rule that produced its label.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::io::Write;

use optionlab_core::domain::{RuleInputs, StrategyLabel};
use optionlab_core::rules::{validate_strategy_distribution, DistributionReport, RuleMatch, StrategyRuleEngine};

use crate::loader::FeatureRow;

/// Labels for a batch, in input order.
pub fn label_snapshots(inputs: &[RuleInputs]) -> Vec<StrategyLabel> {
    let engine = StrategyRuleEngine::new();
    inputs.par_iter().map(|x| engine.select(x)).collect()
}

/// One labeled row of a feature file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledRow {
    pub date: NaiveDate,
    pub label: StrategyLabel,
    /// Rule name, or `fallback`.
    pub rule: &'static str,
}

/// Label every row and report the resulting distribution.
pub fn label_feature_rows(rows: &[FeatureRow]) -> (Vec<LabeledRow>, DistributionReport) {
    let engine = StrategyRuleEngine::new();
    let labeled: Vec<LabeledRow> = rows
        .par_iter()
        .map(|row| {
            let decision = engine.explain(row.snapshot.rule_inputs());
            LabeledRow {
                date: row.date,
                label: decision.label,
                rule: match decision.matched {
                    RuleMatch::Rule { name, .. } => name,
                    RuleMatch::Fallback => "fallback",
                },
            }
        })
        .collect();
    let labels: Vec<StrategyLabel> = labeled.iter().map(|r| r.label).collect();
    let report = validate_strategy_distribution(&labels);
    (labeled, report)
}

/// Write labeled rows as CSV (`date,label,rule`).
pub fn write_labels<W: Write>(writer: W, rows: &[LabeledRow]) -> Result<(), csv::Error> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}
