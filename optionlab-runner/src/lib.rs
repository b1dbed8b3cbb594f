//! OptionLab Runner — two-stage recommendation serving on top of `optionlab-core`.
//!
//! This crate provides:
//! - TOML engine configuration (risk and prediction settings)
//! - The classifier capability, label encoding and a rule-backed classifier
//! - Prediction orchestrator: classifier label → sized trade → risk verdict
//! - CSV loaders for option chains and feature snapshots
//! - Parallel batch labeling for classifier training targets
//! - JSONL recommendation history and a plain-text report

pub mod classifier;
pub mod config;
pub mod history;
pub mod labeling;
pub mod loader;
pub mod orchestrator;
pub mod report;

pub use classifier::{Classifier, ClassifierError, LabelEncoder, RuleBasedClassifier};
pub use config::{ConfigError, EngineConfig, PredictionConfig, RiskConfig};
pub use history::RecommendationLog;
pub use labeling::{label_feature_rows, label_snapshots, write_labels, LabeledRow};
pub use loader::{
    load_feature_rows, load_option_chain, read_feature_rows, read_option_chain, FeatureRow,
    LoadError,
};
pub use orchestrator::{
    Alternative, MarketConditions, MarketContext, PredictError, Prediction,
    PredictionOrchestrator, Recommendation,
};
