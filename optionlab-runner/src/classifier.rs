//! Classifier capability and label encoding.
//!
//! A learned model is an external collaborator: it sees an ordered feature
//! vector and answers with a class index plus a probability per class. The
//! [`LabelEncoder`] that ships with the model maps those indices back to
//! [`StrategyLabel`]s.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use optionlab_core::domain::{RuleInputs, StrategyLabel, UnsupportedStrategy, FEATURE_NAMES};
use optionlab_core::rules::StrategyRuleEngine;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassifierError {
    #[error("feature vector has {actual} values, model expects {expected}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("class index {index} outside 0..{n_classes}")]
    ClassIndex { index: usize, n_classes: usize },

    #[error("model returned {actual} probabilities for {expected} classes")]
    ProbabilityCount { expected: usize, actual: usize },

    #[error("model error: {0}")]
    Model(String),

    #[error(transparent)]
    UnsupportedStrategy(#[from] UnsupportedStrategy),

    #[error("label encoder repeats '{0}'")]
    DuplicateLabel(StrategyLabel),
}

/// A trained strategy classifier.
pub trait Classifier: Send + Sync {
    /// Number of output classes.
    fn n_classes(&self) -> usize;

    /// Most likely class for one feature vector.
    fn predict(&self, features: &[f64]) -> Result<usize, ClassifierError>;

    /// Probability per class, indexed like the label encoder.
    fn predict_probability(&self, features: &[f64]) -> Result<Vec<f64>, ClassifierError>;

    /// Feature ordering the model was trained with, if it differs from
    /// [`FEATURE_NAMES`].
    fn feature_names(&self) -> Option<&[String]> {
        None
    }
}

/// Class index ↔ strategy table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<StrategyLabel>,
}

impl LabelEncoder {
    /// All ten strategies, sorted by name.
    ///
    /// Matches how models fitted with a string label encoder number their
    /// classes.
    pub fn fitted() -> Self {
        let mut classes = StrategyLabel::ALL.to_vec();
        classes.sort_by_key(|label| label.as_str());
        Self { classes }
    }

    /// Build from the class names shipped with a model, in index order.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, ClassifierError> {
        let mut classes = Vec::with_capacity(names.len());
        for name in names {
            let label: StrategyLabel = name.as_ref().parse()?;
            if classes.contains(&label) {
                return Err(ClassifierError::DuplicateLabel(label));
            }
            classes.push(label);
        }
        Ok(Self { classes })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn classes(&self) -> &[StrategyLabel] {
        &self.classes
    }

    pub fn decode(&self, index: usize) -> Result<StrategyLabel, ClassifierError> {
        self.classes
            .get(index)
            .copied()
            .ok_or(ClassifierError::ClassIndex {
                index,
                n_classes: self.classes.len(),
            })
    }

    pub fn encode(&self, label: StrategyLabel) -> Option<usize> {
        self.classes.iter().position(|c| *c == label)
    }
}

impl Default for LabelEncoder {
    fn default() -> Self {
        Self::fitted()
    }
}

/// A [`Classifier`] that answers with the rule engine's label.
///
/// Probabilities are one-hot. Used when no learned model is available.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedClassifier {
    engine: StrategyRuleEngine,
    encoder: LabelEncoder,
}

impl RuleBasedClassifier {
    pub fn new(encoder: LabelEncoder) -> Self {
        Self {
            engine: StrategyRuleEngine::new(),
            encoder,
        }
    }

    pub fn encoder(&self) -> &LabelEncoder {
        &self.encoder
    }

    fn rule_inputs(&self, features: &[f64]) -> Result<RuleInputs, ClassifierError> {
        if features.len() != FEATURE_NAMES.len() {
            return Err(ClassifierError::FeatureCount {
                expected: FEATURE_NAMES.len(),
                actual: features.len(),
            });
        }
        let snapshot = optionlab_core::MarketFeatureSnapshot::from_ordered(features.to_vec())
            .map_err(|e| ClassifierError::Model(e.to_string()))?;
        Ok(*snapshot.rule_inputs())
    }
}

impl Classifier for RuleBasedClassifier {
    fn n_classes(&self) -> usize {
        self.encoder.len()
    }

    fn predict(&self, features: &[f64]) -> Result<usize, ClassifierError> {
        let label = self.engine.select(&self.rule_inputs(features)?);
        self.encoder
            .encode(label)
            .ok_or_else(|| ClassifierError::Model(format!("encoder has no class for {label}")))
    }

    fn predict_probability(&self, features: &[f64]) -> Result<Vec<f64>, ClassifierError> {
        let index = self.predict(features)?;
        let mut probabilities = vec![0.0; self.n_classes()];
        probabilities[index] = 1.0;
        Ok(probabilities)
    }
}
