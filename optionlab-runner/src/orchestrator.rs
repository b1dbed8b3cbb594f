//! Prediction orchestrator — classifier label + rules-built trade.
//!
//! Two stages per call:
//! 1. The classifier ranks the ten strategies for a feature snapshot.
//! 2. The parameter generator builds and sizes the top strategy against the
//!    chain, and the risk manager judges the result.
//!
//! The rule engine runs alongside as an audit. Disagreement with the
//! classifier is logged, never an error. Each call is independent.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use optionlab_core::domain::{FeatureError, RecommendationId, StrategyLabel, TrendStrength};
use optionlab_core::params::GenerateError;
use optionlab_core::risk::RiskValidation;
use optionlab_core::rules::StrategyRuleEngine;
use optionlab_core::{MarketFeatureSnapshot, OptionChain, ParameterGenerator, TradeParameters};

use crate::classifier::{Classifier, ClassifierError, LabelEncoder};
use crate::config::{ConfigError, EngineConfig, PredictionConfig};

#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("classifier has {n_classes} classes but the label encoder has {encoder_len}")]
    EncoderMismatch { n_classes: usize, encoder_len: usize },
}

/// A ranked strategy with its class probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub label: StrategyLabel,
    pub probability: f64,
}

/// Stage-one output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: StrategyLabel,
    /// Probability of `label`.
    pub confidence: f64,
    /// Highest-probability strategies, best first; includes `label`.
    pub alternatives: Vec<Alternative>,
}

impl Prediction {
    /// Ranked labels other than the chosen one.
    pub fn runners_up(&self) -> impl Iterator<Item = &Alternative> {
        self.alternatives.iter().filter(move |a| a.label != self.label)
    }
}

/// Who and when a recommendation is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketContext {
    pub symbol: String,
    pub as_of: NaiveDate,
}

impl MarketContext {
    pub fn new(symbol: impl Into<String>, as_of: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            as_of,
        }
    }
}

/// The handful of features a reader needs to sanity-check a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketConditions {
    pub current_price: f64,
    pub iv_rank: f64,
    pub adx_14: f64,
    pub rsi_14: f64,
    pub trend_regime: u8,
    pub volatility_regime: u8,
    pub trend_strength: TrendStrength,
}

impl MarketConditions {
    pub fn from_snapshot(snapshot: &MarketFeatureSnapshot) -> Self {
        let x = snapshot.rule_inputs();
        Self {
            current_price: snapshot.current_price(),
            iv_rank: x.iv_rank(),
            adx_14: x.adx_14(),
            rsi_14: x.rsi_14(),
            trend_regime: x.trend_regime(),
            volatility_regime: x.volatility_regime(),
            trend_strength: TrendStrength::classify(x),
        }
    }

    pub fn trend_name(&self) -> &'static str {
        match self.trend_regime {
            0 => "Strong Down",
            1 => "Weak Down",
            2 => "Ranging",
            3 => "Weak Up",
            _ => "Strong Up",
        }
    }
}

/// Full result bundle for one symbol-day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: RecommendationId,
    pub symbol: String,
    pub as_of: NaiveDate,
    pub label: StrategyLabel,
    pub confidence: f64,
    pub alternatives: Vec<Alternative>,
    /// Rule-engine label, when auditing is enabled.
    pub rule_label: Option<StrategyLabel>,
    pub agrees_with_rules: Option<bool>,
    pub market: MarketConditions,
    pub trade: TradeParameters,
    pub validation: RiskValidation,
    /// Set when the top label could not be built and a runner-up was used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_from: Option<StrategyLabel>,
}

/// Coordinates the classifier, rule audit, trade generation and risk gate.
///
/// Holds only immutable configuration; share one instance across threads.
pub struct PredictionOrchestrator<'a> {
    classifier: &'a dyn Classifier,
    encoder: LabelEncoder,
    generator: ParameterGenerator,
    rules: StrategyRuleEngine,
    settings: PredictionConfig,
}

impl<'a> PredictionOrchestrator<'a> {
    pub fn new(
        config: &EngineConfig,
        classifier: &'a dyn Classifier,
        encoder: LabelEncoder,
    ) -> Result<Self, PredictError> {
        config.validate()?;
        if classifier.n_classes() != encoder.len() {
            return Err(PredictError::EncoderMismatch {
                n_classes: classifier.n_classes(),
                encoder_len: encoder.len(),
            });
        }
        let risk = config.risk_manager().map_err(ConfigError::from)?;
        Ok(Self {
            classifier,
            encoder,
            generator: ParameterGenerator::new(risk),
            rules: StrategyRuleEngine::new(),
            settings: config.prediction.clone(),
        })
    }

    pub fn encoder(&self) -> &LabelEncoder {
        &self.encoder
    }

    pub fn generator(&self) -> &ParameterGenerator {
        &self.generator
    }

    /// Stage one: rank strategies for a snapshot.
    pub fn predict(&self, snapshot: &MarketFeatureSnapshot) -> Result<Prediction, PredictError> {
        let features = match self.classifier.feature_names() {
            Some(names) => snapshot.ordered(names)?,
            None => snapshot.to_feature_vector().to_vec(),
        };

        let index = self.classifier.predict(&features)?;
        let probabilities = self.classifier.predict_probability(&features)?;
        if probabilities.len() != self.encoder.len() {
            return Err(ClassifierError::ProbabilityCount {
                expected: self.encoder.len(),
                actual: probabilities.len(),
            }
            .into());
        }

        let label = self.encoder.decode(index)?;
        let confidence = probabilities[index];

        // Stable sort keeps lower class indices first on ties.
        let mut ranked: Vec<usize> = (0..probabilities.len()).collect();
        ranked.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]));
        let alternatives = ranked
            .into_iter()
            .take(self.settings.top_k)
            .map(|i| {
                Ok(Alternative {
                    label: self.encoder.decode(i)?,
                    probability: probabilities[i],
                })
            })
            .collect::<Result<Vec<_>, ClassifierError>>()?;

        Ok(Prediction {
            label,
            confidence,
            alternatives,
        })
    }

    /// Both stages for the classifier's top label.
    pub fn recommend(
        &self,
        context: &MarketContext,
        snapshot: &MarketFeatureSnapshot,
        chain: &OptionChain,
    ) -> Result<Recommendation, PredictError> {
        let prediction = self.predict(snapshot)?;
        let trade = self
            .generator
            .generate_for_snapshot(prediction.label, chain, snapshot)?;
        let chosen = Alternative {
            label: prediction.label,
            probability: prediction.confidence,
        };
        Ok(self.assemble(context, snapshot, prediction, chosen, trade, None))
    }

    /// Like [`recommend`](Self::recommend), but when the chain cannot support
    /// the top label, tries the ranked alternatives in order.
    ///
    /// Only chain errors trigger a retry; anything else is returned at once.
    pub fn recommend_with_fallback(
        &self,
        context: &MarketContext,
        snapshot: &MarketFeatureSnapshot,
        chain: &OptionChain,
    ) -> Result<Recommendation, PredictError> {
        let prediction = self.predict(snapshot)?;
        let mut candidates = vec![Alternative {
            label: prediction.label,
            probability: prediction.confidence,
        }];
        candidates.extend(prediction.runners_up().copied());

        let mut first_error = None;
        for chosen in candidates {
            let label = chosen.label;
            match self.generator.generate_for_snapshot(label, chain, snapshot) {
                Ok(trade) => {
                    let fallback_from = (label != prediction.label).then_some(prediction.label);
                    if let Some(from) = fallback_from {
                        warn!(symbol = %context.symbol, %from, to = %label, "top strategy not buildable, using alternative");
                    }
                    return Ok(self.assemble(
                        context,
                        snapshot,
                        prediction,
                        chosen,
                        trade,
                        fallback_from,
                    ));
                }
                Err(GenerateError::Chain(err)) => {
                    warn!(symbol = %context.symbol, %label, error = %err, "strategy not buildable on this chain");
                    if first_error.is_none() {
                        first_error = Some(GenerateError::Chain(err));
                    }
                }
                Err(other) => return Err(other.into()),
            }
        }
        // `candidates` is never empty, so an error was recorded.
        Err(first_error
            .unwrap_or(GenerateError::Chain(optionlab_core::ChainError::EmptyChain))
            .into())
    }

    fn assemble(
        &self,
        context: &MarketContext,
        snapshot: &MarketFeatureSnapshot,
        prediction: Prediction,
        chosen: Alternative,
        trade: TradeParameters,
        fallback_from: Option<StrategyLabel>,
    ) -> Recommendation {
        let rule_label = self
            .settings
            .audit_with_rules
            .then(|| self.rules.select_snapshot(snapshot));
        let agrees_with_rules = rule_label.map(|r| r == trade.strategy);
        if agrees_with_rules == Some(false) {
            warn!(
                symbol = %context.symbol,
                emitted = %trade.strategy,
                rules = ?rule_label,
                "classifier and rule engine disagree"
            );
        }

        let profit_estimate = trade.max_profit.estimate(
            trade.max_loss,
            self.settings.unlimited_profit_multiple,
            self.settings.variable_profit_multiple,
        );
        let validation = self
            .generator
            .risk_manager()
            .validate_trade(trade.max_loss, profit_estimate);
        if !validation.approved {
            let reasons: Vec<String> = validation.rejections.iter().map(|r| r.to_string()).collect();
            warn!(symbol = %context.symbol, strategy = %trade.strategy, reasons = ?reasons, "trade rejected by risk gate");
        }

        let id = recommendation_id(context, snapshot, trade.strategy);
        info!(
            id = %id.short(),
            symbol = %context.symbol,
            strategy = %trade.strategy,
            confidence = chosen.probability,
            contracts = trade.contracts,
            approved = validation.approved,
            "recommendation ready"
        );

        Recommendation {
            id,
            symbol: context.symbol.clone(),
            as_of: context.as_of,
            label: trade.strategy,
            confidence: chosen.probability,
            alternatives: prediction.alternatives,
            rule_label,
            agrees_with_rules,
            market: MarketConditions::from_snapshot(snapshot),
            trade,
            validation,
            fallback_from,
        }
    }
}

/// BLAKE3 over symbol, date, chosen strategy and the raw feature bits.
fn recommendation_id(
    context: &MarketContext,
    snapshot: &MarketFeatureSnapshot,
    label: StrategyLabel,
) -> RecommendationId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(context.symbol.as_bytes());
    hasher.update(context.as_of.to_string().as_bytes());
    hasher.update(label.as_str().as_bytes());
    for value in snapshot.to_feature_vector() {
        hasher.update(&value.to_bits().to_le_bytes());
    }
    RecommendationId::from_hash(hasher.finalize().to_hex().as_str())
}
