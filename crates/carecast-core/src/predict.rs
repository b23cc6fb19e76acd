//! Thresholded treatment prediction with a fixed-width confidence band.

use std::fmt;

use tracing::{debug, instrument};

use crate::answer::RawAnswer;
use crate::encode::FeatureSchema;
use crate::error::CoreError;
use crate::model::ProbabilityModel;

/// Half-width of the reported confidence band.
///
/// The band is a fixed heuristic, not a statistically derived interval.
pub const CONFIDENCE_BAND: f64 = 0.05;

/// Probability cutoff for choosing the positive class.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Threshold(f64);

impl Threshold {
    /// The shipped cutoff, deliberately below 0.5 to favour the positive class.
    pub const DEFAULT: Threshold = Threshold(0.4);

    /// Validate a threshold.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidThreshold`] when `value` is NaN or outside `[0.0, 1.0]`.
    pub fn new(value: f64) -> Result<Self, CoreError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(CoreError::InvalidThreshold { threshold: value });
        }
        Ok(Self(value))
    }

    /// Return the raw cutoff.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Heuristic band around a confidence value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInterval {
    /// Lower edge, at least 0.
    pub low: f64,
    /// Upper edge, at most 1.
    pub high: f64,
}

impl ConfidenceInterval {
    /// `confidence ± CONFIDENCE_BAND`, clipped to `[0, 1]`.
    #[must_use]
    pub fn around(confidence: f64) -> Self {
        Self {
            low: (confidence - CONFIDENCE_BAND).max(0.0),
            high: (confidence + CONFIDENCE_BAND).min(1.0),
        }
    }
}

/// Binary outcome of a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Class 0: unlikely to seek treatment.
    Unlikely,
    /// Class 1: likely to seek treatment.
    Likely,
}

impl Decision {
    /// Return the class label (0 or 1).
    #[must_use]
    pub fn class(self) -> usize {
        match self {
            Decision::Unlikely => 0,
            Decision::Likely => 1,
        }
    }

    /// Return `true` for the positive class.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self == Decision::Likely
    }
}

/// Outcome of one prediction.
///
/// `confidence` is the probability of the chosen class, and
/// `ci_low..=ci_high` is `confidence ± CONFIDENCE_BAND` clipped to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    /// The chosen class.
    pub decision: Decision,
    /// Probability of the chosen class.
    pub confidence: f64,
    /// Lower edge of the heuristic band.
    pub ci_low: f64,
    /// Upper edge of the heuristic band.
    pub ci_high: f64,
}

impl PredictionResult {
    /// Turn a class-1 probability into a decision.
    ///
    /// Chooses class 1 when `p1 >= threshold`.
    #[must_use]
    pub fn from_probability(p1: f64, threshold: Threshold) -> Self {
        let (decision, confidence) = if p1 >= threshold.value() {
            (Decision::Likely, p1)
        } else {
            (Decision::Unlikely, 1.0 - p1)
        };
        let band = ConfidenceInterval::around(confidence);
        Self {
            decision,
            confidence,
            ci_low: band.low,
            ci_high: band.high,
        }
    }

    /// Return the band as a [`ConfidenceInterval`].
    #[must_use]
    pub fn interval(&self) -> ConfidenceInterval {
        ConfidenceInterval {
            low: self.ci_low,
            high: self.ci_high,
        }
    }
}

/// A loaded classifier bound to its feature layout and decision threshold.
///
/// Built once at startup and only read afterwards.
#[derive(Debug)]
pub struct Predictor<M> {
    model: M,
    schema: FeatureSchema,
    threshold: Threshold,
}

impl<M: ProbabilityModel> Predictor<M> {
    /// Bind a model to its expected feature layout, using [`Threshold::DEFAULT`].
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`CoreError::FeatureCountMismatch`] | model width differs from `schema.len()` |
    /// | [`CoreError::NotBinary`] | model does not have exactly two classes |
    pub fn new(model: M, schema: FeatureSchema) -> Result<Self, CoreError> {
        if model.n_features() != schema.len() {
            return Err(CoreError::FeatureCountMismatch {
                model_features: model.n_features(),
                schema_features: schema.len(),
            });
        }
        if model.n_classes() != 2 {
            return Err(CoreError::NotBinary {
                n_classes: model.n_classes(),
            });
        }
        Ok(Self {
            model,
            schema,
            threshold: Threshold::DEFAULT,
        })
    }

    /// Set the decision threshold used by [`Predictor::predict`].
    #[must_use]
    pub fn with_threshold(mut self, threshold: Threshold) -> Self {
        self.threshold = threshold;
        self
    }

    /// Return the configured threshold.
    #[must_use]
    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Return the feature layout.
    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Borrow the underlying model.
    #[must_use]
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Predict with the configured threshold.
    ///
    /// # Errors
    ///
    /// See [`Predictor::predict_with`].
    pub fn predict(&self, raw: &RawAnswer) -> Result<PredictionResult, CoreError> {
        self.predict_with(raw, self.threshold)
    }

    /// Encode `raw`, score it, and apply `threshold`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`CoreError::Model`] | the model failed to score the row |
    /// | [`CoreError::InvalidProbabilities`] | the model did not return two probabilities in `[0, 1]` |
    #[instrument(skip_all, fields(threshold = threshold.value()))]
    pub fn predict_with(
        &self,
        raw: &RawAnswer,
        threshold: Threshold,
    ) -> Result<PredictionResult, CoreError> {
        let row = self.schema.encode(raw);
        let probs = self
            .model
            .predict_proba(row.values())
            .map_err(|e| CoreError::Model { source: Box::new(e) })?;

        let p1 = match probs.as_slice() {
            [_, p1] if (0.0..=1.0).contains(p1) => Some(*p1),
            _ => None,
        };
        let Some(p1) = p1 else {
            return Err(CoreError::InvalidProbabilities { probs });
        };

        let result = PredictionResult::from_probability(p1, threshold);
        debug!(
            p1,
            decision = result.decision.class(),
            confidence = result.confidence,
            "prediction computed"
        );
        Ok(result)
    }
}
