//! Error types for carecast-core.

/// Errors from answer validation, feature encoding, and prediction.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Returned when an age falls outside the accepted form range.
    #[error("age must be in [{min}, {max}], got {age}")]
    InvalidAge {
        /// The rejected age.
        age: u32,
        /// Smallest accepted age.
        min: u32,
        /// Largest accepted age.
        max: u32,
    },

    /// Returned when a binary choice is neither "Yes" nor "No".
    #[error("expected \"Yes\" or \"No\", got \"{raw}\"")]
    InvalidChoice {
        /// The rejected input.
        raw: String,
    },

    /// Returned when a decision threshold is NaN or outside [0.0, 1.0].
    #[error("threshold must be in [0.0, 1.0], got {threshold}")]
    InvalidThreshold {
        /// The rejected threshold.
        threshold: f64,
    },

    /// Returned when the expected feature list names a column more than once.
    #[error("feature column \"{name}\" appears at positions {first} and {second}")]
    DuplicateFeature {
        /// The duplicated column name.
        name: String,
        /// Zero-based position of the first occurrence.
        first: usize,
        /// Zero-based position of the second occurrence.
        second: usize,
    },

    /// Returned when the model width disagrees with the expected feature list.
    #[error("model expects {model_features} features, feature list has {schema_features}")]
    FeatureCountMismatch {
        /// Number of features the model takes.
        model_features: usize,
        /// Number of columns in the expected feature list.
        schema_features: usize,
    },

    /// Returned when the model is not a two-class classifier.
    #[error("model must be a binary classifier, got {n_classes} classes")]
    NotBinary {
        /// Number of classes the model reports.
        n_classes: usize,
    },

    /// Returned when the model yields a malformed probability vector.
    #[error("model returned an invalid probability vector {probs:?}")]
    InvalidProbabilities {
        /// The probabilities the model returned.
        probs: Vec<f64>,
    },

    /// Returned when the model itself fails to score a row.
    #[error("model failed to score the encoded answer")]
    Model {
        /// The underlying model error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
