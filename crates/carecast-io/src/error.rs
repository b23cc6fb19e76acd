//! I/O error types for carecast-io.

use std::path::PathBuf;

use carecast_core::CoreError;
use carecast_forest::ForestError;

/// Errors from loading startup artifacts and writing reports.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required startup artifact does not exist.
    #[error("required file not found: {path}")]
    ArtifactNotFound {
        /// Path that was attempted.
        path: PathBuf,
    },

    /// Returned when an artifact exists but cannot be read.
    #[error("cannot read {path}")]
    ReadArtifact {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the feature list is not a JSON array of strings.
    #[error("feature list {path} is not a JSON array of column names")]
    ParseFeatureList {
        /// Path to the feature list.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// Returned when the model file cannot be decoded into a forest.
    #[error("cannot load model from {path}")]
    LoadModel {
        /// Path to the model file.
        path: PathBuf,
        /// Underlying model error.
        source: ForestError,
    },

    /// Returned when the model's own column names disagree with the feature list.
    #[error("model column {position} is \"{model}\" but the feature list has \"{list}\"")]
    FeatureNameMismatch {
        /// Zero-based column position.
        position: usize,
        /// Column name stored in the model.
        model: String,
        /// Column name in the feature list.
        list: String,
    },

    /// Returned when the loaded model and feature list cannot form a predictor.
    #[error("model and feature list are incompatible")]
    IncompatibleArtifacts {
        /// Underlying validation error.
        source: CoreError,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a file cannot be written.
    #[error("cannot write file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
