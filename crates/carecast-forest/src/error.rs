use std::path::PathBuf;

/// Errors from assembling, loading, or querying a forest.
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    /// Returned when a tree is assembled from an empty node arena.
    #[error("decision tree has no nodes")]
    EmptyTree,

    /// Returned when a forest is assembled without any trees.
    #[error("forest must contain at least 1 tree")]
    NoTrees,

    /// Returned when a model declares fewer than two classes.
    #[error("n_classes must be at least 2, got {n_classes}")]
    InvalidClassCount {
        /// The invalid class count.
        n_classes: usize,
    },

    /// Returned when a split references a child outside the arena or at or before itself.
    #[error("node {node} references child {child}, arena has {n_nodes} nodes")]
    InvalidChild {
        /// Arena index of the offending split node.
        node: usize,
        /// The referenced child index.
        child: usize,
        /// Number of nodes in the arena.
        n_nodes: usize,
    },

    /// Returned when a split tests a feature column the tree does not have.
    #[error("node {node} splits on feature {feature}, tree has {n_features} features")]
    InvalidSplitFeature {
        /// Arena index of the offending split node.
        node: usize,
        /// The referenced feature column.
        feature: usize,
        /// Number of feature columns the tree was declared with.
        n_features: usize,
    },

    /// Returned when a split threshold is NaN or infinite.
    #[error("node {node} has a non-finite threshold")]
    NonFiniteThreshold {
        /// Arena index of the offending split node.
        node: usize,
    },

    /// Returned when a leaf distribution has the wrong length or does not sum to 1.
    #[error("leaf {node} has an invalid class distribution: {reason}")]
    InvalidDistribution {
        /// Arena index of the offending leaf.
        node: usize,
        /// Human-readable description of the problem.
        reason: String,
    },

    /// Returned when trees in one forest disagree on their shape.
    #[error("tree {tree_index} has {got_features} features and {got_classes} classes, expected {expected_features} and {expected_classes}")]
    TreeShapeMismatch {
        /// Zero-based index of the offending tree.
        tree_index: usize,
        /// Feature count of the first tree.
        expected_features: usize,
        /// Class count of the first tree.
        expected_classes: usize,
        /// Feature count of the offending tree.
        got_features: usize,
        /// Class count of the offending tree.
        got_classes: usize,
    },

    /// Returned when the feature name list does not match the tree width.
    #[error("forest has {n_features} features but {n_names} feature names")]
    FeatureNameCountMismatch {
        /// Feature count of the trees.
        n_features: usize,
        /// Number of feature names supplied.
        n_names: usize,
    },

    /// Returned when a sample has a different number of features at prediction time.
    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the prediction input.
        got: usize,
    },

    /// Returned when model serialization fails.
    #[error("failed to serialize model")]
    SerializeModel {
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when model deserialization fails.
    #[error("failed to deserialize model from {path}")]
    DeserializeModel {
        /// Path to the model file that could not be deserialized.
        path: PathBuf,
        /// The underlying bincode error.
        source: Box<bincode::ErrorKind>,
    },

    /// Returned when writing the model file fails.
    #[error("failed to write model to {path}")]
    WriteModel {
        /// Path to the file that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when reading the model file fails.
    #[error("failed to read model from {path}")]
    ReadModel {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when loading a model with an incompatible format version.
    #[error("incompatible model version in {path}: expected {expected}, found {found}")]
    IncompatibleModelVersion {
        /// The model format version this build expects.
        expected: u32,
        /// The model format version found in the file.
        found: u32,
        /// Path to the model file with the incompatible version.
        path: PathBuf,
    },
}
