//! Random Forest ensemble assembled from exported decision trees.

use tracing::{debug, instrument};

use crate::error::ForestError;
use crate::tree::DecisionTree;

/// A fitted Random Forest ensemble.
///
/// The forest is read-only once assembled: prediction never mutates it, so a
/// single instance can be shared by reference across callers.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
    pub(crate) feature_names: Vec<String>,
}

impl RandomForest {
    /// Assemble a forest from trees that all share one shape.
    ///
    /// `feature_names` labels the columns the trees were trained on and must
    /// have one entry per feature.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::NoTrees`] | `trees` is empty |
    /// | [`ForestError::TreeShapeMismatch`] | trees disagree on feature or class count |
    /// | [`ForestError::FeatureNameCountMismatch`] | `feature_names.len()` differs from the tree width |
    #[instrument(skip_all, fields(n_trees = trees.len()))]
    pub fn new(trees: Vec<DecisionTree>, feature_names: Vec<String>) -> Result<Self, ForestError> {
        let first = trees.first().ok_or(ForestError::NoTrees)?;
        let n_features = first.n_features();
        let n_classes = first.n_classes();

        for (tree_index, tree) in trees.iter().enumerate().skip(1) {
            if tree.n_features() != n_features || tree.n_classes() != n_classes {
                return Err(ForestError::TreeShapeMismatch {
                    tree_index,
                    expected_features: n_features,
                    expected_classes: n_classes,
                    got_features: tree.n_features(),
                    got_classes: tree.n_classes(),
                });
            }
        }

        if feature_names.len() != n_features {
            return Err(ForestError::FeatureNameCountMismatch {
                n_features,
                n_names: feature_names.len(),
            });
        }

        debug!(
            n_features,
            n_classes,
            n_nodes = trees.iter().map(DecisionTree::n_nodes).sum::<usize>(),
            "forest assembled"
        );

        Ok(Self {
            trees,
            n_features,
            n_classes,
            feature_names,
        })
    }

    /// Borrow the trees of the ensemble.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}
