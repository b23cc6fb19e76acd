//! Ensemble scoring: soft voting over the leaf distributions of every tree.

use crate::error::ForestError;
use crate::forest::RandomForest;

/// Mean class distribution over the trees of a forest.
///
/// Entry `k` is the probability of class `k`; entries sum to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDistribution(Vec<f64>);

impl ClassDistribution {
    /// Probability of `class`, `None` past the last class.
    #[must_use]
    pub fn probability(&self, class: usize) -> Option<f64> {
        self.0.get(class).copied()
    }

    /// Borrow the probabilities in class order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Consume the distribution, returning the probabilities in class order.
    #[must_use]
    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }
}

impl RandomForest {
    /// Score one encoded row.
    ///
    /// Each tree routes the row to a leaf; the leaf distributions are summed
    /// and divided by the tree count.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when the row width
    /// differs from the forest's feature count.
    pub fn predict_proba(&self, row: &[f64]) -> Result<ClassDistribution, ForestError> {
        if row.len() != self.n_features {
            return Err(ForestError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: row.len(),
            });
        }

        let mut sums = vec![0.0f64; self.n_classes];
        for tree in &self.trees {
            let leaf = tree.predict_proba(row)?;
            sums.iter_mut().zip(&leaf).for_each(|(sum, p)| *sum += p);
        }
        let n_trees = self.trees.len() as f64;
        Ok(ClassDistribution(sums.into_iter().map(|s| s / n_trees).collect()))
    }

    /// Width of the rows this forest scores.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Number of classes in each distribution.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Training column names, in row order.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}
