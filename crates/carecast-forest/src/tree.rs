use crate::{
    error::ForestError,
    node::Node,
};

/// Tolerance for a leaf distribution summing to 1.0.
const DISTRIBUTION_SUM_TOLERANCE: f64 = 1e-6;

/// A fitted CART decision tree.
///
/// Stored as an arena-based `Vec<Node>` with index references for
/// cache-friendly traversal and trivial serialization.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
}

impl DecisionTree {
    /// Assemble a tree from an exported node arena.
    ///
    /// The root is `nodes[0]`. Every split must point at children stored
    /// after it in the arena, which rules out cycles and guarantees that
    /// traversal ends at a leaf.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::EmptyTree`] | `nodes` is empty |
    /// | [`ForestError::InvalidClassCount`] | `n_classes < 2` |
    /// | [`ForestError::InvalidChild`] | a child index is out of range or not after its parent |
    /// | [`ForestError::InvalidSplitFeature`] | a split tests a feature `>= n_features` |
    /// | [`ForestError::NonFiniteThreshold`] | a split threshold is NaN or infinite |
    /// | [`ForestError::InvalidDistribution`] | a leaf distribution is malformed |
    pub fn from_nodes(
        nodes: Vec<Node>,
        n_features: usize,
        n_classes: usize,
    ) -> Result<Self, ForestError> {
        if nodes.is_empty() {
            return Err(ForestError::EmptyTree);
        }
        if n_classes < 2 {
            return Err(ForestError::InvalidClassCount { n_classes });
        }

        let n_nodes = nodes.len();
        for (idx, node) in nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    for child in [left.index(), right.index()] {
                        if child <= idx || child >= n_nodes {
                            return Err(ForestError::InvalidChild {
                                node: idx,
                                child,
                                n_nodes,
                            });
                        }
                    }
                    if feature.index() >= n_features {
                        return Err(ForestError::InvalidSplitFeature {
                            node: idx,
                            feature: feature.index(),
                            n_features,
                        });
                    }
                    if !threshold.is_finite() {
                        return Err(ForestError::NonFiniteThreshold { node: idx });
                    }
                }
                Node::Leaf { distribution } => {
                    validate_distribution(idx, distribution, n_classes)?;
                }
            }
        }

        Ok(Self {
            nodes,
            n_features,
            n_classes,
        })
    }

    /// Return the class probability distribution for a single sample.
    ///
    /// The returned `Vec` has length `n_classes`, summing to 1.0.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<Vec<f64>, ForestError> {
        if sample.len() != self.n_features {
            return Err(ForestError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let leaf = self.traverse(sample);
        match &self.nodes[leaf] {
            Node::Leaf { distribution } => Ok(distribution.clone()),
            Node::Split { .. } => unreachable!("traverse always ends at a leaf"),
        }
    }

    /// Return the total number of nodes in the tree (both splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the number of features this tree expects.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of classes in each leaf distribution.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Traverse the tree from the root and return the arena index of the leaf.
    fn traverse(&self, sample: &[f64]) -> usize {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { .. } => return idx,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if sample[feature.index()] <= *threshold {
                        idx = left.index();
                    } else {
                        idx = right.index();
                    }
                }
            }
        }
    }
}

fn validate_distribution(
    node: usize,
    distribution: &[f64],
    n_classes: usize,
) -> Result<(), ForestError> {
    if distribution.len() != n_classes {
        return Err(ForestError::InvalidDistribution {
            node,
            reason: format!("{} entries, expected {n_classes}", distribution.len()),
        });
    }
    // The sum tolerance alone would admit entries just above 1.
    if distribution.iter().any(|p| !(0.0..=1.0).contains(p)) {
        return Err(ForestError::InvalidDistribution {
            node,
            reason: "probabilities must lie in [0, 1]".to_string(),
        });
    }
    let sum: f64 = distribution.iter().sum();
    if (sum - 1.0).abs() > DISTRIBUTION_SUM_TOLERANCE {
        return Err(ForestError::InvalidDistribution {
            node,
            reason: format!("probabilities sum to {sum}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::DecisionTree;
    use crate::error::ForestError;
    use crate::node::Node;

    /// Stump on feature 0: `x <= 0.5` goes left.
    fn stump() -> DecisionTree {
        DecisionTree::from_nodes(
            vec![
                Node::split(0, 0.5, 1, 2),
                Node::leaf(vec![0.9, 0.1]),
                Node::leaf(vec![0.25, 0.75]),
            ],
            1,
            2,
        )
        .unwrap()
    }

    #[test]
    fn threshold_goes_left() {
        let tree = stump();
        assert_eq!(tree.predict_proba(&[0.5]).unwrap(), vec![0.9, 0.1]);
        assert_eq!(tree.predict_proba(&[0.51]).unwrap(), vec![0.25, 0.75]);
    }

    #[test]
    fn single_leaf_tree() {
        let tree = DecisionTree::from_nodes(vec![Node::leaf(vec![0.5, 0.5])], 3, 2).unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.n_leaves(), 1);
        assert_eq!(tree.predict_proba(&[1.0, 2.0, 3.0]).unwrap(), vec![0.5, 0.5]);
    }

    #[test]
    fn prediction_feature_mismatch() {
        let err = stump().predict_proba(&[0.0, 1.0]).unwrap_err();
        assert!(matches!(
            err,
            ForestError::PredictionFeatureMismatch { expected: 1, got: 2 }
        ));
    }

    #[test]
    fn empty_arena_error() {
        let err = DecisionTree::from_nodes(vec![], 1, 2).unwrap_err();
        assert!(matches!(err, ForestError::EmptyTree));
    }

    #[test]
    fn single_class_error() {
        let err = DecisionTree::from_nodes(vec![Node::leaf(vec![1.0])], 1, 1).unwrap_err();
        assert!(matches!(err, ForestError::InvalidClassCount { n_classes: 1 }));
    }

    #[test]
    fn self_referencing_child_error() {
        let err = DecisionTree::from_nodes(
            vec![Node::split(0, 0.5, 0, 1), Node::leaf(vec![0.5, 0.5])],
            1,
            2,
        )
        .unwrap_err();
        assert!(matches!(err, ForestError::InvalidChild { node: 0, child: 0, .. }));
    }

    #[test]
    fn out_of_range_child_error() {
        let err = DecisionTree::from_nodes(
            vec![Node::split(0, 0.5, 1, 7), Node::leaf(vec![0.5, 0.5])],
            1,
            2,
        )
        .unwrap_err();
        assert!(matches!(err, ForestError::InvalidChild { child: 7, n_nodes: 2, .. }));
    }

    #[test]
    fn unknown_split_feature_error() {
        let err = DecisionTree::from_nodes(
            vec![
                Node::split(4, 0.5, 1, 2),
                Node::leaf(vec![0.5, 0.5]),
                Node::leaf(vec![0.5, 0.5]),
            ],
            2,
            2,
        )
        .unwrap_err();
        assert!(matches!(err, ForestError::InvalidSplitFeature { feature: 4, .. }));
    }

    #[test]
    fn nan_threshold_error() {
        let err = DecisionTree::from_nodes(
            vec![
                Node::split(0, f64::NAN, 1, 2),
                Node::leaf(vec![0.5, 0.5]),
                Node::leaf(vec![0.5, 0.5]),
            ],
            1,
            2,
        )
        .unwrap_err();
        assert!(matches!(err, ForestError::NonFiniteThreshold { node: 0 }));
    }

    #[test]
    fn distribution_wrong_length_error() {
        let err =
            DecisionTree::from_nodes(vec![Node::leaf(vec![0.2, 0.3, 0.5])], 1, 2).unwrap_err();
        assert!(matches!(err, ForestError::InvalidDistribution { node: 0, .. }));
    }

    #[test]
    fn entry_above_one_rejected_despite_sum_tolerance() {
        let err = DecisionTree::from_nodes(vec![Node::leaf(vec![0.0, 1.000_000_5])], 1, 2)
            .unwrap_err();
        assert!(matches!(err, ForestError::InvalidDistribution { node: 0, .. }));
    }

    #[test]
    fn distribution_not_normalized_error() {
        let err = DecisionTree::from_nodes(vec![Node::leaf(vec![0.2, 0.2])], 1, 2).unwrap_err();
        assert!(matches!(err, ForestError::InvalidDistribution { .. }));
    }

    #[test]
    fn negative_probability_error() {
        let err = DecisionTree::from_nodes(vec![Node::leaf(vec![1.5, -0.5])], 1, 2).unwrap_err();
        assert!(matches!(err, ForestError::InvalidDistribution { .. }));
    }
}
