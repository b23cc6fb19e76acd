use std::fmt;

/// Position of a column in the encoded feature row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct FeatureIndex(usize);

impl FeatureIndex {
    /// Wrap a column position.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based position.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FeatureIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a node in its tree's arena.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    serde::Serialize, serde::Deserialize,
)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Wrap an arena position.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the zero-based position.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One node of an exported CART tree.
///
/// Nodes live in a flat arena with the root at index 0; splits name their
/// children by [`NodeIndex`].
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Node {
    /// Binary test on one column.
    Split {
        /// Column tested.
        feature: FeatureIndex,
        /// Rows with `value <= threshold` go left.
        threshold: f64,
        /// Child taken when the test holds.
        left: NodeIndex,
        /// Child taken otherwise.
        right: NodeIndex,
    },
    /// Terminal node.
    Leaf {
        /// Class probabilities, one entry per class, summing to 1.
        distribution: Vec<f64>,
    },
}

impl Node {
    /// Build a split node.
    #[must_use]
    pub fn split(feature: usize, threshold: f64, left: usize, right: usize) -> Self {
        Node::Split {
            feature: FeatureIndex::new(feature),
            threshold,
            left: NodeIndex::new(left),
            right: NodeIndex::new(right),
        }
    }

    /// Build a leaf node from a class distribution.
    #[must_use]
    pub fn leaf(distribution: Vec<f64>) -> Self {
        Node::Leaf { distribution }
    }

    /// Return `true` if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}
