//! Random Forest model artifact: load, validate, predict.
//!
//! A forest is assembled from exported CART trees stored as node arenas,
//! persisted as a versioned bincode envelope, and queried for averaged class
//! probability distributions. Training happens elsewhere; this crate only
//! consumes the fitted model.

mod error;
mod forest;
mod node;
mod predict;
mod serialize;
mod tree;

pub use error::ForestError;
pub use forest::RandomForest;
pub use node::{FeatureIndex, Node, NodeIndex};
pub use predict::ClassDistribution;
pub use tree::DecisionTree;
