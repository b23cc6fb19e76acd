//! The `mental_health_model.bin` file format.
//!
//! A bincode record holding a format version, the training column names, and
//! the tree arenas. Trees are re-validated on load.

use std::fs;
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::error::ForestError;
use crate::forest::RandomForest;
use crate::tree::DecisionTree;

/// Bumped whenever the record layout changes.
const FORMAT_VERSION: u32 = 1;

#[derive(serde::Serialize)]
struct EnvelopeRef<'a> {
    format_version: u32,
    feature_names: &'a [String],
    trees: &'a [DecisionTree],
}

/// Owned mirror of [`EnvelopeRef`]; both encode to the same bytes.
#[derive(serde::Deserialize)]
struct Envelope {
    format_version: u32,
    feature_names: Vec<String>,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Write the forest to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::SerializeModel`] | bincode encoding failed |
    /// | [`ForestError::WriteModel`] | file write failed |
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ForestError> {
        let path = path.as_ref();
        let record = EnvelopeRef {
            format_version: FORMAT_VERSION,
            feature_names: &self.feature_names,
            trees: &self.trees,
        };
        let bytes =
            bincode::serialize(&record).map_err(|e| ForestError::SerializeModel { source: e })?;

        fs::write(path, &bytes).map_err(|e| ForestError::WriteModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!(size_bytes = bytes.len(), n_trees = self.trees.len(), "model saved");
        Ok(())
    }

    /// Read a forest written by [`RandomForest::save`].
    ///
    /// A truncated or hand-edited file is rejected here rather than at
    /// prediction time.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::ReadModel`] | file read failed |
    /// | [`ForestError::DeserializeModel`] | bincode decoding failed |
    /// | [`ForestError::IncompatibleModelVersion`] | format version mismatch |
    /// | any assembly variant | the decoded trees are malformed |
    #[instrument(fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ForestError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| ForestError::ReadModel {
            path: path.to_path_buf(),
            source: e,
        })?;

        let record: Envelope =
            bincode::deserialize(&bytes).map_err(|e| ForestError::DeserializeModel {
                path: path.to_path_buf(),
                source: e,
            })?;
        if record.format_version != FORMAT_VERSION {
            return Err(ForestError::IncompatibleModelVersion {
                expected: FORMAT_VERSION,
                found: record.format_version,
                path: path.to_path_buf(),
            });
        }

        let trees = record
            .trees
            .into_iter()
            .map(|t| DecisionTree::from_nodes(t.nodes, t.n_features, t.n_classes))
            .collect::<Result<Vec<_>, _>>()?;
        let forest = RandomForest::new(trees, record.feature_names)?;

        debug!(
            size_bytes = bytes.len(),
            n_trees = forest.n_trees(),
            n_features = forest.n_features(),
            "model loaded"
        );
        Ok(forest)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::forest::RandomForest;
    use crate::node::Node;
    use crate::tree::DecisionTree;

    fn simple_model() -> RandomForest {
        let tree = DecisionTree::from_nodes(
            vec![
                Node::split(1, 0.5, 1, 2),
                Node::leaf(vec![0.7, 0.3]),
                Node::leaf(vec![0.35, 0.65]),
            ],
            2,
            2,
        )
        .unwrap();
        RandomForest::new(vec![tree], vec!["Age".to_string(), "family_history".to_string()])
            .unwrap()
    }

    #[test]
    fn round_trip_identical_predictions() {
        let dir = TempDir::new().unwrap();
        let model_path = dir.path().join("test_model.bin");

        let forest = simple_model();
        forest.save(&model_path).unwrap();
        let loaded = RandomForest::load(&model_path).unwrap();

        assert_eq!(forest, loaded);
        for sample in [[30.0, 0.0], [30.0, 1.0]] {
            let orig = forest.predict_proba(&sample).unwrap();
            let restored = loaded.predict_proba(&sample).unwrap();
            assert_eq!(orig.as_slice(), restored.as_slice());
        }
    }

    #[test]
    fn load_nonexistent_file_error() {
        let dir = TempDir::new().unwrap();
        let err = RandomForest::load(dir.path().join("missing.bin")).unwrap_err();
        assert!(matches!(err, crate::ForestError::ReadModel { .. }));
    }

    #[test]
    fn malformed_tree_rejected_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad_leaf.bin");
        let forest = simple_model();
        let mut trees = forest.trees().to_vec();
        trees[0].nodes[1] = Node::leaf(vec![0.9, 0.9]);
        let record = super::EnvelopeRef {
            format_version: super::FORMAT_VERSION,
            feature_names: forest.feature_names(),
            trees: &trees,
        };
        std::fs::write(&path, bincode::serialize(&record).unwrap()).unwrap();

        let err = RandomForest::load(&path).unwrap_err();
        assert!(matches!(err, crate::ForestError::InvalidDistribution { .. }));
    }

    #[test]
    fn load_corrupt_file_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrupt.bin");
        std::fs::write(&path, b"not a valid bincode file").unwrap();
        let err = RandomForest::load(&path).unwrap_err();
        assert!(matches!(err, crate::ForestError::DeserializeModel { .. }));
    }

    #[test]
    fn load_wrong_version_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("future.bin");
        let forest = simple_model();
        let record = super::EnvelopeRef {
            format_version: 99,
            feature_names: forest.feature_names(),
            trees: forest.trees(),
        };
        std::fs::write(&path, bincode::serialize(&record).unwrap()).unwrap();

        let err = RandomForest::load(&path).unwrap_err();
        assert!(matches!(
            err,
            crate::ForestError::IncompatibleModelVersion { expected: 1, found: 99, .. }
        ));
    }
}
