//! Startup artifacts: the serialized forest and its ordered feature list.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use carecast_core::{FeatureSchema, Predictor, Threshold};
use carecast_forest::{ForestError, RandomForest};
use tracing::{debug, info, instrument};

use crate::IoError;

/// File name of the serialized forest.
pub const MODEL_FILE: &str = "mental_health_model.bin";

/// File name of the ordered feature list.
pub const FEATURES_FILE: &str = "model_features.json";

/// Locations of the two read-only startup artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    model: PathBuf,
    features: PathBuf,
}

impl ArtifactPaths {
    /// Use the fixed artifact file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            model: dir.join(MODEL_FILE),
            features: dir.join(FEATURES_FILE),
        }
    }

    /// Use explicit artifact paths.
    pub fn new(model: impl Into<PathBuf>, features: impl Into<PathBuf>) -> Self {
        Self {
            model: model.into(),
            features: features.into(),
        }
    }

    /// Return the model path.
    #[must_use]
    pub fn model(&self) -> &Path {
        &self.model
    }

    /// Return the feature list path.
    #[must_use]
    pub fn features(&self) -> &Path {
        &self.features
    }

    /// Load both artifacts and bind them into a [`Predictor`].
    ///
    /// The model is loaded first, so a missing model is reported even when
    /// the feature list is also absent.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::ArtifactNotFound`] | either file is missing |
    /// | [`IoError::ReadArtifact`] | the feature list exists but cannot be read |
    /// | [`IoError::LoadModel`] | the model file is corrupt or of another format version |
    /// | [`IoError::ParseFeatureList`] | the feature list is not a JSON string array |
    /// | [`IoError::FeatureNameMismatch`] | model and list disagree on a column name |
    /// | [`IoError::IncompatibleArtifacts`] | duplicate columns, width mismatch, or non-binary model |
    #[instrument(skip(self), fields(model = %self.model.display(), features = %self.features.display()))]
    pub fn load_predictor(&self, threshold: Threshold) -> Result<Predictor<RandomForest>, IoError> {
        let forest = load_model(&self.model)?;
        let columns = FeatureListReader::new(&self.features).read()?;

        // Forests carry their own column names; a mismatch means the two files
        // come from different training runs.
        if let Some((position, (model, list))) = forest
            .feature_names()
            .iter()
            .zip(&columns)
            .enumerate()
            .find(|(_, (m, l))| m != l)
        {
            return Err(IoError::FeatureNameMismatch {
                position,
                model: model.clone(),
                list: list.clone(),
            });
        }

        let schema = FeatureSchema::new(columns)
            .map_err(|e| IoError::IncompatibleArtifacts { source: e })?;
        let predictor = Predictor::new(forest, schema)
            .map_err(|e| IoError::IncompatibleArtifacts { source: e })?
            .with_threshold(threshold);

        info!(
            n_trees = predictor.model().n_trees(),
            n_features = predictor.schema().len(),
            threshold = threshold.value(),
            "predictor ready"
        );
        Ok(predictor)
    }
}

/// Load the forest, reporting an absent file as [`IoError::ArtifactNotFound`].
fn load_model(path: &Path) -> Result<RandomForest, IoError> {
    RandomForest::load(path).map_err(|e| match e {
        ForestError::ReadModel { path, source } if source.kind() == ErrorKind::NotFound => {
            IoError::ArtifactNotFound { path }
        }
        other => IoError::LoadModel {
            path: path.to_path_buf(),
            source: other,
        },
    })
}

/// Reads the ordered feature column list.
///
/// Expected format: a JSON array of strings, e.g.
/// `["Age", "self_employed", "family_history"]`.
pub struct FeatureListReader {
    path: PathBuf,
}

impl FeatureListReader {
    /// Create a new reader for the given file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read and parse the feature list.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::ArtifactNotFound`] | the file does not exist |
    /// | [`IoError::ReadArtifact`] | the file cannot be read |
    /// | [`IoError::ParseFeatureList`] | the content is not a JSON string array |
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Vec<String>, IoError> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                IoError::ArtifactNotFound {
                    path: self.path.clone(),
                }
            } else {
                IoError::ReadArtifact {
                    path: self.path.clone(),
                    source: e,
                }
            }
        })?;

        let columns: Vec<String> =
            serde_json::from_str(&content).map_err(|e| IoError::ParseFeatureList {
                path: self.path.clone(),
                source: e,
            })?;

        debug!(n_columns = columns.len(), "feature list loaded");
        Ok(columns)
    }
}

/// Write an ordered feature list as a JSON array.
///
/// # Errors
///
/// Returns [`IoError::WriteFile`] if the file cannot be written.
pub fn write_feature_list(path: &Path, columns: &[String]) -> Result<(), IoError> {
    let write_err = |source| IoError::WriteFile {
        path: path.to_path_buf(),
        source,
    };
    let file = fs::File::create(path).map_err(write_err)?;
    serde_json::to_writer_pretty(file, columns).map_err(|e| write_err(e.into()))?;
    info!(path = %path.display(), n_columns = columns.len(), "feature list written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn in_dir_uses_fixed_names() {
        let paths = ArtifactPaths::in_dir(Path::new("/opt/carecast"));
        assert_eq!(paths.model(), Path::new("/opt/carecast/mental_health_model.bin"));
        assert_eq!(paths.features(), Path::new("/opt/carecast/model_features.json"));
    }

    #[test]
    fn reads_feature_list_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(FEATURES_FILE);
        fs::write(&path, r#"["Age", "tech_company", "family_history"]"#).unwrap();
        let columns = FeatureListReader::new(&path).read().unwrap();
        assert_eq!(columns, vec!["Age", "tech_company", "family_history"]);
    }

    #[test]
    fn missing_feature_list_names_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(FEATURES_FILE);
        let err = FeatureListReader::new(&path).read().unwrap_err();
        assert!(matches!(err, IoError::ArtifactNotFound { path: ref p } if *p == path));
        assert!(err.to_string().contains("model_features.json"));
    }

    #[test]
    fn non_array_feature_list_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(FEATURES_FILE);
        fs::write(&path, r#"{"Age": 0}"#).unwrap();
        let err = FeatureListReader::new(&path).read().unwrap_err();
        assert!(matches!(err, IoError::ParseFeatureList { .. }));
    }

    #[test]
    fn feature_list_write_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(FEATURES_FILE);
        let columns = vec!["Age".to_string(), "remote_work".to_string()];
        write_feature_list(&path, &columns).unwrap();
        assert_eq!(FeatureListReader::new(&path).read().unwrap(), columns);
    }

    #[test]
    fn missing_model_names_path() {
        let dir = TempDir::new().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        let err = paths.load_predictor(Threshold::DEFAULT).unwrap_err();
        assert!(matches!(err, IoError::ArtifactNotFound { path: ref p } if p == paths.model()));
    }

    #[test]
    fn corrupt_model_error() {
        let dir = TempDir::new().unwrap();
        let paths = ArtifactPaths::in_dir(dir.path());
        fs::write(paths.model(), b"garbage").unwrap();
        let err = paths.load_predictor(Threshold::DEFAULT).unwrap_err();
        assert!(matches!(err, IoError::LoadModel { .. }));
    }
}
