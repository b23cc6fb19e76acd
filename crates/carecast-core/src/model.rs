//! The classifier seam: anything that scores one encoded row.

use carecast_forest::{ForestError, RandomForest};

/// A pre-trained classifier that yields a class probability vector per row.
///
/// Implementations are read-only: scoring takes `&self` and never changes the
/// model, so one loaded instance can serve every prediction.
pub trait ProbabilityModel {
    /// Error raised when a row cannot be scored.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Number of feature columns each row must have.
    fn n_features(&self) -> usize;

    /// Number of classes in each probability vector.
    fn n_classes(&self) -> usize;

    /// Return one probability per class for `row`.
    ///
    /// # Errors
    ///
    /// Implementation-defined; typically a row-width mismatch.
    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, Self::Error>;
}

impl ProbabilityModel for RandomForest {
    type Error = ForestError;

    fn n_features(&self) -> usize {
        RandomForest::n_features(self)
    }

    fn n_classes(&self) -> usize {
        RandomForest::n_classes(self)
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, Self::Error> {
        RandomForest::predict_proba(self, row).map(|d| d.into_vec())
    }
}

impl<M: ProbabilityModel + ?Sized> ProbabilityModel for &M {
    type Error = M::Error;

    fn n_features(&self) -> usize {
        (**self).n_features()
    }

    fn n_classes(&self) -> usize {
        (**self).n_classes()
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, Self::Error> {
        (**self).predict_proba(row)
    }
}

#[cfg(test)]
mod tests {
    use carecast_forest::{DecisionTree, Node, RandomForest};

    use super::ProbabilityModel;

    fn forest() -> RandomForest {
        let tree = DecisionTree::from_nodes(
            vec![
                Node::split(0, 0.5, 1, 2),
                Node::leaf(vec![0.8, 0.2]),
                Node::leaf(vec![0.3, 0.7]),
            ],
            1,
            2,
        )
        .unwrap();
        RandomForest::new(vec![tree], vec!["family_history".to_string()]).unwrap()
    }

    fn p1<M: ProbabilityModel>(model: &M, row: &[f64]) -> f64 {
        model.predict_proba(row).unwrap()[1]
    }

    #[test]
    fn forest_scores_through_trait() {
        let forest = forest();
        assert_eq!(ProbabilityModel::n_features(&forest), 1);
        assert_eq!(ProbabilityModel::n_classes(&forest), 2);
        assert!((p1(&forest, &[1.0]) - 0.7).abs() < 1e-12);
    }

    #[test]
    fn reference_delegates() {
        let forest = forest();
        let by_ref = &forest;
        assert!((p1(&by_ref, &[0.0]) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn forest_width_mismatch_surfaces() {
        let forest = forest();
        assert!(ProbabilityModel::predict_proba(&forest, &[0.0, 1.0]).is_err());
    }
}
