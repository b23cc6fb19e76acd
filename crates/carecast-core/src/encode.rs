//! Feature encoding: survey answers to the model's column layout.

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::answer::{Question, RawAnswer};
use crate::error::CoreError;

/// Column holding the raw age.
pub const AGE_COLUMN: &str = "Age";

/// Suffix of the one-hot column for the kept `Yes` level.
const YES_LEVEL_SUFFIX: &str = "_Yes";

/// Where the value of one expected column comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeatureSource {
    /// The raw age in years.
    Age,
    /// The drop-first indicator of a binary question (1 for `Yes`).
    Indicator(Question),
    /// A column no answer feeds, including dropped reference levels.
    Zero,
}

impl FeatureSource {
    fn resolve(name: &str) -> Self {
        if name == AGE_COLUMN {
            return FeatureSource::Age;
        }
        Question::ALL
            .iter()
            .find(|q| {
                name == q.key()
                    || name
                        .strip_suffix(YES_LEVEL_SUFFIX)
                        .is_some_and(|stem| stem == q.key())
            })
            .map_or(FeatureSource::Zero, |&q| FeatureSource::Indicator(q))
    }

    fn value(self, raw: &RawAnswer) -> f64 {
        match self {
            FeatureSource::Age => f64::from(raw.age().years()),
            FeatureSource::Indicator(q) => raw.answer(q).indicator(),
            FeatureSource::Zero => 0.0,
        }
    }
}

/// The model's expected column layout, resolved once.
///
/// Each expected column is bound to its source when the schema is built, so
/// encoding an answer is a single pass that cannot add, drop, or reorder
/// columns. Binary questions use drop-first one-hot encoding: the indicator
/// column is recognised as `<key>` or `<key>_Yes`, and the reference level
/// `<key>_No` is never produced, so it reads as 0 like any other unfed column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    columns: Vec<String>,
    sources: Vec<FeatureSource>,
}

impl FeatureSchema {
    /// Build a schema from the ordered expected column names.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DuplicateFeature`] if a name appears twice.
    #[instrument(skip_all)]
    pub fn new<I, S>(expected_columns: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = expected_columns.into_iter().map(Into::into).collect();

        let mut seen: HashMap<&str, usize> = HashMap::with_capacity(columns.len());
        for (position, name) in columns.iter().enumerate() {
            if let Some(&first) = seen.get(name.as_str()) {
                return Err(CoreError::DuplicateFeature {
                    name: name.clone(),
                    first,
                    second: position,
                });
            }
            seen.insert(name.as_str(), position);
        }

        let sources: Vec<FeatureSource> =
            columns.iter().map(|c| FeatureSource::resolve(c)).collect();
        let n_fed = sources.iter().filter(|s| **s != FeatureSource::Zero).count();
        debug!(n_columns = columns.len(), n_fed, "feature schema resolved");

        Ok(Self { columns, sources })
    }

    /// Encode one answer into a vector aligned with this schema.
    #[must_use]
    pub fn encode(&self, raw: &RawAnswer) -> FeatureVector<'_> {
        FeatureVector {
            names: &self.columns,
            values: self.values(raw),
        }
    }

    /// Return the expected column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Return the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Return `true` if the schema has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn values(&self, raw: &RawAnswer) -> Vec<f64> {
        self.sources.iter().map(|s| s.value(raw)).collect()
    }
}

/// One encoded row: feature values paired with the expected column names.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector<'a> {
    names: &'a [String],
    values: Vec<f64>,
}

impl<'a> FeatureVector<'a> {
    /// Return the column names, in model order.
    #[must_use]
    pub fn names(&self) -> &'a [String] {
        self.names
    }

    /// Return the values, in model order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Look up the value of a column by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    /// Iterate over `(name, value)` pairs in model order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, f64)> + '_ {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Return the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Return `true` if the vector has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Encode `raw` against `expected_columns` in one call.
///
/// Prefer building a [`FeatureSchema`] once when encoding repeatedly.
///
/// # Errors
///
/// Returns [`CoreError::DuplicateFeature`] if a name appears twice.
pub fn encode<'a>(
    raw: &RawAnswer,
    expected_columns: &'a [String],
) -> Result<FeatureVector<'a>, CoreError> {
    let schema = FeatureSchema::new(expected_columns.iter().map(String::as_str))?;
    Ok(FeatureVector {
        names: expected_columns,
        values: schema.values(raw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::{Age, YesNo};

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn sample_answer() -> RawAnswer {
        RawAnswer::new(
            Age::new(30).unwrap(),
            YesNo::No,
            YesNo::Yes,
            YesNo::No,
            YesNo::Yes,
        )
    }

    #[test]
    fn plain_keys_follow_expected_order() {
        let expected = columns(&[
            "tech_company",
            "Age",
            "family_history",
            "remote_work",
            "self_employed",
        ]);
        let v = encode(&sample_answer(), &expected).unwrap();
        assert_eq!(v.names(), expected.as_slice());
        assert_eq!(v.values(), &[1.0, 30.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn dummy_spelling_and_reference_level() {
        let expected = columns(&["family_history_Yes", "family_history_No", "Age"]);
        let v = encode(&sample_answer(), &expected).unwrap();
        assert_eq!(v.get("family_history_Yes"), Some(1.0));
        assert_eq!(v.get("family_history_No"), Some(0.0));
        assert_eq!(v.get("Age"), Some(30.0));
    }

    #[test]
    fn unknown_columns_filled_with_zero() {
        let expected = columns(&["Gender_Male", "Age", "no_employees_6-25"]);
        let v = encode(&sample_answer(), &expected).unwrap();
        assert_eq!(v.values(), &[0.0, 30.0, 0.0]);
    }

    #[test]
    fn answers_without_expected_column_are_discarded() {
        let expected = columns(&["Age"]);
        let v = encode(&sample_answer(), &expected).unwrap();
        assert_eq!(v.len(), 1);
        assert!(v.get("family_history").is_none());
    }

    #[test]
    fn empty_expected_columns_give_empty_vector() {
        let v = encode(&sample_answer(), &[]).unwrap();
        assert!(v.is_empty());
    }

    #[test]
    fn age_column_is_case_sensitive() {
        let expected = columns(&["age"]);
        let v = encode(&sample_answer(), &expected).unwrap();
        assert_eq!(v.values(), &[0.0]);
    }

    #[test]
    fn duplicate_column_rejected() {
        let err = FeatureSchema::new(["Age", "remote_work", "Age"]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::DuplicateFeature { ref name, first: 0, second: 2 } if name == "Age"
        ));
    }

    #[test]
    fn schema_encode_matches_free_function() {
        let expected = columns(&["Age", "self_employed_Yes", "remote_work", "tech_company"]);
        let schema = FeatureSchema::new(expected.clone()).unwrap();
        let raw = sample_answer();
        assert_eq!(schema.encode(&raw), encode(&raw, &expected).unwrap());
    }

    #[test]
    fn iter_pairs_names_with_values() {
        let schema = FeatureSchema::new(["Age", "tech_company"]).unwrap();
        let pairs: Vec<(&str, f64)> = schema.encode(&sample_answer()).iter().collect();
        assert_eq!(pairs, vec![("Age", 30.0), ("tech_company", 1.0)]);
    }
}
