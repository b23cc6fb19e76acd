//! Treatment prediction core: encode survey answers, score them, decide.
//!
//! Answers are aligned to the model's column layout by a [`FeatureSchema`],
//! scored by any [`ProbabilityModel`], and turned into a [`PredictionResult`]
//! by a configurable [`Threshold`]. The [`Session`] state machine drives the
//! page flow around a single prediction.

mod answer;
mod encode;
mod error;
mod model;
mod predict;
mod session;

pub use answer::{Age, Question, RawAnswer, YesNo};
pub use encode::{AGE_COLUMN, FeatureSchema, FeatureVector, encode};
pub use error::CoreError;
pub use model::ProbabilityModel;
pub use predict::{
    CONFIDENCE_BAND, ConfidenceInterval, Decision, PredictionResult, Predictor, Threshold,
};
pub use session::{FormSubmission, Page, Session, SessionError, SidebarLink, StoredResult};
