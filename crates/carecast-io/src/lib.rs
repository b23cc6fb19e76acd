//! File I/O for carecast: startup artifacts and PDF reports.

mod artifacts;
mod error;
mod pdf;
mod report;

pub use artifacts::{
    ArtifactPaths, FEATURES_FILE, FeatureListReader, MODEL_FILE, write_feature_list,
};
pub use error::IoError;
pub use report::{REPORT_FILE, Report, ReportWriter};
