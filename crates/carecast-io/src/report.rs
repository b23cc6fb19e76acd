//! Downloadable prediction report.

use std::fs;
use std::path::{Path, PathBuf};

use carecast_core::{Age, Decision, StoredResult};
use tracing::{debug, instrument};

use crate::IoError;
use crate::pdf::{Align, PdfPage};

/// File name of the written report.
pub const REPORT_FILE: &str = "mental_health_report.pdf";

const TITLE: &str = "Mental Health Prediction Report";
const FONT_SIZE: f64 = 12.0;

/// The content of one prediction report.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    age: Age,
    answers: Vec<(String, String)>,
    decision: Decision,
    confidence: f64,
}

impl Report {
    /// Build a report from its parts. `answers` are `(label, value)` pairs in
    /// display order.
    #[must_use]
    pub fn new(
        age: Age,
        answers: Vec<(String, String)>,
        decision: Decision,
        confidence: f64,
    ) -> Self {
        Self {
            age,
            answers,
            decision,
            confidence,
        }
    }

    /// Build a report for a stored prediction.
    #[must_use]
    pub fn from_result(result: &StoredResult) -> Self {
        let answers = result
            .answer
            .labelled()
            .into_iter()
            .map(|(label, choice)| (label.to_string(), choice.to_string()))
            .collect();
        Self::new(
            result.answer.age(),
            answers,
            result.prediction.decision,
            result.prediction.confidence,
        )
    }

    /// Return the text rows of the report, blank rows as empty strings.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![TITLE.to_string(), String::new()];
        lines.push(format!("Age: {}", self.age));
        lines.extend(self.answers.iter().map(|(q, a)| format!("{q}: {a}")));
        lines.push(String::new());
        lines.push(format!("Prediction: {}", outcome(self.decision)));
        lines.push(format!("Confidence: {:.2}%", self.confidence * 100.0));
        lines
    }

    /// Render the report as a PDF document.
    #[must_use]
    pub fn to_pdf(&self) -> Vec<u8> {
        let mut page = PdfPage::new(FONT_SIZE);
        for (i, line) in self.lines().into_iter().enumerate() {
            match (i, line.is_empty()) {
                (_, true) => page.blank(),
                (0, false) => page.text(line, Align::Center),
                (_, false) => page.text(line, Align::Left),
            };
        }
        let bytes = page.to_bytes();
        debug!(size_bytes = bytes.len(), "report rendered");
        bytes
    }
}

fn outcome(decision: Decision) -> &'static str {
    match decision {
        Decision::Likely => "Likely to Seek Treatment",
        Decision::Unlikely => "Unlikely to Seek Treatment",
    }
}

/// Writes rendered reports into an output directory.
///
/// Creates the output directory on construction if it does not exist.
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    /// Create a new writer targeting the given directory.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display()))]
    pub fn new(output_dir: &Path) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Return the path reports are written to.
    #[must_use]
    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(REPORT_FILE)
    }

    /// Write `report` as a PDF, replacing any earlier report, and return its path.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::WriteFile`] if the file cannot be written.
    #[instrument(skip_all)]
    pub fn write(&self, report: &Report) -> Result<PathBuf, IoError> {
        let path = self.report_path();
        fs::write(&path, report.to_pdf()).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;
        debug!(path = %path.display(), "report written");
        Ok(path)
    }
}
