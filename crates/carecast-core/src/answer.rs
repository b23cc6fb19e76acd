//! Survey answer types produced by the input form.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// A respondent age, validated to the form's slider range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Age(u32);

impl Age {
    /// Smallest accepted age.
    pub const MIN: u32 = 18;
    /// Largest accepted age.
    pub const MAX: u32 = 100;
    /// Age preselected on the form.
    pub const DEFAULT: Age = Age(30);

    /// Validate an age.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidAge`] when `age` is outside `[MIN, MAX]`.
    pub fn new(age: u32) -> Result<Self, CoreError> {
        if !(Self::MIN..=Self::MAX).contains(&age) {
            return Err(CoreError::InvalidAge {
                age,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(age))
    }

    /// Return the age in years.
    #[must_use]
    pub fn years(self) -> u32 {
        self.0
    }
}

impl Default for Age {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A binary survey choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum YesNo {
    /// Affirmative answer; encoded as 1.
    Yes,
    /// Negative answer; the dropped reference level, encoded as 0.
    No,
}

impl YesNo {
    /// Return the one-hot indicator for this choice.
    #[must_use]
    pub fn indicator(self) -> f64 {
        match self {
            YesNo::Yes => 1.0,
            YesNo::No => 0.0,
        }
    }

    /// Return the label shown on the form and in reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            YesNo::Yes => "Yes",
            YesNo::No => "No",
        }
    }
}

impl fmt::Display for YesNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for YesNo {
    type Err = CoreError;

    /// Parse `yes`/`y` or `no`/`n`, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" => Ok(YesNo::Yes),
            "no" | "n" => Ok(YesNo::No),
            _ => Err(CoreError::InvalidChoice { raw: s.to_string() }),
        }
    }
}

/// The four binary questions on the form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Question {
    /// "Are you self-employed?"
    SelfEmployed,
    /// "Family history of mental illness?"
    FamilyHistory,
    /// "Do you work remotely?"
    RemoteWork,
    /// "Do you work in tech?"
    TechCompany,
}

impl Question {
    /// All questions in form order.
    pub const ALL: [Question; 4] = [
        Question::SelfEmployed,
        Question::FamilyHistory,
        Question::RemoteWork,
        Question::TechCompany,
    ];

    /// Return the training-data column key for this question.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Question::SelfEmployed => "self_employed",
            Question::FamilyHistory => "family_history",
            Question::RemoteWork => "remote_work",
            Question::TechCompany => "tech_company",
        }
    }

    /// Return the short label used on the results page and in reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Question::SelfEmployed => "Self-employed",
            Question::FamilyHistory => "Family History",
            Question::RemoteWork => "Remote Work",
            Question::TechCompany => "Tech Company",
        }
    }

    /// Return the question as asked on the form.
    #[must_use]
    pub fn prompt(self) -> &'static str {
        match self {
            Question::SelfEmployed => "Are you self-employed?",
            Question::FamilyHistory => "Family history of mental illness?",
            Question::RemoteWork => "Do you work remotely?",
            Question::TechCompany => "Do you work in tech?",
        }
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One submitted set of survey answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawAnswer {
    age: Age,
    self_employed: YesNo,
    family_history: YesNo,
    remote_work: YesNo,
    tech_company: YesNo,
}

impl RawAnswer {
    /// Create an answer record.
    #[must_use]
    pub fn new(
        age: Age,
        self_employed: YesNo,
        family_history: YesNo,
        remote_work: YesNo,
        tech_company: YesNo,
    ) -> Self {
        Self {
            age,
            self_employed,
            family_history,
            remote_work,
            tech_company,
        }
    }

    /// Return the respondent age.
    #[must_use]
    pub fn age(&self) -> Age {
        self.age
    }

    /// Return the answer to `question`.
    #[must_use]
    pub fn answer(&self, question: Question) -> YesNo {
        match question {
            Question::SelfEmployed => self.self_employed,
            Question::FamilyHistory => self.family_history,
            Question::RemoteWork => self.remote_work,
            Question::TechCompany => self.tech_company,
        }
    }

    /// Return the answers as ordered `(label, choice)` pairs for display.
    #[must_use]
    pub fn labelled(&self) -> Vec<(&'static str, YesNo)> {
        Question::ALL
            .iter()
            .map(|&q| (q.label(), self.answer(q)))
            .collect()
    }
}
