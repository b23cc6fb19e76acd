//! Page navigation state machine for one user session.

use std::fmt;

use tracing::debug;

use crate::answer::RawAnswer;
use crate::error::CoreError;
use crate::model::ProbabilityModel;
use crate::predict::{PredictionResult, Predictor};

/// A page of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Page {
    /// Landing page with the privacy agreement.
    #[default]
    Home,
    /// Static privacy policy.
    PrivacyPolicy,
    /// Static project documentation.
    Documentation,
    /// The prediction form.
    Model,
    /// The most recent prediction.
    Results,
}

impl Page {
    /// Return the stable page key.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::PrivacyPolicy => "privacy_policy",
            Page::Documentation => "documentation",
            Page::Model => "model",
            Page::Results => "results",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A sidebar link, available from every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SidebarLink {
    /// Go to [`Page::Home`].
    Home,
    /// Go to [`Page::PrivacyPolicy`].
    PrivacyPolicy,
    /// Go to [`Page::Documentation`].
    Documentation,
}

impl SidebarLink {
    /// All sidebar links in display order.
    pub const ALL: [SidebarLink; 3] = [
        SidebarLink::Home,
        SidebarLink::PrivacyPolicy,
        SidebarLink::Documentation,
    ];

    /// Return the button label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SidebarLink::Home => "Home",
            SidebarLink::PrivacyPolicy => "Privacy Policy",
            SidebarLink::Documentation => "Documentation",
        }
    }

    /// Return the page this link opens.
    #[must_use]
    pub fn target(self) -> Page {
        match self {
            SidebarLink::Home => Page::Home,
            SidebarLink::PrivacyPolicy => Page::PrivacyPolicy,
            SidebarLink::Documentation => Page::Documentation,
        }
    }
}

/// A completed prediction form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormSubmission {
    /// The survey answers.
    pub answer: RawAnswer,
    /// Whether "I understand this is for educational use only." was checked.
    pub disclaimer_accepted: bool,
}

/// A prediction kept for the results page, with the answers that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoredResult {
    /// The submitted answers.
    pub answer: RawAnswer,
    /// The prediction for those answers.
    pub prediction: PredictionResult,
}

/// Errors from session transitions.
///
/// Every variant leaves the session unchanged.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Returned when leaving the home page without accepting the privacy terms.
    #[error("Please agree to the privacy terms to continue.")]
    PrivacyNotAccepted,

    /// Returned when the form is submitted without the disclaimer.
    #[error("Please agree to the terms before generating a prediction.")]
    DisclaimerNotAccepted,

    /// Returned when an action is not available on the current page.
    #[error("cannot {action} from the {page} page")]
    InvalidTransition {
        /// The attempted action.
        action: &'static str,
        /// The page the session was on.
        page: Page,
    },

    /// Returned when the predictor fails.
    #[error("prediction failed")]
    Prediction(#[from] CoreError),
}

impl SessionError {
    /// Return `true` for rejections the user can fix by resubmitting.
    #[must_use]
    pub fn is_user_rejection(&self) -> bool {
        matches!(
            self,
            SessionError::PrivacyNotAccepted | SessionError::DisclaimerNotAccepted
        )
    }
}

/// Navigation state of one user session.
///
/// Holds the current page and the latest prediction. The results page is
/// only entered through a successful submission, so `result()` is `Some`
/// whenever `page()` is [`Page::Results`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    page: Page,
    result: Option<StoredResult>,
}

impl Session {
    /// Start a session on the home page with no result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the current page.
    #[must_use]
    pub fn page(&self) -> Page {
        self.page
    }

    /// Return the stored prediction, if any.
    #[must_use]
    pub fn result(&self) -> Option<&StoredResult> {
        self.result.as_ref()
    }

    /// Follow a sidebar link. The stored result is kept.
    pub fn navigate(&mut self, link: SidebarLink) {
        let from = self.page;
        self.page = link.target();
        debug!(%from, to = %self.page, "navigated");
    }

    /// Leave the home page for the form ("Let's Go!").
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SessionError::InvalidTransition`] | not on [`Page::Home`] |
    /// | [`SessionError::PrivacyNotAccepted`] | `privacy_accepted` is false |
    pub fn start(&mut self, privacy_accepted: bool) -> Result<(), SessionError> {
        self.expect_page(Page::Home, "start a prediction")?;
        if !privacy_accepted {
            return Err(SessionError::PrivacyNotAccepted);
        }
        self.page = Page::Model;
        debug!(to = %self.page, "privacy terms accepted");
        Ok(())
    }

    /// Submit the form and, on success, move to the results page.
    ///
    /// The predictor is only invoked when the disclaimer was accepted. On any
    /// error the page and the stored result stay as they were.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`SessionError::InvalidTransition`] | not on [`Page::Model`] |
    /// | [`SessionError::DisclaimerNotAccepted`] | the disclaimer is unchecked |
    /// | [`SessionError::Prediction`] | the predictor failed |
    pub fn submit<M: ProbabilityModel>(
        &mut self,
        submission: FormSubmission,
        predictor: &Predictor<M>,
    ) -> Result<&StoredResult, SessionError> {
        self.expect_page(Page::Model, "submit the form")?;
        if !submission.disclaimer_accepted {
            debug!("form submitted without accepting the disclaimer");
            return Err(SessionError::DisclaimerNotAccepted);
        }

        let prediction = predictor.predict(&submission.answer)?;
        self.page = Page::Results;
        debug!(
            decision = prediction.decision.class(),
            confidence = prediction.confidence,
            "prediction stored"
        );
        Ok(&*self.result.insert(StoredResult {
            answer: submission.answer,
            prediction,
        }))
    }

    /// Discard the stored result and return to the form ("Try Again").
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] when not on [`Page::Results`].
    pub fn try_again(&mut self) -> Result<(), SessionError> {
        self.expect_page(Page::Results, "try again")?;
        self.result = None;
        self.page = Page::Model;
        debug!(to = %self.page, "result discarded");
        Ok(())
    }

    fn expect_page(&self, page: Page, action: &'static str) -> Result<(), SessionError> {
        if self.page != page {
            return Err(SessionError::InvalidTransition {
                action,
                page: self.page,
            });
        }
        Ok(())
    }
}
