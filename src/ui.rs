//! Line-oriented terminal rendering of the session pages.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use carecast_core::{
    Age, Decision, FormSubmission, Page, PredictionResult, Predictor, ProbabilityModel, Question,
    RawAnswer, Session, SessionError, SidebarLink, StoredResult, YesNo,
};
use carecast_io::{Report, ReportWriter};
use tracing::debug;

const BAR_WIDTH: usize = 30;
const RULE: &str = "----------------------------------------";

/// Sections of the documentation page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum DocSection {
    #[default]
    Overview,
    GettingStarted,
    ProjectStructure,
    MachineLearningSummary,
    KeyInsights,
    FutureImprovements,
    Contributors,
    ContactAndSupport,
}

impl DocSection {
    const ALL: [DocSection; 8] = [
        DocSection::Overview,
        DocSection::GettingStarted,
        DocSection::ProjectStructure,
        DocSection::MachineLearningSummary,
        DocSection::KeyInsights,
        DocSection::FutureImprovements,
        DocSection::Contributors,
        DocSection::ContactAndSupport,
    ];

    /// Parse a 1-based menu number.
    fn from_choice(choice: &str) -> Option<Self> {
        let n: usize = choice.parse().ok()?;
        Self::ALL.get(n.checked_sub(1)?).copied()
    }

    fn title(self) -> &'static str {
        match self {
            DocSection::Overview => "Overview",
            DocSection::GettingStarted => "Getting Started",
            DocSection::ProjectStructure => "Project Structure",
            DocSection::MachineLearningSummary => "Machine Learning Summary",
            DocSection::KeyInsights => "Key Insights",
            DocSection::FutureImprovements => "Future Improvements",
            DocSection::Contributors => "Contributors",
            DocSection::ContactAndSupport => "Contact & Support",
        }
    }

    fn body(self) -> &'static str {
        match self {
            DocSection::Overview => {
                "This app uses a machine learning model trained on the 2014 OSMI Mental Health \
                 in Tech survey to predict the likelihood of seeking mental health treatment."
            }
            DocSection::GettingStarted => {
                "1. Place mental_health_model.bin and model_features.json in one directory.\n\
                 2. Build: cargo build --release\n\
                 3. Launch: carecast --artifacts-dir <dir>"
            }
            DocSection::ProjectStructure => {
                "carecast/\n\
                 \x20 crates/carecast-forest/  random forest inference and model file format\n\
                 \x20 crates/carecast-core/    answers, encoding, prediction, session flow\n\
                 \x20 crates/carecast-io/      artifact loading and PDF reports\n\
                 \x20 src/                     terminal front end"
            }
            DocSection::MachineLearningSummary => {
                "- Target: treatment\n\
                 - Model: Random Forest Classifier\n\
                 - Accuracy: ~61%\n\
                 - F1 Score: ~66% for positive class"
            }
            DocSection::KeyInsights => {
                "- Family history is a strong predictor\n\
                 - Smaller companies often lack mental health support\n\
                 - Gender and age influence likelihood of seeking treatment"
            }
            DocSection::FutureImprovements => {
                "- Add per-feature explanations\n\
                 - Include more diverse or updated datasets\n\
                 - Expand to multilingual support"
            }
            DocSection::Contributors => {
                "- Data pipeline and wrangling\n\
                 - Exploratory analysis and modeling\n\
                 - Application and documentation"
            }
            DocSection::ContactAndSupport => {
                "- Open an issue on the project repository for questions or bug reports."
            }
        }
    }
}

/// Whether the command loop should keep going.
enum Flow {
    Continue,
    Quit,
}

/// Interactive front end reading commands from `input` and drawing pages to `output`.
pub struct Terminal<R, W> {
    input: R,
    output: W,
    privacy_checked: bool,
    doc_section: DocSection,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    /// Start on a fresh screen state: privacy box unchecked, first documentation section.
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            privacy_checked: false,
            doc_section: DocSection::default(),
        }
    }

    /// Run the command loop until the user quits or input ends.
    ///
    /// User rejections are shown and the loop continues. Prediction and
    /// report failures end the loop with an error.
    pub fn run<M: ProbabilityModel>(
        &mut self,
        session: &mut Session,
        predictor: &Predictor<M>,
        reports: &ReportWriter,
    ) -> Result<()> {
        loop {
            self.render(session)?;
            let Some(command) = self.prompt("> ")? else {
                break;
            };
            if let Flow::Quit = self.handle(&command, session, predictor, reports)? {
                break;
            }
        }
        debug!("session ended");
        Ok(())
    }

    fn handle<M: ProbabilityModel>(
        &mut self,
        command: &str,
        session: &mut Session,
        predictor: &Predictor<M>,
        reports: &ReportWriter,
    ) -> Result<Flow> {
        let command = command.trim().to_ascii_lowercase();
        if let Some(link) = sidebar_link(&command) {
            session.navigate(link);
            return Ok(Flow::Continue);
        }

        match (session.page(), command.as_str()) {
            (_, "q") => return Ok(Flow::Quit),
            (Page::Home, "a") => self.privacy_checked = !self.privacy_checked,
            (Page::Home, "g") => {
                let outcome = session.start(self.privacy_checked);
                self.report_rejection(outcome)?;
            }
            (Page::Documentation, choice) => match DocSection::from_choice(choice) {
                Some(section) => self.doc_section = section,
                None => self.unknown(choice)?,
            },
            (Page::Model, "f") => {
                let Some(submission) = self.read_form()? else {
                    return Ok(Flow::Quit);
                };
                writeln!(self.output, "Generating prediction...")?;
                let outcome = session.submit(submission, predictor).map(|_| ());
                self.report_rejection(outcome)?;
            }
            (Page::Results, "r") => {
                let stored = stored_result(session)?;
                let path = reports
                    .write(&Report::from_result(stored))
                    .context("failed to write report")?;
                writeln!(self.output, "Report saved to {}", path.display())?;
            }
            (Page::Results, "t") => session.try_again()?,
            (_, other) => self.unknown(other)?,
        }
        Ok(Flow::Continue)
    }

    /// Show a user rejection and carry on; propagate anything else.
    fn report_rejection(&mut self, outcome: Result<(), SessionError>) -> Result<()> {
        match outcome {
            Ok(()) => Ok(()),
            Err(e) if e.is_user_rejection() => {
                writeln!(self.output, "{e}")?;
                Ok(())
            }
            Err(e) => Err(e).context("session action failed"),
        }
    }

    fn unknown(&mut self, command: &str) -> Result<()> {
        writeln!(self.output, "Unknown command \"{command}\".")?;
        Ok(())
    }

    /// Print `prompt` and read one line. Returns `None` at end of input.
    fn prompt(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Ask every form question. Returns `None` if input ends midway.
    fn read_form(&mut self) -> Result<Option<FormSubmission>> {
        let Some(age) = self.read_age()? else {
            return Ok(None);
        };
        let mut choices = [YesNo::No; 4];
        for (choice, question) in choices.iter_mut().zip(Question::ALL) {
            let Some(answer) = self.read_yes_no(question)? else {
                return Ok(None);
            };
            *choice = answer;
        }
        let Some(disclaimer) =
            self.prompt("[ ] I understand this is for educational use only. (y/N): ")?
        else {
            return Ok(None);
        };

        let [self_employed, family_history, remote_work, tech_company] = choices;
        let submission = FormSubmission {
            answer: RawAnswer::new(age, self_employed, family_history, remote_work, tech_company),
            disclaimer_accepted: matches!(disclaimer.to_ascii_lowercase().as_str(), "y" | "yes"),
        };
        debug!(?submission, "form completed");
        Ok(Some(submission))
    }

    fn read_age(&mut self) -> Result<Option<Age>> {
        let prompt = format!("Your Age ({}-{}) [{}]: ", Age::MIN, Age::MAX, Age::DEFAULT);
        loop {
            let Some(line) = self.prompt(&prompt)? else {
                return Ok(None);
            };
            if line.is_empty() {
                return Ok(Some(Age::DEFAULT));
            }
            match line.parse::<u32>() {
                Ok(years) => match Age::new(years) {
                    Ok(age) => return Ok(Some(age)),
                    Err(e) => writeln!(self.output, "{e}")?,
                },
                Err(_) => writeln!(self.output, "Please enter a whole number of years.")?,
            }
        }
    }

    fn read_yes_no(&mut self, question: Question) -> Result<Option<YesNo>> {
        let prompt = format!("{} (Yes/No): ", question.prompt());
        loop {
            let Some(line) = self.prompt(&prompt)? else {
                return Ok(None);
            };
            match line.parse::<YesNo>() {
                Ok(choice) => return Ok(Some(choice)),
                Err(e) => writeln!(self.output, "{e}")?,
            }
        }
    }

    fn render(&mut self, session: &Session) -> Result<()> {
        writeln!(self.output, "{RULE}")?;
        let sidebar: Vec<String> = SidebarLink::ALL
            .iter()
            .map(|link| format!("[{}] {}", sidebar_key(*link), link.label()))
            .collect();
        writeln!(self.output, "Navigation: {}  [q] Quit", sidebar.join("  "))?;
        writeln!(self.output, "{RULE}")?;

        match session.page() {
            Page::Home => self.render_home(),
            Page::PrivacyPolicy => self.render_privacy(),
            Page::Documentation => self.render_documentation(),
            Page::Model => self.render_model(),
            Page::Results => {
                let stored = *stored_result(session)?;
                self.render_results(&stored)
            }
        }
    }

    fn render_home(&mut self) -> Result<()> {
        let mark = if self.privacy_checked { 'x' } else { ' ' };
        writeln!(
            self.output,
            "Welcome to the Mental Health Predictor\n\n\
             This app uses a machine learning model to predict if you might seek mental \
             health treatment based on your input.\n\
             No personal data is stored. This is for educational purposes only.\n\n\
             [a] [{mark}] I agree to the Privacy Terms\n\
             [g] Let's Go!"
        )?;
        Ok(())
    }

    fn render_privacy(&mut self) -> Result<()> {
        writeln!(
            self.output,
            "Privacy Policy\n\n\
             - We do not store any personal data.\n\
             - All processing is temporary and local.\n\
             - This tool is for educational purposes only."
        )?;
        Ok(())
    }

    fn render_documentation(&mut self) -> Result<()> {
        writeln!(self.output, "Project Documentation\n")?;
        for (i, section) in DocSection::ALL.iter().enumerate() {
            let marker = if *section == self.doc_section { '*' } else { ' ' };
            writeln!(self.output, "{marker}[{}] {}", i + 1, section.title())?;
        }
        writeln!(
            self.output,
            "\n{}\n\n{}",
            self.doc_section.title(),
            self.doc_section.body()
        )?;
        Ok(())
    }

    fn render_model(&mut self) -> Result<()> {
        writeln!(
            self.output,
            "Mental Health Treatment Predictor\n\n\
             [f] Fill in the form and Make My Prediction!"
        )?;
        Ok(())
    }

    fn render_results(&mut self, stored: &StoredResult) -> Result<()> {
        let PredictionResult {
            decision,
            confidence,
            ci_low,
            ci_high,
        } = stored.prediction;
        let text = match decision {
            Decision::Likely => "Likely to seek mental health support.",
            Decision::Unlikely => "Unlikely to seek mental health support.",
        };

        writeln!(self.output, "Your Prediction Result\n")?;
        writeln!(self.output, "Prediction: {text}")?;
        writeln!(self.output, "Confidence: {}", percent(confidence))?;
        writeln!(
            self.output,
            "Approx. 95% CI: {} - {}",
            percent(ci_low),
            percent(ci_high)
        )?;
        writeln!(self.output, "\n{}", progress_bar(confidence))?;
        writeln!(self.output, "Model confidence: {}", percent(confidence))?;

        writeln!(self.output, "\nModel explanation (based on selected answers):")?;
        for line in explanations(&stored.answer) {
            writeln!(self.output, "- {line}")?;
        }

        writeln!(
            self.output,
            "\n[r] Download Your Report (PDF)\n[t] Try Again"
        )?;
        Ok(())
    }
}

fn stored_result(session: &Session) -> Result<&StoredResult> {
    session
        .result()
        .context("results page reached without a stored prediction")
}

fn sidebar_key(link: SidebarLink) -> char {
    match link {
        SidebarLink::Home => 'h',
        SidebarLink::PrivacyPolicy => 'p',
        SidebarLink::Documentation => 'd',
    }
}

fn sidebar_link(command: &str) -> Option<SidebarLink> {
    let mut chars = command.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return None;
    };
    SidebarLink::ALL
        .into_iter()
        .find(|link| sidebar_key(*link) == c)
}

/// Format a probability as a percentage with two decimals.
fn percent(p: f64) -> String {
    format!("{:.2}%", p * 100.0)
}

fn progress_bar(fraction: f64) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

/// Explanation bullets for the answers that were "Yes".
fn explanations(answer: &RawAnswer) -> Vec<&'static str> {
    let mut lines = Vec::new();
    if answer.answer(Question::FamilyHistory) == YesNo::Yes {
        lines.push("Family history can increase likelihood of treatment-seeking.");
    }
    if answer.answer(Question::SelfEmployed) == YesNo::Yes {
        lines.push("Self-employment may correlate with higher stress or lower access to benefits.");
    }
    if answer.answer(Question::RemoteWork) == YesNo::Yes {
        lines.push("Remote work can affect mental health patterns differently.");
    }
    lines
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::convert::Infallible;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    use super::*;
    use carecast_core::FeatureSchema;
    use carecast_io::REPORT_FILE;
    use tempfile::TempDir;

    struct FixedModel {
        p1: f64,
        calls: Cell<usize>,
    }

    impl ProbabilityModel for FixedModel {
        type Error = Infallible;

        fn n_features(&self) -> usize {
            1
        }

        fn n_classes(&self) -> usize {
            2
        }

        fn predict_proba(&self, _row: &[f64]) -> Result<Vec<f64>, Self::Error> {
            self.calls.set(self.calls.get() + 1);
            Ok(vec![1.0 - self.p1, self.p1])
        }
    }

    fn predictor(p1: f64) -> Predictor<FixedModel> {
        let model = FixedModel {
            p1,
            calls: Cell::new(0),
        };
        Predictor::new(model, FeatureSchema::new(["Age"]).unwrap()).unwrap()
    }

    /// Drive a fresh session with `script`, returning the session, the
    /// rendered output, and the report directory.
    fn drive(script: &str, predictor: &Predictor<FixedModel>) -> (Session, String, TempDir) {
        let dir = TempDir::new().unwrap();
        let reports = ReportWriter::new(dir.path()).unwrap();
        let mut session = Session::new();
        let mut output = Vec::new();
        Terminal::new(Cursor::new(script), &mut output)
            .run(&mut session, predictor, &reports)
            .unwrap();
        (session, String::from_utf8(output).unwrap(), dir)
    }

    #[test]
    fn full_flow_with_download_and_try_again() {
        let predictor = predictor(0.42);
        let script = "g\na\ng\nf\n\nno\nyes\nno\nyes\ny\nr\nt\nq\n";
        let (session, out, dir) = drive(script, &predictor);

        assert!(out.contains("Please agree to the privacy terms to continue."));
        assert!(out.contains("Prediction: Likely to seek mental health support."));
        assert!(out.contains("Confidence: 42.00%"));
        assert!(out.contains("Approx. 95% CI: 37.00% - 47.00%"));
        assert!(out.contains("- Family history can increase likelihood of treatment-seeking."));
        assert!(!out.contains("Self-employment may correlate"));
        assert!(dir.path().join(REPORT_FILE).exists());

        assert_eq!(session.page(), Page::Model);
        assert!(session.result().is_none());
        assert_eq!(predictor.model().calls.get(), 1);
    }

    #[test]
    fn unchecked_disclaimer_does_not_predict() {
        let predictor = predictor(0.9);
        let script = "a\ng\nf\n30\nyes\nyes\nyes\nyes\n\n";
        let (session, out, _dir) = drive(script, &predictor);

        assert!(out.contains("Please agree to the terms before generating a prediction."));
        assert_eq!(session.page(), Page::Model);
        assert!(session.result().is_none());
        assert_eq!(predictor.model().calls.get(), 0);
    }

    #[test]
    fn invalid_form_input_is_reprompted() {
        let predictor = predictor(0.1);
        let script = "a\ng\nf\n17\n101\nold\n45\nmaybe\nno\nno\nno\nno\nyes\n";
        let (session, out, _dir) = drive(script, &predictor);

        assert!(out.contains("age must be in [18, 100], got 17"));
        assert!(out.contains("age must be in [18, 100], got 101"));
        assert!(out.contains("Please enter a whole number of years."));
        assert!(out.contains("expected \"Yes\" or \"No\", got \"maybe\""));

        let stored = session.result().unwrap();
        assert_eq!(stored.answer.age().years(), 45);
        assert_eq!(stored.prediction.decision, Decision::Unlikely);
        assert!(out.contains("Confidence: 90.00%"));
    }

    #[test]
    fn sidebar_keeps_result_and_shows_documentation() {
        let predictor = predictor(0.7);
        let script = "a\ng\nf\n\nyes\nno\nno\nno\ny\nd\n3\np\n";
        let (session, out, _dir) = drive(script, &predictor);

        assert_eq!(session.page(), Page::PrivacyPolicy);
        assert!(session.result().is_some());
        assert!(out.contains("*[3] Project Structure"));
        assert!(out.contains("- All processing is temporary and local."));
    }

    /// Log sink shared between the subscriber and the test.
    #[derive(Clone, Default)]
    struct SharedLog(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn default_log_level_stays_quiet_during_session() {
        let log = SharedLog::default();
        let sink = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(crate::DEFAULT_LOG_FILTER)
            .with_writer(move || sink.clone())
            .finish();

        let predictor = predictor(0.6);
        // Full flow with a download, then the sidebar, Try Again and a rejected gate.
        let script = "g\na\ng\nf\n\nyes\nno\nno\nno\ny\nr\nd\nh\ng\nf\n\nno\nno\nno\nno\ny\nt\nq\n";
        let (session, out, dir) = tracing::subscriber::with_default(subscriber, || {
            drive(script, &predictor)
        });

        assert!(out.contains("Report saved to"));
        assert!(dir.path().join(REPORT_FILE).exists());
        assert_eq!(session.page(), Page::Model);
        assert_eq!(predictor.model().calls.get(), 2);
        let captured = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert!(captured.is_empty(), "unexpected log output: {captured}");
    }

    #[test]
    fn end_of_input_on_home_quits_cleanly() {
        let predictor = predictor(0.5);
        let (session, out, _dir) = drive("", &predictor);
        assert_eq!(session.page(), Page::Home);
        assert!(out.contains("Welcome to the Mental Health Predictor"));
    }

    #[test]
    fn unknown_commands_are_reported() {
        let predictor = predictor(0.5);
        let (_, out, _dir) = drive("zz\nq\n", &predictor);
        assert!(out.contains("Unknown command \"zz\"."));
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0.0), format!("[{}]", ".".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(1.0), format!("[{}]", "#".repeat(BAR_WIDTH)));
        assert_eq!(progress_bar(0.5).matches('#').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn documentation_choices() {
        assert_eq!(DocSection::from_choice("1"), Some(DocSection::Overview));
        assert_eq!(DocSection::from_choice("8"), Some(DocSection::ContactAndSupport));
        assert_eq!(DocSection::from_choice("0"), None);
        assert_eq!(DocSection::from_choice("9"), None);
    }
}
