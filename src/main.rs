use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use carecast_core::{Session, Threshold};
use carecast_io::{ArtifactPaths, ReportWriter};

mod ui;

/// Log filter used without `--verbose` or `--quiet`. Session activity logs below it.
const DEFAULT_LOG_FILTER: &str = "info";

use ui::Terminal;

#[derive(Parser)]
#[command(name = "carecast")]
#[command(about = "Predict whether a tech worker is likely to seek mental health treatment")]
#[command(version)]
struct Cli {
    /// Directory holding mental_health_model.bin and model_features.json
    #[arg(long, default_value = ".")]
    artifacts_dir: PathBuf,

    /// Class-1 probability at or above which "likely" is predicted
    #[arg(long, default_value_t = 0.4)]
    threshold: f64,

    /// Directory that downloaded reports are written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Enable verbose (debug-level) logging
    #[arg(long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => DEFAULT_LOG_FILTER,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let threshold = Threshold::new(cli.threshold).context("invalid --threshold")?;

    // Both artifacts must load before the first page is drawn.
    let paths = ArtifactPaths::in_dir(&cli.artifacts_dir);
    let predictor = paths
        .load_predictor(threshold)
        .with_context(|| {
            format!("failed to load model artifacts from {}", cli.artifacts_dir.display())
        })?;

    let reports =
        ReportWriter::new(&cli.output_dir).context("failed to prepare report directory")?;

    info!(
        artifacts = %cli.artifacts_dir.display(),
        output = %cli.output_dir.display(),
        "starting session"
    );

    let mut session = Session::new();
    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    Terminal::new(stdin, stdout)
        .run(&mut session, &predictor, &reports)
        .context("session aborted")?;

    Ok(())
}
