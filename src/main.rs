//! CLI entry point for the symptom rater.
//!
//! Reads a food/symptom diary export, attributes every symptom to the
//! consumables eaten within the onset window before it, and writes a
//! ranking from safest to most dangerous.

use anyhow::Result;
use clap::Parser;
use std::ffi::OsStr;
use std::path::Path;
use symptom_rater::analyzers::analyzer::run;
use symptom_rater::config::{Cli, Config};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let cli = Cli::parse();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/symptom_rater.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("symptom_rater.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let config = Config::load(cli).inspect_err(|e| error!(error = %e, "Invalid configuration"))?;

    info!(
        input = %config.input_file.display(),
        output = %config.output_file.display(),
        onset_hours = config.symptom_onset_hours,
        min_times_consumed = config.min_times_consumed,
        rank_by = ?config.rank_by,
        "Rating diary"
    );

    run(&config).inspect_err(|e| error!(error = %e, "Diary rating failed"))?;

    Ok(())
}
