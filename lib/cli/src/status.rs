use crate::report::StatusReport;
use crate::{OutputFormat, PidFileArgs, StatusArgs};
use anyhow::Result;
use common::ConfigError;
use metrics::fs::OsFileSystem;
use metrics::pid::read_pid;
use metrics::MetricsCollector;
use owo_colors::OwoColorize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Error, Debug)]
pub enum StatusError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("metrics collection did not finish within {0:?}")]
    DeadlineExceeded(Duration),
}

/// Resolve the configuration and collect a report under the overall deadline.
pub async fn collect_status(
    args: &StatusArgs,
    collector: &MetricsCollector,
) -> Result<StatusReport, StatusError> {
    let config = args.config().resolve()?;
    let deadline = Duration::from_millis(*args.timeout_ms());

    let start = Instant::now();
    let (snapshot, errors) = tokio::time::timeout(
        deadline,
        collector.collect(&OsFileSystem, config.sampling_window(), &config),
    )
    .await
    .map_err(|_| StatusError::DeadlineExceeded(deadline))?;

    Ok(StatusReport::new(snapshot, &errors, start.elapsed()))
}

/// Returns whether the command succeeded. Partial results are a success
/// unless `--strict` was given.
#[instrument(skip(args))]
pub async fn handle_status_command(args: &StatusArgs) -> Result<bool> {
    let report = collect_status(args, &MetricsCollector::new()).await?;
    report.snapshot().log_snapshot(&report.failed_fields());

    let rendered = match args.format() {
        OutputFormat::Text => report.render_text(),
        OutputFormat::Json => report.render_json()?,
    };
    println!("{rendered}");

    info!(
        failed = report.errors().len(),
        "Status collection completed"
    );
    Ok(!(*args.strict() && report.has_errors()))
}

#[instrument(skip(args))]
pub async fn handle_pid_file_command(args: &PidFileArgs) -> Result<bool> {
    let config = args.config().resolve()?;

    match read_pid(&OsFileSystem, config.pid_file()).await {
        Ok(pid) => {
            println!("{pid}");
            Ok(true)
        }
        Err(err) => {
            eprintln!("{} {err}", "error".red());
            Ok(false)
        }
    }
}
