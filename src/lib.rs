// src/lib.rs

pub mod cli;
pub mod client;
pub mod config;
pub mod errors;
pub mod logging;
pub mod scheduler;
pub mod status;
pub mod tracker;
pub mod types;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::cli::{CliArgs, Command, TrackomateArgs};
use crate::client::AwsSdkClient;
use crate::config::{AwsSection, ConfigFile, load_or_default};
use crate::errors::SesameError;
use crate::tracker::{ExecutionTracker, StdoutSink, TrackerOptions};

/// High-level entry point used by `main.rs`. Returns the process exit code.
///
/// This wires together:
/// - config loading + CLI overrides
/// - the AWS SDK client
/// - the execution tracker writing to stdout
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_or_default(args.config.as_deref().map(Path::new))?;

    match args.command {
        Command::Trackomate(track) => trackomate(&cfg, track).await,
    }
}

async fn trackomate(cfg: &ConfigFile, args: TrackomateArgs) -> Result<i32> {
    info!("trackomate called: [id={}]", args.id);
    if args.id.trim().is_empty() {
        return Err(SesameError::Config("id cannot be empty".to_string()).into());
    }

    let options = tracker_options(cfg, &args)?;

    let client = AwsSdkClient::from_config(&aws_section(cfg, &args)).await;

    let tracker = ExecutionTracker::new(Arc::new(client), Arc::new(StdoutSink), options);
    let report = tracker.run().await?;

    info!(outcome = ?report.outcome, reads = report.signal_reads, "trackomate finished");
    Ok(report.outcome.exit_code())
}

/// Tracker options from config, with CLI flags taking precedence.
fn tracker_options(cfg: &ConfigFile, args: &TrackomateArgs) -> Result<TrackerOptions> {
    let mut options = TrackerOptions::from_config(args.id.trim(), &cfg.tracker);

    if let Some(budget) = args.max_poll_count {
        options.budget = budget;
    }
    if let Some(ms) = args.interval_ms {
        if ms == 0 {
            return Err(SesameError::Config("--interval-ms must be >= 1".to_string()).into());
        }
        options.poll_interval = Duration::from_millis(ms);
    }
    if args.reprint_finished_children {
        options.reprint_finished_children = true;
    }
    if args.no_step_detail {
        options.step_detail = false;
    }

    Ok(options)
}

/// `[aws]` settings with `--region` / `--profile` taking precedence.
fn aws_section(cfg: &ConfigFile, args: &TrackomateArgs) -> AwsSection {
    let mut aws = cfg.aws.clone();
    if args.region.is_some() {
        aws.region = args.region.clone();
    }
    if args.profile.is_some() {
        aws.profile = args.profile.clone();
    }
    aws
}
