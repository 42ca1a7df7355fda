// src/logging.rs

//! `tracing` setup for the `sesame` binary.
//!
//! Logs go to stderr; stdout carries only the progress stream.
//!
//! The filter is built from `SESAME_LOG`, which takes full `EnvFilter`
//! directives such as `sesame::tracker=debug,sesame::scheduler=warn`.
//! `--log-level` (or `info` without it) is the default directive and covers
//! every target `SESAME_LOG` does not name. A bare level in `SESAME_LOG`
//! replaces that default.

use anyhow::{Context, Result, anyhow};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "SESAME_LOG";

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let directives = std::env::var(LOG_ENV).ok();
    let filter = build_filter(cli_level, directives.as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("installing tracing subscriber: {err}"))
}

/// Filter from the `SESAME_LOG` value (if any) on top of the CLI level.
pub fn build_filter(cli_level: Option<LogLevel>, directives: Option<&str>) -> Result<EnvFilter> {
    let default = cli_level.map(LevelFilter::from).unwrap_or(LevelFilter::INFO);
    let directives = directives.unwrap_or_default().trim();

    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .parse(directives)
        .with_context(|| format!("invalid {LOG_ENV} directives"))?;

    // The builder only falls back to the default when the value is empty.
    if has_bare_level(directives) {
        Ok(filter)
    } else {
        Ok(filter.add_directive(default.into()))
    }
}

fn has_bare_level(directives: &str) -> bool {
    directives
        .split(',')
        .any(|part| part.trim().parse::<LevelFilter>().is_ok())
}
