// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::types::PollBudget;

/// Command-line arguments for `sesame`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sesame",
    version,
    about = "Follow automation executions across a fleet of managed hosts.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Sesame.toml` in the current working directory, if present.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SESAME_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Track a started automation execution and its per-host children.
    Trackomate(TrackomateArgs),
}

#[derive(Debug, Clone, Args)]
pub struct TrackomateArgs {
    /// Automation execution id returned by start-automation-execution.
    #[arg(short = 'i', long = "id", value_name = "EXECUTION_ID")]
    pub id: String,

    /// Times to poll for pending work before giving up (-1 polls until the
    /// execution tree reaches a terminal state). Default: 40.
    #[arg(
        short = 'p',
        long = "max-poll-count",
        visible_alias = "maxPollCount",
        allow_negative_numbers = true,
        value_name = "N"
    )]
    pub max_poll_count: Option<PollBudget>,

    /// Milliseconds between two polls.
    #[arg(long, value_name = "MS")]
    pub interval_ms: Option<u64>,

    /// Print finished children on every poll instead of once.
    #[arg(long)]
    pub reprint_finished_children: bool,

    /// Skip step and command output for finished children.
    #[arg(long)]
    pub no_step_detail: bool,

    /// AWS region; overrides `[aws].region`.
    #[arg(long, value_name = "REGION")]
    pub region: Option<String>,

    /// AWS named profile; overrides `[aws].profile`.
    #[arg(long, value_name = "PROFILE")]
    pub profile: Option<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trackomate_with_negative_poll_count() {
        let args = CliArgs::try_parse_from(["sesame", "trackomate", "-i", "exec-1", "-p", "-1"]).unwrap();
        let Command::Trackomate(track) = args.command;
        assert_eq!(track.id, "exec-1");
        assert_eq!(track.max_poll_count, Some(PollBudget::Unbounded));
    }

    #[test]
    fn poll_count_is_optional() {
        let args = CliArgs::try_parse_from(["sesame", "trackomate", "--id", "exec-1"]).unwrap();
        let Command::Trackomate(track) = args.command;
        assert_eq!(track.max_poll_count, None);
        assert!(!track.no_step_detail);
    }

    #[test]
    fn id_is_required() {
        assert!(CliArgs::try_parse_from(["sesame", "trackomate"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args = CliArgs::try_parse_from([
            "sesame", "trackomate", "-i", "exec-1", "--config", "x.toml", "--log-level", "debug",
        ])
        .unwrap();
        assert_eq!(args.config.as_deref(), Some("x.toml"));
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    }
}
