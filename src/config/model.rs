// src/config/model.rs

use serde::Deserialize;

use crate::types::PollBudget;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [tracker]
/// poll_interval_ms = 2000
/// max_poll_count = 40        # -1 polls until done
/// max_results = 50
/// reprint_finished_children = false
/// step_detail = true
/// name_tag = "Name"
///
/// [aws]
/// region = "eu-west-1"
/// profile = "ops"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub tracker: TrackerSection,

    #[serde(default)]
    pub aws: AwsSection,
}

/// Validated configuration. Only obtainable through
/// `ConfigFile::try_from(RawConfigFile)` or [`ConfigFile::default`].
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub tracker: TrackerSection,
    pub aws: AwsSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(tracker: TrackerSection, aws: AwsSection) -> Self {
        Self { tracker, aws }
    }
}

/// `[tracker]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackerSection {
    /// Interval between two polls of the same task.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Signal reads before giving up; negative means unbounded.
    #[serde(default)]
    pub max_poll_count: PollBudget,

    /// Page size for execution queries (service maximum is 50).
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// If true, terminal children are printed on every poll rather than once.
    #[serde(default)]
    pub reprint_finished_children: bool,

    /// Fetch step and command output for finished children.
    #[serde(default = "default_true")]
    pub step_detail: bool,

    #[serde(default = "default_name_tag")]
    pub name_tag: String,

    #[serde(default = "default_signal_capacity")]
    pub signal_capacity: usize,
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_max_results() -> u32 {
    50
}

fn default_true() -> bool {
    true
}

fn default_name_tag() -> String {
    "Name".to_string()
}

fn default_signal_capacity() -> usize {
    64
}

impl Default for TrackerSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_poll_count: PollBudget::default(),
            max_results: default_max_results(),
            reprint_finished_children: false,
            step_detail: default_true(),
            name_tag: default_name_tag(),
            signal_capacity: default_signal_capacity(),
        }
    }
}

/// `[aws]` section: how to reach the automation service. Anything unset is
/// resolved by the SDK's default chain (environment, shared config files,
/// instance metadata).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AwsSection {
    #[serde(default)]
    pub region: Option<String>,

    /// Named profile from the shared config files.
    #[serde(default)]
    pub profile: Option<String>,

    /// Override the service endpoint, e.g. a local emulator.
    #[serde(default)]
    pub endpoint_url: Option<String>,
}
