// src/config/validate.rs

use crate::config::model::{AwsSection, ConfigFile, RawConfigFile, TrackerSection};
use crate::errors::{Result, SesameError};

/// The service rejects larger pages.
pub const MAX_RESULTS_LIMIT: u32 = 50;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SesameError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_tracker(&raw.tracker)?;
        validate_aws(&raw.aws)?;
        Ok(ConfigFile::new_unchecked(raw.tracker, raw.aws))
    }
}

fn validate_tracker(tracker: &TrackerSection) -> Result<()> {
    if tracker.poll_interval_ms == 0 {
        return Err(SesameError::Config(
            "[tracker].poll_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    if tracker.max_results == 0 || tracker.max_results > MAX_RESULTS_LIMIT {
        return Err(SesameError::Config(format!(
            "[tracker].max_results must be between 1 and {MAX_RESULTS_LIMIT} (got {})",
            tracker.max_results
        )));
    }

    if tracker.signal_capacity < 2 {
        return Err(SesameError::Config(format!(
            "[tracker].signal_capacity must be >= 2 (got {})",
            tracker.signal_capacity
        )));
    }

    if tracker.name_tag.trim().is_empty() {
        return Err(SesameError::Config(
            "[tracker].name_tag cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_aws(aws: &AwsSection) -> Result<()> {
    let fields = [
        ("region", &aws.region),
        ("profile", &aws.profile),
        ("endpoint_url", &aws.endpoint_url),
    ];
    for (name, value) in fields {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(SesameError::Config(format!(
                "[aws].{name} cannot be empty when set"
            )));
        }
    }
    Ok(())
}
