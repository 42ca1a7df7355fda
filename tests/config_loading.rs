// tests/config_loading.rs

use std::fs;

use sesame::config::{load_and_validate, load_or_default};
use sesame::errors::SesameError;
use sesame::types::PollBudget;
use tempfile::tempdir;

#[test]
fn loads_a_full_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("Sesame.toml");
    fs::write(
        &path,
        r#"
[tracker]
poll_interval_ms = 500
max_poll_count = -1
max_results = 20
reprint_finished_children = true
step_detail = false
name_tag = "Hostname"

[aws]
region = "eu-west-1"
profile = "ops"
endpoint_url = "http://localhost:4566"
"#,
    )
    .unwrap();

    let cfg = load_or_default(Some(path.as_path())).unwrap();
    assert_eq!(cfg.tracker.poll_interval_ms, 500);
    assert_eq!(cfg.tracker.max_poll_count, PollBudget::Unbounded);
    assert_eq!(cfg.tracker.max_results, 20);
    assert!(cfg.tracker.reprint_finished_children);
    assert!(!cfg.tracker.step_detail);
    assert_eq!(cfg.tracker.name_tag, "Hostname");
    assert_eq!(cfg.aws.endpoint_url.as_deref(), Some("http://localhost:4566"));
    assert_eq!(cfg.aws.region.as_deref(), Some("eu-west-1"));
    assert_eq!(cfg.aws.profile.as_deref(), Some("ops"));
}

#[test]
fn partial_file_keeps_remaining_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("partial.toml");
    fs::write(&path, "[aws]\nregion = \"us-east-1\"\n").unwrap();

    let cfg = load_and_validate(&path).unwrap();
    assert_eq!(cfg.tracker.poll_interval_ms, 2000);
    assert_eq!(cfg.tracker.max_poll_count, PollBudget::Bounded(40));
    assert_eq!(cfg.tracker.max_results, 50);
    assert_eq!(cfg.tracker.signal_capacity, 64);
    assert_eq!(cfg.aws.region.as_deref(), Some("us-east-1"));
    assert!(cfg.aws.profile.is_none());
}

#[test]
fn explicit_missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let err = load_or_default(Some(dir.path().join("nope.toml").as_path())).unwrap_err();
    assert!(matches!(err, SesameError::Io(_)));
}

#[test]
fn out_of_range_values_are_rejected_after_parsing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[tracker]\nsignal_capacity = 1\n").unwrap();

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, SesameError::Config(msg) if msg.contains("signal_capacity")));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[tracker\npoll_interval_ms = ").unwrap();

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, SesameError::Toml(_)));
}
