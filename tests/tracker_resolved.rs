// tests/tracker_resolved.rs

//! Runs where the first synchronous check settles everything.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use sesame::errors::SesameError;
use sesame::status::StatusClass;
use sesame::tracker::{ExecutionTracker, TrackOutcome, TrackerOptions};
use sesame::types::ResourceKind;
use sesame_test_utils::builders::{command_step, invocation, tag};
use sesame_test_utils::{
    ExecutionMetadataBuilder, FakeAutomationClient, MemorySink, init_tracing, with_timeout,
};

type TestResult = Result<(), Box<dyn Error>>;

const INTERVAL: Duration = Duration::from_millis(10);

fn options(id: &str) -> TrackerOptions {
    let mut options = TrackerOptions::new(id);
    options.poll_interval = INTERVAL;
    options
}

fn tracker(client: &Arc<FakeAutomationClient>, sink: &MemorySink, options: TrackerOptions) -> ExecutionTracker {
    ExecutionTracker::new(client.clone(), Arc::new(sink.clone()), options)
}

#[tokio::test]
async fn unknown_execution_id_aborts_without_polling() {
    init_tracing();

    let client = Arc::new(FakeAutomationClient::new().push_parent(vec![]));
    let sink = MemorySink::new();

    let result = with_timeout(tracker(&client, &sink, options("exec-1")).run()).await;

    match result {
        Err(SesameError::NotFound(id)) => assert_eq!(id, "exec-1"),
        other => panic!("expected NotFound, got {other:?}"),
    }
    let message = SesameError::NotFound("exec-1".into()).to_string();
    assert!(message.contains("No results for execution id"));

    tokio::time::sleep(INTERVAL * 5).await;
    assert_eq!(client.parent_calls(), 1);
    assert_eq!(client.children_calls(), 0);
    assert!(sink.lines().is_empty());
}

#[tokio::test]
async fn succeeded_parent_lists_children_once_without_scheduling() -> TestResult {
    init_tracing();

    let client = Arc::new(
        FakeAutomationClient::new()
            .push_parent(vec![ExecutionMetadataBuilder::parent("exec-2").status("Success").build()])
            .push_children(vec![
                ExecutionMetadataBuilder::child("exec-2", "i-aaa").status("Success").build(),
                ExecutionMetadataBuilder::child("exec-2", "mi-bbb")
                    .status("Failed")
                    .failure("boom")
                    .build(),
            ])
            .with_tags("i-aaa", vec![tag("Name", "web-1")])
            .with_tags("mi-bbb", vec![tag("Name", "db-1")]),
    );
    let sink = MemorySink::new();

    let report = with_timeout(tracker(&client, &sink, options("exec-2")).run()).await?;

    assert_eq!(report.outcome, TrackOutcome::AlreadyFinished { parent: StatusClass::Succeeded });
    assert_eq!(report.outcome.exit_code(), 0);
    assert_eq!(report.tasks_registered, 0);
    assert_eq!(report.signal_reads, 0);

    let parent_line = sink.position("PARENT: automation-id=[exec-2]").expect("parent line");
    assert!(sink.lines()[parent_line].contains("Success!"));

    let child_lines = sink.matching(" CHILD: ");
    assert_eq!(child_lines.len(), 2);
    assert!(child_lines[0].contains("web-1[i-aaa]"));
    assert!(child_lines[1].contains("db-1[mi-bbb]"));
    assert!(child_lines[1].contains("boom"));
    assert!(parent_line < sink.position("web-1[i-aaa]").unwrap());

    assert_eq!(
        client.tag_calls(),
        vec![
            ("i-aaa".to_string(), ResourceKind::Ec2Instance),
            ("mi-bbb".to_string(), ResourceKind::ManagedInstance),
        ]
    );

    // Nothing keeps polling in the background.
    tokio::time::sleep(INTERVAL * 5).await;
    assert_eq!(client.parent_calls(), 1);
    assert_eq!(client.children_calls(), 1);

    Ok(())
}

#[tokio::test]
async fn failed_parent_is_reported_without_listing_children() -> TestResult {
    init_tracing();

    let client = Arc::new(
        FakeAutomationClient::new()
            .push_parent(vec![ExecutionMetadataBuilder::parent("exec-3").status("TimedOut").build()]),
    );
    let sink = MemorySink::new();

    let report = with_timeout(tracker(&client, &sink, options("exec-3")).run()).await?;

    assert_eq!(report.outcome, TrackOutcome::AlreadyFinished { parent: StatusClass::Failed });
    assert_eq!(report.outcome.exit_code(), 3);
    assert_eq!(sink.matching("Failed!").len(), 1);
    assert_eq!(client.children_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn unrecognized_parent_status_fails_closed() -> TestResult {
    init_tracing();

    let client = Arc::new(
        FakeAutomationClient::new()
            .push_parent(vec![ExecutionMetadataBuilder::parent("exec-4").status("Teleporting").build()]),
    );
    let sink = MemorySink::new();

    let report = with_timeout(tracker(&client, &sink, options("exec-4")).run()).await?;

    assert_eq!(report.outcome, TrackOutcome::AlreadyFinished { parent: StatusClass::Failed });
    assert!(sink.lines()[0].contains("Teleporting"));
    Ok(())
}

#[tokio::test]
async fn remote_error_on_first_check_is_fatal() {
    init_tracing();

    let client = Arc::new(FakeAutomationClient::new().push_parent_error("throttled"));
    let sink = MemorySink::new();

    let result = with_timeout(tracker(&client, &sink, options("exec-5")).run()).await;

    assert!(matches!(result, Err(SesameError::RemoteService(msg)) if msg.contains("throttled")));
    assert_eq!(client.children_calls(), 0);
}

#[tokio::test]
async fn empty_execution_id_is_rejected_before_any_call() {
    let client = Arc::new(FakeAutomationClient::new());
    let sink = MemorySink::new();

    let result = tracker(&client, &sink, options("")).run().await;

    assert!(matches!(result, Err(SesameError::Config(_))));
    assert_eq!(client.parent_calls(), 0);
}

#[tokio::test]
async fn step_detail_prints_command_output_under_the_child() -> TestResult {
    init_tracing();

    let child = ExecutionMetadataBuilder::child("exec-6", "i-aaa")
        .status("Success")
        .output("runShell.Output", "ok")
        .build();
    let child_id = child.execution_id.clone();

    let client = Arc::new(
        FakeAutomationClient::new()
            .push_parent(vec![ExecutionMetadataBuilder::parent("exec-6").status("Success").build()])
            .push_children(vec![child])
            .with_steps(&child_id, vec![command_step("runShell", "cmd-1", "i-aaa")])
            .with_invocations("cmd-1", "i-aaa", vec![invocation("cmd-1", "i-aaa", "aws:runShellScript", "line one\nline two")]),
    );
    let sink = MemorySink::new();

    with_timeout(tracker(&client, &sink, options("exec-6")).run()).await?;

    let lines = sink.lines();
    let child_at = sink.position(" CHILD: ").unwrap();
    let step_at = sink.position(" STEP: runShell Success step-runShell").unwrap();
    let output_at = sink.position("[aws:runShellScript:cmd-1]: output:").unwrap();
    assert!(child_at < step_at && step_at < output_at);
    assert!(lines[output_at].contains("\tline one\n\tline two"));
    assert_eq!(sink.matching("runShell.Output: ok").len(), 1);
    Ok(())
}

#[tokio::test]
async fn step_detail_failure_does_not_abort_the_run() -> TestResult {
    init_tracing();

    let client = Arc::new(
        FakeAutomationClient::new()
            .push_parent(vec![ExecutionMetadataBuilder::parent("exec-7").status("Success").build()])
            .push_children(vec![ExecutionMetadataBuilder::child("exec-7", "i-aaa").status("Success").build()])
            .fail_step_detail(),
    );
    let sink = MemorySink::new();

    let report = with_timeout(tracker(&client, &sink, options("exec-7")).run()).await?;

    assert_eq!(report.outcome.exit_code(), 0);
    assert_eq!(client.step_calls(), 1);
    assert_eq!(sink.matching(" CHILD: ").len(), 1);
    Ok(())
}

#[tokio::test]
async fn step_detail_can_be_disabled() -> TestResult {
    let client = Arc::new(
        FakeAutomationClient::new()
            .push_parent(vec![ExecutionMetadataBuilder::parent("exec-8").status("Success").build()])
            .push_children(vec![ExecutionMetadataBuilder::child("exec-8", "i-aaa").status("Success").build()]),
    );
    let sink = MemorySink::new();
    let mut opts = options("exec-8");
    opts.step_detail = false;

    with_timeout(tracker(&client, &sink, opts).run()).await?;

    assert_eq!(client.step_calls(), 0);
    Ok(())
}
