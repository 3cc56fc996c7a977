//! Error capture stage tests: recoverable errors, panics, and the
//! shutdown-time fatal check.

use std::sync::Arc;

use logpipe::error::{Disposition, ErrorCaptureStage, ErrorClass, ErrorEvent, SourceLocation};
use logpipe::record::Level;

mod common;

#[tokio::test]
async fn test_fatal_shutdown_captures_exactly_once() {
    let (logger, sink) = common::recording_logger(Level::Debug);
    let reporter = Arc::new(common::RecordingReporter::new());
    let stage = ErrorCaptureStage::new(logger.clone(), reporter.clone(), false);

    stage.record_fatal(ErrorEvent::fatal(
        ErrorClass::OutOfMemory,
        "allocation failed",
        None,
    ));

    assert!(stage.capture_shutdown());
    logger.flush().await;

    let records = sink.records();
    let critical: Vec<_> = records
        .iter()
        .filter(|record| record.level == Level::Critical)
        .collect();
    assert_eq!(critical.len(), 1);
    assert_eq!(critical[0].message, "Fatal shutdown error");
    assert_eq!(reporter.event_count(), 1);

    // Terminal state: a second evaluation must do nothing.
    assert!(!stage.capture_shutdown());
    logger.flush().await;
    assert_eq!(reporter.event_count(), 1);
}

#[tokio::test]
async fn test_non_fatal_last_error_skips_shutdown_capture() {
    let (logger, sink) = common::recording_logger(Level::Debug);
    let reporter = Arc::new(common::RecordingReporter::new());
    let stage = ErrorCaptureStage::new(logger.clone(), reporter.clone(), false);

    let disposition = stage.capture_error(ErrorEvent::recoverable(
        Level::Warning,
        "deprecated call",
        Some(SourceLocation {
            file: "handlers/orders.rs".to_string(),
            line: 17,
        }),
    ));
    assert_eq!(disposition, Disposition::ContinueDefault);

    assert!(!stage.capture_shutdown());
    logger.flush().await;

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].level, Level::Error);
    assert_eq!(records[0].message, "Runtime error");
    assert_eq!(records[0].context["file"], serde_json::json!("handlers/orders.rs"));

    assert_eq!(reporter.message_count(), 1);
    assert_eq!(reporter.event_count(), 0);
}

#[tokio::test]
async fn test_suppress_policy_changes_disposition() {
    let (logger, _sink) = common::recording_logger(Level::Debug);
    let reporter = Arc::new(common::RecordingReporter::new());
    let stage = ErrorCaptureStage::new(logger, reporter, true);

    let disposition =
        stage.capture_error(ErrorEvent::recoverable(Level::Warning, "notice", None));
    assert_eq!(disposition, Disposition::Suppress);
}

#[tokio::test]
async fn test_no_captures_after_shutdown() {
    let (logger, sink) = common::recording_logger(Level::Debug);
    let reporter = Arc::new(common::RecordingReporter::new());
    let stage = ErrorCaptureStage::new(logger.clone(), reporter.clone(), false);

    assert!(!stage.capture_shutdown());

    stage.capture_error(ErrorEvent::recoverable(Level::Warning, "too late", None));
    logger.flush().await;

    assert!(sink.records().is_empty());
    assert_eq!(reporter.message_count(), 0);
}

#[tokio::test]
async fn test_panic_hook_captures_and_chains() {
    let (logger, sink) = common::recording_logger(Level::Debug);
    let reporter = Arc::new(common::RecordingReporter::new());
    let stage = ErrorCaptureStage::new(logger.clone(), reporter.clone(), false);
    stage.install();

    let result = std::panic::catch_unwind(|| panic!("boom in worker"));
    assert!(result.is_err());

    logger.flush().await;
    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].level, Level::Critical);
    assert_eq!(records[0].message, "Unhandled panic");
    assert_eq!(records[0].context["cause"], serde_json::json!("boom in worker"));
    assert!(records[0].context.contains_key("file"));

    assert_eq!(reporter.event_count(), 1);
}
