//! Shared helpers for integration tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use logpipe::error::{ErrorEvent, ErrorReporter};
use logpipe::logger::enrich::{CorrelationEnricher, EnrichmentChain, ProcessEnricher};
use logpipe::logger::redact::RedactionPolicy;
use logpipe::logger::Logger;
use logpipe::record::{Level, LogRecord};
use logpipe::sink::{Sink, SinkError, SinkHandle, SinkRouter};

/// Sink keeping records in memory for assertions.
#[derive(Clone, Default)]
pub struct RecordingSink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl Sink for RecordingSink {
    fn write(&mut self, record: &LogRecord) -> Result<(), SinkError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Sink that fails every write.
#[allow(dead_code)]
pub struct FailingSink;

impl Sink for FailingSink {
    fn write(&mut self, _record: &LogRecord) -> Result<(), SinkError> {
        Err(SinkError::Io(std::io::Error::other("injected failure")))
    }
}

/// Reporter recording every forwarded call.
#[derive(Clone, Default)]
pub struct RecordingReporter {
    messages: Arc<Mutex<Vec<String>>>,
    events: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message_count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl ErrorReporter for RecordingReporter {
    fn capture_message(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }

    fn capture_exception(&self, event: &ErrorEvent) {
        self.events.lock().unwrap().push(event.message.clone());
    }

    fn flush(&self, _timeout: Duration) -> bool {
        true
    }
}

/// Logger with the standard enrichers and redaction policy over the given
/// sink handles.
pub fn logger_with(handles: Vec<SinkHandle>) -> Logger {
    let enrichers = EnrichmentChain::new();
    enrichers.register(Arc::new(ProcessEnricher::new()));
    enrichers.register(Arc::new(CorrelationEnricher));
    Logger::new(
        enrichers,
        RedactionPolicy::new(["authorization", "cookie"]),
        SinkRouter::new(handles),
    )
}

/// Logger over a single in-memory sink accepting records at `min_level`.
#[allow(dead_code)]
pub fn recording_logger(min_level: Level) -> (Logger, RecordingSink) {
    let sink = RecordingSink::new();
    let handle = SinkHandle::spawn("recording", min_level, Box::new(sink.clone()));
    (logger_with(vec![handle]), sink)
}
