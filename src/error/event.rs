//! Error event types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::record::Level;

/// How an error reached the capture stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Non-fatal runtime signal; default platform handling may continue.
    RecoverableRuntime,
    /// A panic or other uncaught failure.
    UnhandledException,
    /// Fatal-class error evaluated at process teardown.
    FatalShutdown,
}

/// Coarse failure class, used to decide shutdown-time capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorClass {
    /// Allocation / memory exhaustion.
    OutOfMemory,
    /// Configuration or input that could not be parsed at startup.
    Parse,
    /// Faults in the process core (aborts, corrupted state).
    CoreFault,
    /// Ordinary runtime failure.
    Runtime,
}

impl ErrorClass {
    /// Classes that warrant a capture at process teardown.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ErrorClass::Runtime)
    }
}

/// Source position an error was detected at, when known.
#[derive(Debug, Clone, Serialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// One captured failure, created at detection and discarded once logged and
/// forwarded. Never queued, never retried.
#[derive(Debug, Clone)]
pub struct ErrorEvent {
    pub kind: ErrorKind,
    pub class: ErrorClass,
    pub severity: Level,
    pub message: String,
    pub source_location: Option<SourceLocation>,
    pub cause: Option<String>,
    pub captured_at: DateTime<Utc>,
}

impl ErrorEvent {
    /// A warning/notice-class runtime signal.
    pub fn recoverable(
        severity: Level,
        message: impl Into<String>,
        source_location: Option<SourceLocation>,
    ) -> Self {
        Self {
            kind: ErrorKind::RecoverableRuntime,
            class: ErrorClass::Runtime,
            severity,
            message: message.into(),
            source_location,
            cause: None,
            captured_at: Utc::now(),
        }
    }

    /// An uncaught failure (panic) with its rendered cause.
    pub fn unhandled(
        message: impl Into<String>,
        cause: Option<String>,
        source_location: Option<SourceLocation>,
    ) -> Self {
        Self {
            kind: ErrorKind::UnhandledException,
            class: ErrorClass::Runtime,
            severity: Level::Critical,
            message: message.into(),
            source_location,
            cause,
            captured_at: Utc::now(),
        }
    }

    /// A fatal-class error, eligible for shutdown-time capture.
    pub fn fatal(
        class: ErrorClass,
        message: impl Into<String>,
        source_location: Option<SourceLocation>,
    ) -> Self {
        Self {
            kind: ErrorKind::FatalShutdown,
            class,
            severity: Level::Critical,
            message: message.into(),
            source_location,
            cause: None,
            captured_at: Utc::now(),
        }
    }

    /// Context map for the log record describing this event.
    pub fn context(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("severity".to_string(), json!(self.severity.as_str()));
        map.insert("message".to_string(), json!(self.message));
        if let Some(location) = &self.source_location {
            map.insert("file".to_string(), json!(location.file));
            map.insert("line".to_string(), json!(location.line));
        }
        if let Some(cause) = &self.cause {
            map.insert("cause".to_string(), json!(cause));
        }
        map
    }

    /// One-line rendering for `capture_message`-style forwarding.
    pub fn summary(&self) -> String {
        match &self.source_location {
            Some(location) => format!("{} | {}", self.message, location),
            None => self.message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classes() {
        assert!(ErrorClass::OutOfMemory.is_fatal());
        assert!(ErrorClass::Parse.is_fatal());
        assert!(ErrorClass::CoreFault.is_fatal());
        assert!(!ErrorClass::Runtime.is_fatal());
    }

    #[test]
    fn test_context_includes_location() {
        let event = ErrorEvent::recoverable(
            Level::Warning,
            "deprecated call",
            Some(SourceLocation {
                file: "handlers/orders.rs".to_string(),
                line: 42,
            }),
        );

        let context = event.context();
        assert_eq!(context["severity"], json!("WARNING"));
        assert_eq!(context["file"], json!("handlers/orders.rs"));
        assert_eq!(context["line"], json!(42));
    }

    #[test]
    fn test_summary_appends_location() {
        let event = ErrorEvent::unhandled(
            "index out of bounds",
            None,
            Some(SourceLocation {
                file: "src/main.rs".to_string(),
                line: 7,
            }),
        );
        assert_eq!(event.summary(), "index out of bounds | src/main.rs:7");
    }
}
