//! Global error capture stage.
//!
//! # Data Flow
//! ```text
//! Recoverable runtime error ──▶ capture_error()   ──▶ ERROR record + reporter
//! Panic (unhandled)         ──▶ panic hook        ──▶ CRITICAL record + reporter
//! Process teardown          ──▶ capture_shutdown()──▶ CRITICAL record + reporter
//!                                                     (fatal classes only, once)
//! ```
//!
//! # Design Decisions
//! - One process-scoped instance, constructed at startup and injected where
//!   needed; init-once, no teardown beyond the shutdown hook
//! - The installed panic hook chains to the previously installed hook, so
//!   the platform's default reaction still runs after capture
//! - Every path here is infallible by construction: reporter failures are
//!   handled inside the reporter, logging is fire-and-forget, and the state
//!   machine refuses re-entry after shutdown capture begins

use std::panic::PanicHookInfo;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::Value;

use crate::error::event::{ErrorEvent, SourceLocation};
use crate::error::reporter::ErrorReporter;
use crate::logger::Logger;
use crate::record::Level;

/// Handlers installed, waiting for events.
const ARMED: u8 = 0;
/// A capture is being logged and forwarded.
const CAPTURING: u8 = 1;
/// Terminal: shutdown-time capture has run.
const SHUTDOWN_CAPTURING: u8 = 2;

/// What the platform should do after a recoverable error was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Let default handling continue.
    ContinueDefault,
    /// The capture fully handled the error.
    Suppress,
}

/// Process-wide error capture: recoverable errors, panics, and the
/// shutdown-time fatal check all funnel through one instance.
pub struct ErrorCaptureStage {
    logger: Logger,
    reporter: Arc<dyn ErrorReporter>,
    suppress_default: bool,
    state: AtomicU8,
    last_error: Mutex<Option<ErrorEvent>>,
}

impl ErrorCaptureStage {
    /// Create the stage. `suppress_default` selects the [`Disposition`]
    /// returned for recoverable errors.
    pub fn new(
        logger: Logger,
        reporter: Arc<dyn ErrorReporter>,
        suppress_default: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            logger,
            reporter,
            suppress_default,
            state: AtomicU8::new(ARMED),
            last_error: Mutex::new(None),
        })
    }

    /// Install the panic hook, chaining to the previously installed hook so
    /// the runtime's default reaction (backtrace, abort policy) still runs.
    pub fn install(self: &Arc<Self>) {
        let stage = Arc::clone(self);
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            stage.capture_panic(info);
            previous(info);
        }));
    }

    /// Capture a recoverable runtime error: log at ERROR, forward to the
    /// reporter, and tell the caller whether default handling should
    /// continue. Never fails.
    pub fn capture_error(&self, event: ErrorEvent) -> Disposition {
        if !self.enter_capture() {
            return Disposition::ContinueDefault;
        }

        self.remember(&event);
        self.logger
            .log(Level::Error, "Runtime error", Value::Object(event.context()));
        self.reporter
            .capture_message(&format!("Runtime error: {}", event.summary()));

        self.exit_capture();
        if self.suppress_default {
            Disposition::Suppress
        } else {
            Disposition::ContinueDefault
        }
    }

    /// Record a fatal-class error for the shutdown-time check without
    /// capturing it now (startup parse failures, allocation faults).
    pub fn record_fatal(&self, event: ErrorEvent) {
        self.remember(&event);
    }

    /// Evaluate the last recorded error at process teardown, exactly once.
    ///
    /// Only fatal classes produce a capture: one CRITICAL record and one
    /// synchronous reporter call. Returns whether a capture occurred.
    pub fn capture_shutdown(&self) -> bool {
        if self.state.swap(SHUTDOWN_CAPTURING, Ordering::AcqRel) == SHUTDOWN_CAPTURING {
            return false;
        }

        let last = self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let Some(event) = last else {
            return false;
        };
        if !event.class.is_fatal() {
            return false;
        }

        self.logger.log(
            Level::Critical,
            "Fatal shutdown error",
            Value::Object(event.context()),
        );
        self.reporter.capture_exception(&event);
        // There is no "later" after process exit; wait for delivery.
        self.reporter.flush(Duration::from_secs(2));
        true
    }

    fn capture_panic(&self, info: &PanicHookInfo<'_>) {
        if !self.enter_capture() {
            return;
        }

        let location = info.location().map(|location| SourceLocation {
            file: location.file().to_string(),
            line: location.line(),
        });
        let event = ErrorEvent::unhandled("Unhandled panic", Some(panic_message(info)), location);

        self.remember(&event);
        self.logger.log(
            Level::Critical,
            "Unhandled panic",
            Value::Object(event.context()),
        );
        self.reporter.capture_exception(&event);

        self.exit_capture();
    }

    fn remember(&self, event: &ErrorEvent) {
        *self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(event.clone());
    }

    /// Captures are refused only after shutdown capture has begun.
    fn enter_capture(&self) -> bool {
        if self.state.load(Ordering::Acquire) == SHUTDOWN_CAPTURING {
            return false;
        }
        let _ = self
            .state
            .compare_exchange(ARMED, CAPTURING, Ordering::AcqRel, Ordering::Acquire);
        true
    }

    fn exit_capture(&self) {
        let _ = self
            .state
            .compare_exchange(CAPTURING, ARMED, Ordering::AcqRel, Ordering::Acquire);
    }
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    let payload = info.payload();
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
