//! External error reporter interface and HTTP implementation.
//!
//! # Responsibilities
//! - Forward captured errors to an external tracking service
//! - Stay fire-and-forget: callers never wait on delivery
//! - Offer a synchronous drain for the shutdown path
//!
//! # Design Decisions
//! - Delivery runs on a dedicated OS thread with a blocking HTTP client, so
//!   it works identically inside and outside the async runtime (the panic
//!   hook and the shutdown path are both plain synchronous code)
//! - A failed delivery costs exactly one local log line and is then
//!   forgotten; there is no retry queue
//! - Reporter implementations must not panic; capture must never cascade

use std::sync::mpsc;
use std::time::Duration;

use serde_json::json;

use crate::config::schema::ReportingConfig;
use crate::error::event::ErrorEvent;
use crate::record::format_timestamp;

/// Collaborator that ships captured errors off-process.
pub trait ErrorReporter: Send + Sync {
    /// Forward a one-line message. Fire-and-forget.
    fn capture_message(&self, message: &str);

    /// Forward a full error event. Fire-and-forget.
    fn capture_exception(&self, event: &ErrorEvent);

    /// Wait for in-flight deliveries, up to `timeout`. Returns whether the
    /// queue drained. Only the shutdown path should call this.
    fn flush(&self, timeout: Duration) -> bool {
        let _ = timeout;
        true
    }
}

/// Reporter used when external reporting is disabled.
pub struct NoopReporter;

impl ErrorReporter for NoopReporter {
    fn capture_message(&self, _message: &str) {}

    fn capture_exception(&self, _event: &ErrorEvent) {}
}

enum Delivery {
    Payload(serde_json::Value),
    Flush(mpsc::Sender<()>),
}

/// Posts error events as JSON to a configured HTTP endpoint.
pub struct HttpReporter {
    tx: mpsc::Sender<Delivery>,
}

impl HttpReporter {
    /// Start the delivery thread. Never fails; if the HTTP client cannot be
    /// built the reporter degrades to draining its queue.
    pub fn new(config: &ReportingConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        let endpoint = config.endpoint.clone();
        let timeout = Duration::from_millis(config.timeout_ms);

        std::thread::Builder::new()
            .name("error-reporter".to_string())
            .spawn(move || run_delivery(endpoint, timeout, rx))
            .map(|_| ())
            .unwrap_or_else(|error| {
                tracing::error!(error = %error, "failed to start error reporter thread");
            });

        Self { tx }
    }

    fn enqueue(&self, payload: serde_json::Value) {
        // A closed channel means the delivery thread is gone; nothing left
        // to do but drop the event.
        let _ = self.tx.send(Delivery::Payload(payload));
    }
}

impl ErrorReporter for HttpReporter {
    fn capture_message(&self, message: &str) {
        self.enqueue(json!({ "message": message }));
    }

    fn capture_exception(&self, event: &ErrorEvent) {
        self.enqueue(json!({
            "message": event.message,
            "kind": event.kind,
            "class": event.class,
            "level": event.severity.as_str(),
            "location": event.source_location.as_ref().map(ToString::to_string),
            "cause": event.cause,
            "captured_at": format_timestamp(&event.captured_at),
        }));
    }

    fn flush(&self, timeout: Duration) -> bool {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.tx.send(Delivery::Flush(ack_tx)).is_err() {
            return false;
        }
        ack_rx.recv_timeout(timeout).is_ok()
    }
}

fn run_delivery(endpoint: String, timeout: Duration, rx: mpsc::Receiver<Delivery>) {
    let client = reqwest::blocking::Client::builder().timeout(timeout).build();

    while let Ok(delivery) = rx.recv() {
        match delivery {
            Delivery::Payload(payload) => match &client {
                Ok(client) => {
                    if let Err(error) = client.post(&endpoint).json(&payload).send() {
                        tracing::warn!(error = %error, "error report delivery failed");
                    }
                }
                Err(error) => {
                    tracing::warn!(error = %error, "error reporter client unavailable");
                }
            },
            Delivery::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
}
