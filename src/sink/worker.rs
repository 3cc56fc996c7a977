//! Per-sink writer tasks.
//!
//! # Responsibilities
//! - Own one sink and serialize all writes to it
//! - Bound backpressure: a slow destination drops records instead of
//!   stalling the request path
//! - Report write failures once per incident on the fallback channel
//!
//! # Design Decisions
//! - One bounded mpsc channel per sink; `dispatch` uses `try_send`, so the
//!   caller never blocks on file I/O
//! - Failure and recovery are logged on state transitions, not per record,
//!   to keep a broken disk from flooding stderr
//! - Flush is a token through the same channel, so it orders after every
//!   record already accepted

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::record::{Level, LogRecord};
use crate::sink::Sink;

/// Queue capacity per sink before records are dropped.
const DEFAULT_CAPACITY: usize = 1024;

enum Command {
    Record(Arc<LogRecord>),
    Flush(oneshot::Sender<()>),
}

/// Sending half of one sink's writer task.
pub struct SinkHandle {
    name: String,
    min_level: Level,
    tx: mpsc::Sender<Command>,
    dropped: Arc<AtomicU64>,
}

impl SinkHandle {
    /// Spawn a writer task owning `sink` and return its handle.
    ///
    /// Must be called within a tokio runtime.
    pub fn spawn(name: impl Into<String>, min_level: Level, sink: Box<dyn Sink>) -> Self {
        Self::spawn_with_capacity(name, min_level, sink, DEFAULT_CAPACITY)
    }

    /// Like [`SinkHandle::spawn`] with an explicit queue capacity.
    pub fn spawn_with_capacity(
        name: impl Into<String>,
        min_level: Level,
        sink: Box<dyn Sink>,
        capacity: usize,
    ) -> Self {
        let name = name.into();
        let (tx, rx) = mpsc::channel(capacity.max(1));
        tokio::spawn(run_writer(name.clone(), sink, rx));
        Self {
            name,
            min_level,
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Sink name, as configured.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this sink wants records at `level`.
    pub fn accepts(&self, level: Level) -> bool {
        level >= self.min_level
    }

    /// Hand a record to the writer without waiting.
    ///
    /// A full queue drops the record for this sink only; the first drop is
    /// noted on the fallback channel.
    pub fn send(&self, record: Arc<LogRecord>) {
        if self.tx.try_send(Command::Record(record)).is_err() {
            let dropped = self.dropped.fetch_add(1, Ordering::Relaxed);
            if dropped == 0 {
                tracing::warn!(
                    sink = %self.name,
                    "sink queue full, dropping records"
                );
            }
        }
    }

    /// Records dropped because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Wait until every record accepted so far has been written.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(ack_tx)).await.is_ok() {
            let _ = ack_rx.await;
        }
    }
}

async fn run_writer(name: String, mut sink: Box<dyn Sink>, mut rx: mpsc::Receiver<Command>) {
    let mut failing = false;
    while let Some(command) = rx.recv().await {
        match command {
            Command::Record(record) => match sink.write(&record) {
                Ok(()) => {
                    if failing {
                        tracing::info!(sink = %name, "sink recovered");
                        failing = false;
                    }
                }
                Err(error) => {
                    if !failing {
                        tracing::error!(
                            sink = %name,
                            error = %error,
                            "sink write failed, records for this sink will be lost"
                        );
                        failing = true;
                    }
                }
            },
            Command::Flush(ack) => {
                if let Err(error) = sink.flush() {
                    tracing::error!(sink = %name, error = %error, "sink flush failed");
                }
                let _ = ack.send(());
            }
        }
    }
}
