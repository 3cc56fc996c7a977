//! Sink subsystem: record formatting, routing, and file destinations.
//!
//! # Data Flow
//! ```text
//! Enriched + redacted record
//!     → router.rs (fan-out to every sink at or below the record level)
//!     → worker.rs (bounded channel, one writer task per sink)
//!     → rotating.rs / stream.rs (physical file, owned by its worker)
//!     → format.rs (structured JSON line or human-readable line)
//! ```
//!
//! # Design Decisions
//! - The dispatching caller never waits on file I/O; records are handed to
//!   workers fire-and-forget
//! - One worker owns one destination, so writes are serialized and rotation
//!   is atomic with respect to concurrent writers
//! - A failing sink degrades to the process error stream and never affects
//!   delivery to the other sinks

pub mod format;
pub mod rotating;
pub mod router;
pub mod stream;
pub mod worker;

pub use format::SinkFormat;
pub use rotating::RotatingFileSink;
pub use router::SinkRouter;
pub use stream::StreamSink;
pub use worker::SinkHandle;

use crate::record::LogRecord;

/// A destination that log records are written to.
///
/// Implementations are owned by a single worker task; they do not need to be
/// internally synchronized.
pub trait Sink: Send {
    /// Write one record. Errors are local to this sink.
    fn write(&mut self, record: &LogRecord) -> Result<(), SinkError>;

    /// Flush buffered output to the destination.
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Failure writing to a single sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Underlying file or directory operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The record could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
