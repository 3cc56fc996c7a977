//! Record fan-out to configured sinks.

use std::sync::Arc;

use crate::record::LogRecord;
use crate::sink::worker::SinkHandle;

/// Routes each record to every sink whose threshold it meets.
///
/// Delivery to one sink is independent of the others: a sink that is full or
/// broken costs its own records only. Once handed to the workers a record is
/// considered delivered; nothing is retried.
pub struct SinkRouter {
    sinks: Vec<SinkHandle>,
}

impl SinkRouter {
    /// Build a router over sink handles, kept in configuration order.
    pub fn new(sinks: Vec<SinkHandle>) -> Self {
        Self { sinks }
    }

    /// Fan the record out to every accepting sink.
    pub fn dispatch(&self, record: LogRecord) {
        let record = Arc::new(record);
        for sink in &self.sinks {
            if sink.accepts(record.level) {
                sink.send(Arc::clone(&record));
            }
        }
    }

    /// Wait until all sinks have written everything accepted so far.
    pub async fn flush(&self) {
        for sink in &self.sinks {
            sink.flush().await;
        }
    }

    /// Number of configured sinks.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// True when no sinks are configured.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}
