//! Record enrichment chain.
//!
//! # Responsibilities
//! - Attach process identity and correlation metadata to every record
//! - Keep the mutator list safe for concurrent readers
//!
//! # Design Decisions
//! - Process-wide mutators are registered at startup and never removed; the
//!   list lives behind an `ArcSwap` so the hot path is a lock-free load
//! - Request scoping comes from the correlation task-local, not from mutating
//!   a shared list per request
//! - Mutators must be pure (no I/O) and idempotent-safe; re-setting the same
//!   `extra` key is harmless

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde_json::json;

use crate::correlation;
use crate::record::LogRecord;

/// A mutator applied to every record before sink routing.
pub trait RecordMutator: Send + Sync {
    /// Return the (possibly) modified record.
    fn mutate(&self, record: LogRecord) -> LogRecord;
}

/// Ordered set of process-wide record mutators.
pub struct EnrichmentChain {
    mutators: ArcSwap<Vec<Arc<dyn RecordMutator>>>,
}

impl EnrichmentChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self {
            mutators: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Append a mutator. Intended for startup wiring; registration is
    /// copy-on-write so in-flight `apply` calls keep a consistent view.
    pub fn register(&self, mutator: Arc<dyn RecordMutator>) {
        let current = self.mutators.load_full();
        let mut next = Vec::with_capacity(current.len() + 1);
        next.extend(current.iter().cloned());
        next.push(mutator);
        self.mutators.store(Arc::new(next));
    }

    /// Run the record through every mutator in registration order.
    pub fn apply(&self, mut record: LogRecord) -> LogRecord {
        for mutator in self.mutators.load().iter() {
            record = mutator.mutate(record);
        }
        record
    }

    /// Number of registered mutators.
    pub fn len(&self) -> usize {
        self.mutators.load().len()
    }

    /// True when no mutators are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EnrichmentChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Stamps every record with the process identity.
///
/// `extra.process_id` is the OS pid; `extra.uid` is an 8-hex-char token drawn
/// once per process start, so records from successive restarts of the same
/// service can be told apart.
pub struct ProcessEnricher {
    process_id: u32,
    uid: String,
}

impl ProcessEnricher {
    /// Capture the identity of the running process.
    pub fn new() -> Self {
        Self {
            process_id: std::process::id(),
            uid: format!("{:08x}", rand::random::<u32>()),
        }
    }
}

impl Default for ProcessEnricher {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordMutator for ProcessEnricher {
    fn mutate(&self, mut record: LogRecord) -> LogRecord {
        record.extra.insert("process_id".to_string(), json!(self.process_id));
        record.extra.insert("uid".to_string(), json!(self.uid));
        record
    }
}

/// Stamps records emitted inside a correlation scope with the request's id.
///
/// Outside a scope this is a no-op, which is what keeps the
/// `extra.correlation_id` invariant: present iff a request was in flight.
pub struct CorrelationEnricher;

impl RecordMutator for CorrelationEnricher {
    fn mutate(&self, mut record: LogRecord) -> LogRecord {
        if let Some(context) = correlation::current() {
            record
                .extra
                .insert("correlation_id".to_string(), json!(context.id()));
        }
        record
    }
}
