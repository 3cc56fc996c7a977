//! Correlation context for request tracking.
//!
//! # Responsibilities
//! - Adopt or generate the opaque token that groups one request's records
//! - Track the request's start instant for duration measurement
//! - Expose the active context to enrichers via task-scoped storage
//!
//! # Design Decisions
//! - Client-supplied ids are adopted verbatim; only generated ids have a
//!   guaranteed format (32 lowercase hex chars, 16 random bytes)
//! - The scope is a `tokio::task_local!`, so concurrent requests on separate
//!   tasks can never observe each other's context
//! - The context lives exactly as long as one request's future; nothing is
//!   persisted

use std::future::Future;
use std::time::Instant;

use uuid::Uuid;

/// Header carrying the correlation id, inbound and outbound.
pub const CORRELATION_HEADER: &str = "x-correlation-id";

/// Per-request value tying a request's records together.
#[derive(Debug, Clone)]
pub struct CorrelationContext {
    id: String,
    started_at: Instant,
    method: String,
    path: String,
}

impl CorrelationContext {
    /// Start a context for one request, adopting `supplied` when it is a
    /// non-empty token and generating a fresh id otherwise.
    pub fn begin(method: impl Into<String>, path: impl Into<String>, supplied: Option<&str>) -> Self {
        let id = match supplied {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => generate_id(),
        };
        Self {
            id,
            started_at: Instant::now(),
            method: method.into(),
            path: path.into(),
        }
    }

    /// The correlation id, echoed on the response and stamped on records.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Request method, for summary logging.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request path, for summary logging.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Elapsed time since `begin`, truncated to whole milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }
}

/// Generate a fresh correlation id: 16 random bytes, hex-encoded.
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

tokio::task_local! {
    static CURRENT: CorrelationContext;
}

/// Run `fut` with `context` as the active correlation scope.
///
/// Records emitted anywhere inside `fut` pick up the correlation id through
/// the enrichment chain; the scope ends when the future completes.
pub async fn scope<F: Future>(context: CorrelationContext, fut: F) -> F::Output {
    CURRENT.scope(context, fut).await
}

/// The active correlation context, if the caller is inside a scope.
pub fn current() -> Option<CorrelationContext> {
    CURRENT.try_with(Clone::clone).ok()
}
