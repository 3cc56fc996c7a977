//! HTTP-facing layer of the pipeline.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → middleware/request_log.rs (adopt/generate correlation id,
//!       open the correlation scope, log "Incoming request")
//!     → [application routes handle the request]
//!     → middleware/request_log.rs (log "Request completed" with status
//!       and duration, echo X-Correlation-Id on the response)
//! ```

pub mod middleware;

pub use middleware::{RequestLogLayer, RequestLogService};
