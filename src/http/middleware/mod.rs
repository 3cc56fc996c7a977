//! Tower middleware for the observability pipeline.

pub mod request_log;

pub use request_log::{RequestLogLayer, RequestLogService};
