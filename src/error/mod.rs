//! Error capture subsystem.
//!
//! # Data Flow
//! ```text
//! Failure anywhere in the process
//!     → event.rs (classify: kind, class, severity, location)
//!     → capture.rs (state machine: log + forward, exactly once per event)
//!     → reporter.rs (fire-and-forget delivery to the external tracker)
//! ```
//!
//! # Design Decisions
//! - Capture is observational: it records failures but never alters how the
//!   surrounding framework responds to them
//! - Events are created at detection and dropped after forwarding; there is
//!   no queue and no retry
//! - The reporter failing is itself a handled condition, never a second
//!   failure

pub mod capture;
pub mod event;
pub mod reporter;

pub use capture::{Disposition, ErrorCaptureStage};
pub use event::{ErrorClass, ErrorEvent, ErrorKind, SourceLocation};
pub use reporter::{ErrorReporter, HttpReporter, NoopReporter};
