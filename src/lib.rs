//! HTTP Request Observability Pipeline
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │              OBSERVABILITY PIPELINE              │
//!                    │                                                  │
//!   Inbound request  │  ┌────────────┐      ┌──────────────────────┐    │
//!   ─────────────────┼─▶│ request    │─────▶│ application handlers │    │
//!                    │  │ log stage  │      └──────────┬───────────┘    │
//!                    │  └─────┬──────┘                 │                │
//!                    │        │ records                │ records        │
//!                    │        ▼                        ▼                │
//!                    │  ┌──────────┐   ┌─────────┐   ┌─────────────┐    │
//!                    │  │ enrich   │──▶│ redact  │──▶│ sink router │    │
//!                    │  └──────────┘   └─────────┘   └──────┬──────┘    │
//!                    │                                      │           │
//!                    │                   ┌──────────────────┼─────────┐ │
//!                    │                   ▼                  ▼         ▼ │
//!                    │              primary.json       audit.json  debug.log
//!                    │                                                  │
//!                    │  ┌────────────────────────────────────────────┐  │
//!                    │  │            Error capture stage             │  │
//!                    │  │  recoverable / panic / fatal-at-shutdown   │  │
//!                    │  │      → log stream + external reporter      │  │
//!                    │  └────────────────────────────────────────────┘  │
//!                    └──────────────────────────────────────────────────┘
//! ```

// Core pipeline
pub mod correlation;
pub mod logger;
pub mod record;
pub mod sink;

// HTTP integration
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod error;

pub use config::PipelineConfig;
pub use correlation::CorrelationContext;
pub use error::ErrorCaptureStage;
pub use http::RequestLogLayer;
pub use logger::Logger;
pub use record::{Level, LogRecord};
