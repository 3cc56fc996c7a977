//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Enforce the one-writer-per-destination invariant
//! - Validate value ranges (retention >= 1, non-empty paths)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PipelineConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system; any error is fatal at
//!   startup

use std::collections::HashSet;

use crate::config::schema::PipelineConfig;

/// A single semantic configuration problem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// `log_directory` is required and must be non-empty.
    #[error("log_directory must not be empty")]
    EmptyLogDirectory,

    /// At least one sink must be configured.
    #[error("no sinks configured")]
    NoSinks,

    /// Sink names must be unique.
    #[error("duplicate sink name: {0}")]
    DuplicateSinkName(String),

    /// Two sinks may not share a destination file.
    #[error("duplicate sink destination: {0}")]
    DuplicateDestination(String),

    /// A sink's file name must be non-empty.
    #[error("sink {0}: file must not be empty")]
    EmptySinkFile(String),

    /// A rotating sink must retain at least one file.
    #[error("sink {0}: retention must be at least 1")]
    ZeroRetention(String),

    /// Reporting cannot be enabled without an endpoint.
    #[error("reporting enabled but endpoint is empty")]
    MissingReporterEndpoint,
}

/// Check semantic invariants across the whole configuration.
pub fn validate_config(config: &PipelineConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.log_directory.trim().is_empty() {
        errors.push(ValidationError::EmptyLogDirectory);
    }

    if config.sinks.is_empty() {
        errors.push(ValidationError::NoSinks);
    }

    let mut names = HashSet::new();
    let mut destinations = HashSet::new();
    for sink in &config.sinks {
        if !names.insert(sink.name.clone()) {
            errors.push(ValidationError::DuplicateSinkName(sink.name.clone()));
        }
        if sink.file.trim().is_empty() {
            errors.push(ValidationError::EmptySinkFile(sink.name.clone()));
        } else if !destinations.insert(sink.file.clone()) {
            errors.push(ValidationError::DuplicateDestination(sink.file.clone()));
        }
        if sink.retention == Some(0) {
            errors.push(ValidationError::ZeroRetention(sink.name.clone()));
        }
    }

    if config.reporting.enabled && config.reporting.endpoint.trim().is_empty() {
        errors.push(ValidationError::MissingReporterEndpoint);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
