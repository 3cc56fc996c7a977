//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! observability pipeline. All types derive Serde traits for deserialization
//! from config files.

use serde::{Deserialize, Serialize};

use crate::record::Level;
use crate::sink::SinkFormat;

/// Root configuration for the pipeline.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Debug mode: activates the verbose sink and DEBUG-level routing.
    pub debug: bool,

    /// Directory all sink files live under.
    pub log_directory: String,

    /// Header fields whose values are redacted before any sink write.
    pub redact_fields: Vec<String>,

    /// Sink definitions, in routing order.
    pub sinks: Vec<SinkConfig>,

    /// External error reporter settings.
    pub reporting: ReportingConfig,

    /// Error capture policy.
    pub errors: ErrorPolicyConfig,

    /// Demo server settings.
    pub server: ServerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            debug: false,
            log_directory: "logs".to_string(),
            redact_fields: default_redact_fields(),
            sinks: default_sinks(),
            reporting: ReportingConfig::default(),
            errors: ErrorPolicyConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

fn default_redact_fields() -> Vec<String> {
    vec!["authorization".to_string(), "cookie".to_string()]
}

/// The standard sink trio: rotating structured primary and audit files plus
/// a plain debug tail that only exists in debug mode.
fn default_sinks() -> Vec<SinkConfig> {
    vec![
        SinkConfig {
            name: "primary".to_string(),
            file: "app.json".to_string(),
            format: SinkFormat::Structured,
            min_level: Level::Info,
            debug_min_level: Some(Level::Debug),
            retention: Some(7),
            debug_only: false,
        },
        SinkConfig {
            name: "audit".to_string(),
            file: "audit.json".to_string(),
            format: SinkFormat::Structured,
            min_level: Level::Warning,
            debug_min_level: None,
            retention: Some(30),
            debug_only: false,
        },
        SinkConfig {
            name: "debug".to_string(),
            file: "debug.log".to_string(),
            format: SinkFormat::Line,
            min_level: Level::Debug,
            debug_min_level: None,
            retention: None,
            debug_only: true,
        },
    ]
}

/// One sink definition. Behavior is chosen by policy fields, not code:
/// a retention count makes the sink rotate, its absence makes it append.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SinkConfig {
    /// Sink identifier for logging and diagnostics.
    pub name: String,

    /// File name, relative to the log directory.
    pub file: String,

    /// Output format.
    #[serde(default)]
    pub format: SinkFormat,

    /// Minimum record level this sink accepts.
    #[serde(default = "default_min_level")]
    pub min_level: Level,

    /// Level used instead of `min_level` when debug mode is on.
    #[serde(default)]
    pub debug_min_level: Option<Level>,

    /// Maximum number of rotated files to retain; absent means no rotation.
    #[serde(default)]
    pub retention: Option<usize>,

    /// Only create this sink when debug mode is on.
    #[serde(default)]
    pub debug_only: bool,
}

impl SinkConfig {
    /// The threshold actually applied, given the global debug flag.
    pub fn effective_min_level(&self, debug: bool) -> Level {
        if debug {
            self.debug_min_level.unwrap_or(self.min_level)
        } else {
            self.min_level
        }
    }
}

fn default_min_level() -> Level {
    Level::Info
}

/// External error reporter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportingConfig {
    /// Enable forwarding to the external reporter.
    pub enabled: bool,

    /// HTTP endpoint events are posted to.
    pub endpoint: String,

    /// Per-delivery timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            timeout_ms: 3_000,
        }
    }
}

/// Error capture policy.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ErrorPolicyConfig {
    /// Ask the platform to skip its default reaction to recoverable errors.
    pub suppress_default: bool,
}

/// Demo server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}
