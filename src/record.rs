//! Log record data model.
//!
//! # Responsibilities
//! - Define the severity scale used for sink routing
//! - Define the structured record every pipeline stage operates on
//!
//! # Design Decisions
//! - Records are built once and treated as immutable after dispatch
//! - `context` carries call-site data; `extra` is reserved for enrichers
//! - Timestamps are UTC and render as ISO-8601 with millisecond precision

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Log severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    /// Canonical uppercase name, as written to sinks.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level name cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(String);

impl std::str::FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warning" | "warn" => Ok(Level::Warning),
            "error" => Ok(Level::Error),
            "critical" => Ok(Level::Critical),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// A single structured log record.
///
/// Serializes to the wire shape written by structured sinks:
/// `{"timestamp": ..., "level": ..., "message": ..., "context": {...}, "extra": {...}}`.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    /// Creation time, UTC.
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,

    /// Severity used for sink routing.
    pub level: Level,

    /// Human-readable event description.
    pub message: String,

    /// Call-site data supplied with the message.
    pub context: Map<String, Value>,

    /// Fields attached by enrichers; disjoint namespace from `context`.
    pub extra: Map<String, Value>,
}

impl LogRecord {
    /// Create a record stamped with the current time and an empty `extra`.
    pub fn new(level: Level, message: impl Into<String>, context: Map<String, Value>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            context,
            extra: Map::new(),
        }
    }
}

/// Render a timestamp the way sinks expect it (ISO-8601, millisecond precision).
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_timestamp<S: Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_timestamp(timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warning);
        assert!(Level::Warning < Level::Error);
        assert!(Level::Error < Level::Critical);
    }

    #[test]
    fn test_level_parse_case_insensitive() {
        assert_eq!("INFO".parse::<Level>().unwrap(), Level::Info);
        assert_eq!("warn".parse::<Level>().unwrap(), Level::Warning);
        assert_eq!("Critical".parse::<Level>().unwrap(), Level::Critical);
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn test_record_serializes_to_wire_shape() {
        let mut context = Map::new();
        context.insert("status".to_string(), serde_json::json!(200));

        let record = LogRecord::new(Level::Info, "Request completed", context);
        let value: Value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["level"], "INFO");
        assert_eq!(value["message"], "Request completed");
        assert_eq!(value["context"]["status"], 200);
        assert!(value["extra"].as_object().unwrap().is_empty());

        let ts = value["timestamp"].as_str().unwrap();
        assert!(ts.contains('T'));
        assert!(ts.ends_with('Z'));
    }
}
