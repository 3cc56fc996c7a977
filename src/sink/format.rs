//! Record rendering for the two sink formats.

use serde::{Deserialize, Serialize};

use crate::record::{format_timestamp, LogRecord};

/// How a sink renders records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkFormat {
    /// One self-contained JSON object per line.
    #[default]
    Structured,
    /// Human-readable single line, empty sections suppressed.
    Line,
}

/// Render a record as a single line, without the trailing newline.
pub fn render(format: SinkFormat, record: &LogRecord) -> Result<String, serde_json::Error> {
    match format {
        SinkFormat::Structured => serde_json::to_string(record),
        SinkFormat::Line => Ok(render_line(record)),
    }
}

fn render_line(record: &LogRecord) -> String {
    let mut out = format!(
        "[{}] {}: {}",
        format_timestamp(&record.timestamp),
        record.level,
        record.message
    );
    if !record.context.is_empty() {
        out.push(' ');
        out.push_str(&compact_json(&record.context));
    }
    if !record.extra.is_empty() {
        out.push(' ');
        out.push_str(&compact_json(&record.extra));
    }
    out
}

fn compact_json(map: &serde_json::Map<String, serde_json::Value>) -> String {
    // Maps of JSON values cannot fail to serialize.
    serde_json::to_string(map).unwrap_or_else(|_| "{}".to_string())
}
