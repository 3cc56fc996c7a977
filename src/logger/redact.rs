//! Sensitive field redaction.
//!
//! # Responsibilities
//! - Strip secret-bearing header values from records before any sink write
//! - Keep redacted keys visible so "hidden" is distinguishable from "absent"
//!
//! # Design Decisions
//! - Field matching is case-insensitive; key casing in the record is kept
//! - Only the `context.headers` mapping is inspected; its absence is a no-op
//! - Values are replaced with the marker list `["REDACTED"]`, matching the
//!   list shape header mappings carry

use std::collections::HashSet;

use serde_json::Value;

use crate::record::LogRecord;

/// Marker written in place of a redacted value.
pub const REDACTION_MARKER: &str = "REDACTED";

/// Set of header field names whose values must never reach a sink.
#[derive(Debug, Clone, Default)]
pub struct RedactionPolicy {
    fields: HashSet<String>,
}

impl RedactionPolicy {
    /// Build a policy from field names; matching is case-insensitive.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|f| f.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    /// Whether a header key falls under this policy.
    pub fn matches(&self, key: &str) -> bool {
        self.fields.contains(&key.to_ascii_lowercase())
    }

    /// True when the policy redacts nothing.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Replace policy-matched header values with the redaction marker.
pub fn redact(mut record: LogRecord, policy: &RedactionPolicy) -> LogRecord {
    if policy.is_empty() {
        return record;
    }

    if let Some(Value::Object(headers)) = record.context.get_mut("headers") {
        for (key, value) in headers.iter_mut() {
            if policy.matches(key) {
                *value = Value::Array(vec![Value::String(REDACTION_MARKER.to_string())]);
            }
        }
    }

    record
}
