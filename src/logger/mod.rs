//! Logging pipeline facade.
//!
//! # Data Flow
//! ```text
//! log(level, message, context)
//!     → enrich.rs (process identity, correlation id)
//!     → redact.rs (strip sensitive header values)
//!     → sink router (fan-out to configured sinks)
//! ```
//!
//! # Design Decisions
//! - Enrichment runs before redaction so nothing an enricher adds can slip
//!   past the policy, and redaction runs before any sink write
//! - The logger is a cheap `Arc` handle; clones share one pipeline
//! - Failures inside the pipeline degrade to the fallback channel and never
//!   surface to the caller

pub mod enrich;
pub mod redact;

use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::schema::PipelineConfig;
use crate::record::{Level, LogRecord};
use crate::sink::{RotatingFileSink, SinkHandle, SinkRouter, StreamSink};

use enrich::{CorrelationEnricher, EnrichmentChain, ProcessEnricher};
use redact::RedactionPolicy;

/// Handle to the logging pipeline. Clone freely; all clones share state.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

struct LoggerInner {
    enrichers: EnrichmentChain,
    redaction: RedactionPolicy,
    router: SinkRouter,
}

impl Logger {
    /// Assemble a logger from explicit parts. Most callers want
    /// [`Logger::from_config`].
    pub fn new(enrichers: EnrichmentChain, redaction: RedactionPolicy, router: SinkRouter) -> Self {
        Self {
            inner: Arc::new(LoggerInner {
                enrichers,
                redaction,
                router,
            }),
        }
    }

    /// Build the full pipeline from configuration: the standard enrichers,
    /// the redaction policy, and one writer task per configured sink.
    ///
    /// Must be called within a tokio runtime. Creates the log directory.
    pub fn from_config(config: &PipelineConfig) -> std::io::Result<Self> {
        let directory = Path::new(&config.log_directory);
        std::fs::create_dir_all(directory)?;

        let mut handles = Vec::new();
        for sink_config in &config.sinks {
            if sink_config.debug_only && !config.debug {
                continue;
            }
            let path = directory.join(&sink_config.file);
            let min_level = sink_config.effective_min_level(config.debug);
            let sink: Box<dyn crate::sink::Sink> = match sink_config.retention {
                Some(max_files) => {
                    Box::new(RotatingFileSink::new(&path, max_files, sink_config.format))
                }
                None => Box::new(StreamSink::new(&path, sink_config.format)),
            };
            handles.push(SinkHandle::spawn(sink_config.name.clone(), min_level, sink));
        }

        let enrichers = EnrichmentChain::new();
        enrichers.register(Arc::new(ProcessEnricher::new()));
        enrichers.register(Arc::new(CorrelationEnricher));

        let redaction = RedactionPolicy::new(&config.redact_fields);

        Ok(Self::new(enrichers, redaction, SinkRouter::new(handles)))
    }

    /// Run one record through the full pipeline.
    ///
    /// `context` should be a JSON object; other values are wrapped under a
    /// `data` key so call sites can pass any `serde_json::json!` literal.
    pub fn log(&self, level: Level, message: impl Into<String>, context: Value) {
        let record = LogRecord::new(level, message, into_context(context));
        let record = self.inner.enrichers.apply(record);
        let record = redact::redact(record, &self.inner.redaction);
        self.inner.router.dispatch(record);
    }

    /// Log at [`Level::Debug`].
    pub fn debug(&self, message: impl Into<String>, context: Value) {
        self.log(Level::Debug, message, context);
    }

    /// Log at [`Level::Info`].
    pub fn info(&self, message: impl Into<String>, context: Value) {
        self.log(Level::Info, message, context);
    }

    /// Log at [`Level::Warning`].
    pub fn warning(&self, message: impl Into<String>, context: Value) {
        self.log(Level::Warning, message, context);
    }

    /// Log at [`Level::Error`].
    pub fn error(&self, message: impl Into<String>, context: Value) {
        self.log(Level::Error, message, context);
    }

    /// Log at [`Level::Critical`].
    pub fn critical(&self, message: impl Into<String>, context: Value) {
        self.log(Level::Critical, message, context);
    }

    /// Process-wide enrichment chain, for startup registration.
    pub fn enrichers(&self) -> &EnrichmentChain {
        &self.inner.enrichers
    }

    /// Wait until every sink has written all records accepted so far.
    pub async fn flush(&self) {
        self.inner.router.flush().await;
    }
}

fn into_context(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            let mut map = Map::new();
            map.insert("data".to_string(), other);
            map
        }
    }
}
