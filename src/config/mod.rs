//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → PipelineConfig (validated, immutable)
//!     → shared with the logger, sinks, and error capture at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs; the defaults encode
//!   the standard sink policy (primary/audit/debug)
//! - Validation separates syntactic (serde) from semantic checks; a missing
//!   required setting is fatal at startup

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::PipelineConfig;
pub use schema::ReportingConfig;
pub use schema::SinkConfig;
pub use validation::{validate_config, ValidationError};
