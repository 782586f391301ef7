//! Infrastructure layer module
//!
//! - Configuration management (figment: defaults, YAML, environment)
//! - Logging infrastructure (tracing-subscriber, rolling files, secret scrubbing)

pub mod config;
pub mod logging;
