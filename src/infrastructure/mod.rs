//! Infrastructure layer module
//!
//! - Configuration management (figment)
//! - Logging infrastructure (tracing)
//! - Contributions files with declarative selectors

pub mod config;
pub mod contributions;
pub mod logging;
