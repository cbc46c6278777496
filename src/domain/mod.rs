//! Domain layer for the quick fix engine
//!
//! Commands, selectors, match results and fixes, plus the provider port.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{QuickFixError, QuickFixResult};
