//! Termfix - terminal quick fix engine
//!
//! Matches finished terminal commands and their captured output against
//! registered selectors, invokes the providers of the selectors that match,
//! and collects the fixes they suggest.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): commands, selectors, match results, fixes and the provider port
//! - **Service Layer** (`services`): registries, match engine, aggregation and lifecycle events
//! - **Infrastructure Layer** (`infrastructure`): configuration, logging, contributions files
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use termfix::services::{register_builtin_providers, QuickFixService};
//! use termfix::domain::models::TerminalCommand;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = QuickFixService::default();
//!     register_builtin_providers(&service);
//!
//!     let command = TerminalCommand::from_exit_code("git push", 128);
//!     let output = vec!["    git push --set-upstream origin feature".to_string()];
//!     let fixes = service.evaluate(&command, Some(output.as_slice()), &CancellationToken::new()).await;
//!     for fix in fixes {
//!         println!("{}", fix.label());
//!     }
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    CommandMatchResult, Config, ExitStatus, LoggingConfig, OutputMatcher, ProvidedFixes, QuickFix,
    QuickFixConfig, QuickFixOptions, QuickFixSelector, QuickFixType, TerminalCommand,
};
pub use domain::ports::QuickFixProvider;
pub use domain::{QuickFixError, QuickFixResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{CommandSession, MatchEngine, ProviderRegistration, QuickFixService};
