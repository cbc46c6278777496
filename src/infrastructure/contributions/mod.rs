//! Declarative quick fix contributions read from YAML files.

pub mod loader;

pub use loader::{ContributionLoader, ContributionsFile, LoadedContributions, QuickFixContribution};
