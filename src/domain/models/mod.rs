pub mod command;
pub mod config;
pub mod match_result;
pub mod pattern;
pub mod quick_fix;
pub mod selector;

pub use command::{CommandId, ExitStatus, TerminalCommand};
pub use config::{Config, LoggingConfig, QuickFixConfig, RotationPolicy};
pub use match_result::{CommandMatchResult, OutputMatch};
pub use pattern::{Pattern, RegexMatch};
pub use quick_fix::{DedupKey, ProvidedFixes, QuickFix, QuickFixType};
pub use selector::{
    InternalCallback, OutputAnchor, OutputMatcher, QuickFixOptions, QuickFixSelector,
    SelectorKind, SelectorType,
};
