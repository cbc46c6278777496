pub mod quick_fix_provider;

pub use quick_fix_provider::QuickFixProvider;
