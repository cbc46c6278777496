pub mod action_aggregator;
pub mod builtin_providers;
pub mod command_session;
pub mod event_bus;
pub mod match_engine;
pub mod provider_registry;
pub mod quick_fix_service;
pub mod selector_registry;
pub mod template_provider;

pub use action_aggregator::{aggregate, ActionAggregator};
pub use builtin_providers::{builtin_selectors, register_builtin_providers};
pub use command_session::CommandSession;
pub use event_bus::{
    EventBusConfig, EventEnvelope, EventId, EventKind, QuickFixEvent, QuickFixEventBus,
    SequenceNumber, Subscription,
};
pub use match_engine::{build_match_result, match_output, MatchEngine};
pub use provider_registry::ProviderRegistry;
pub use quick_fix_service::{ProviderRegistration, QuickFixService};
pub use selector_registry::{RegistrationOutcome, SelectorRegistry};
pub use template_provider::{FixTemplate, TemplateProvider};
