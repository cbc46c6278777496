//! Quick Fix Service
//!
//! The object consumers hold: owns the selector and provider registries, the
//! lifecycle event bus and the match engine, and keeps the three in sync.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::domain::models::{
    QuickFix, QuickFixConfig, QuickFixSelector, SelectorKind, SelectorType, TerminalCommand,
};
use crate::domain::ports::QuickFixProvider;
use crate::services::event_bus::{EventKind, QuickFixEvent, QuickFixEventBus, Subscription};
use crate::services::match_engine::MatchEngine;
use crate::services::provider_registry::ProviderRegistry;
use crate::services::selector_registry::{RegistrationOutcome, SelectorRegistry};

/// Registration and evaluation entry point for terminal quick fixes.
///
/// Constructed explicitly and shared by `Arc`; there is no global instance.
/// Registries are only ever touched inside short lock sections, so the
/// service can be used from any task.
///
/// # Example
///
/// ```no_run
/// use termfix::domain::models::{ExitStatus, QuickFix, QuickFixOptions, QuickFixSelector, TerminalCommand};
/// use termfix::services::QuickFixService;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() {
/// let service = QuickFixService::default();
/// service.register_command_selector(QuickFixSelector::internal(
///     QuickFixOptions::new("ls-typo", "^sl$", ExitStatus::Error),
///     |_| Ok(QuickFix::command("ls-typo", "ls").into()),
/// ));
///
/// let command = TerminalCommand::from_exit_code("sl", 127);
/// let fixes = service.evaluate(&command, None, &CancellationToken::new()).await;
/// assert_eq!(fixes.len(), 1);
/// # }
/// ```
pub struct QuickFixService {
    selectors: Arc<SelectorRegistry>,
    providers: Arc<ProviderRegistry>,
    events: Arc<QuickFixEventBus>,
    engine: MatchEngine,
}

impl fmt::Debug for QuickFixService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuickFixService")
            .field("selectors", &self.selectors.ids())
            .field("providers", &self.providers.ids())
            .finish_non_exhaustive()
    }
}

impl Default for QuickFixService {
    fn default() -> Self {
        Self::new(QuickFixConfig::default())
    }
}

impl QuickFixService {
    pub fn new(config: QuickFixConfig) -> Self {
        Self::with_event_bus(config, Arc::new(QuickFixEventBus::default()))
    }

    /// Create a service publishing to an existing event bus.
    pub fn with_event_bus(config: QuickFixConfig, events: Arc<QuickFixEventBus>) -> Self {
        let selectors = Arc::new(SelectorRegistry::new());
        let providers = Arc::new(ProviderRegistry::new());
        let engine = MatchEngine::new(Arc::clone(&selectors), Arc::clone(&providers), config);
        Self {
            selectors,
            providers,
            events,
            engine,
        }
    }

    pub const fn config(&self) -> &QuickFixConfig {
        self.engine.config()
    }

    /// Register or replace a selector.
    ///
    /// Always announces the selector on the command-selector stream. When a
    /// provider for it is already known (registered earlier under the same id,
    /// or else embedded in a resolved selector) the pairing is announced on
    /// the provider-registered stream as well.
    #[instrument(skip(self, selector), fields(selector_id = %selector.id()))]
    pub fn register_command_selector(&self, selector: QuickFixSelector) -> RegistrationOutcome {
        let outcome = self.selectors.register(selector.clone());

        let provider = match &selector.kind {
            SelectorKind::Resolved(embedded) => Some(
                self.providers
                    .get(selector.id())
                    .unwrap_or_else(|| Arc::clone(embedded)),
            ),
            SelectorKind::Unresolved => self.providers.get(selector.id()),
            SelectorKind::Internal(_) => None,
        };

        self.events
            .publish(QuickFixEvent::CommandSelectorRegistered(selector.clone()));
        if let Some(provider) = provider {
            self.events
                .publish(QuickFixEvent::ProviderRegistered { selector, provider });
        }

        outcome
    }

    /// Remove a selector. Returns `false` when no selector had that id.
    #[instrument(skip(self))]
    pub fn unregister_command_selector(&self, id: &str) -> bool {
        if self.selectors.unregister(id).is_none() {
            debug!("No selector to unregister");
            return false;
        }
        self.events
            .publish(QuickFixEvent::ProviderUnregistered(id.to_string()));
        true
    }

    /// Associate a provider with a selector id, replacing any previous one.
    ///
    /// The provider takes effect for the next evaluation, and also replaces
    /// the provider embedded in a resolved selector with the same id. Internal
    /// selectors always run their own callback; a provider stored under an
    /// internal id is never invoked and is not announced. Keep the returned
    /// handle and call [`ProviderRegistration::dispose`] to remove it.
    #[instrument(skip_all)]
    pub fn register_quick_fix_provider(
        &self,
        id: impl Into<String>,
        provider: Arc<dyn QuickFixProvider>,
    ) -> ProviderRegistration {
        let id = id.into();

        let generation = self.providers.insert(id.clone(), Arc::clone(&provider));
        match self.selectors.get(&id) {
            Some(selector) if selector.selector_type() == SelectorType::Internal => {
                debug!(
                    provider_id = %id,
                    "Internal selector keeps its callback, provider not announced"
                );
            }
            Some(selector) => {
                info!(provider_id = %id, "Quick fix provider registered");
                self.events
                    .publish(QuickFixEvent::ProviderRegistered { selector, provider });
            }
            None => debug!(provider_id = %id, "Provider registered before its selector"),
        }

        ProviderRegistration {
            id,
            generation,
            providers: Arc::clone(&self.providers),
            events: Arc::clone(&self.events),
        }
    }

    /// Snapshot of every registered selector, in registration order.
    pub async fn terminal_quick_fixes(&self) -> Vec<QuickFixSelector> {
        tokio::task::yield_now().await;
        self.selectors.all()
    }

    /// Point-in-time copy of the provider map.
    pub fn providers(&self) -> HashMap<String, Arc<dyn QuickFixProvider>> {
        self.providers.snapshot()
    }

    /// Live view of the provider map.
    pub const fn provider_registry(&self) -> &Arc<ProviderRegistry> {
        &self.providers
    }

    pub const fn selector_registry(&self) -> &Arc<SelectorRegistry> {
        &self.selectors
    }

    pub const fn event_bus(&self) -> &Arc<QuickFixEventBus> {
        &self.events
    }

    pub fn on_did_register_provider(&self) -> Subscription {
        self.events.subscribe_to(EventKind::ProviderRegistered)
    }

    pub fn on_did_register_command_selector(&self) -> Subscription {
        self.events.subscribe_to(EventKind::CommandSelectorRegistered)
    }

    pub fn on_did_unregister_provider(&self) -> Subscription {
        self.events.subscribe_to(EventKind::ProviderUnregistered)
    }

    /// Compute the quick fixes for a finished command.
    ///
    /// See [`MatchEngine::evaluate`].
    pub async fn evaluate(
        &self,
        command: &TerminalCommand,
        output: Option<&[String]>,
        cancel: &CancellationToken,
    ) -> Vec<QuickFix> {
        self.engine.evaluate(command, output, cancel).await
    }
}

/// Disposal handle for a provider registration.
///
/// Dropping the handle leaves the provider registered.
#[must_use = "dropping the handle makes the provider impossible to dispose"]
pub struct ProviderRegistration {
    id: String,
    generation: u64,
    providers: Arc<ProviderRegistry>,
    events: Arc<QuickFixEventBus>,
}

impl fmt::Debug for ProviderRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistration")
            .field("id", &self.id)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl ProviderRegistration {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether this registration is still the one serving its id.
    pub fn is_active(&self) -> bool {
        self.providers.is_current(&self.id, self.generation)
    }

    /// Remove the provider and announce it on the unregistered stream.
    ///
    /// A no-op (returning `false`) when the provider was already replaced by
    /// a newer registration for the same id.
    pub fn dispose(self) -> bool {
        if self.providers.remove_if_current(&self.id, self.generation) {
            info!(provider_id = %self.id, "Quick fix provider disposed");
            self.events
                .publish(QuickFixEvent::ProviderUnregistered(self.id));
            true
        } else {
            debug!(provider_id = %self.id, "Stale provider handle, nothing to dispose");
            false
        }
    }
}
