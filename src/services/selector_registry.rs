//! Selector registry.
//!
//! Holds registered selectors in registration order. Re-registering an id
//! replaces the entry in place, so the selector keeps its original position.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

use crate::domain::models::{ExitStatus, QuickFixSelector};

/// Whether a registration added a new selector or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Added,
    Replaced,
}

/// Registry of quick fix selectors, keyed by id.
#[derive(Debug, Default)]
pub struct SelectorRegistry {
    selectors: RwLock<Vec<QuickFixSelector>>,
}

impl SelectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<QuickFixSelector>> {
        self.selectors.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<QuickFixSelector>> {
        self.selectors.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a selector, replacing any selector with the same id.
    pub fn register(&self, selector: QuickFixSelector) -> RegistrationOutcome {
        for pattern in selector.options.invalid_patterns() {
            warn!(
                selector_id = %selector.id(),
                pattern = %pattern,
                error = ?pattern.error(),
                "Selector pattern does not compile and will never match"
            );
        }

        let mut selectors = self.write();
        if let Some(existing) = selectors.iter_mut().find(|s| s.id() == selector.id()) {
            debug!(selector_id = %selector.id(), "Replacing selector");
            *existing = selector;
            RegistrationOutcome::Replaced
        } else {
            debug!(selector_id = %selector.id(), kind = %selector.selector_type(), "Adding selector");
            selectors.push(selector);
            RegistrationOutcome::Added
        }
    }

    /// Remove a selector, returning it if it was registered.
    pub fn unregister(&self, id: &str) -> Option<QuickFixSelector> {
        let mut selectors = self.write();
        let index = selectors.iter().position(|s| s.id() == id)?;
        Some(selectors.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<QuickFixSelector> {
        self.read().iter().find(|s| s.id() == id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().iter().any(|s| s.id() == id)
    }

    /// All selectors in registration order.
    pub fn all(&self) -> Vec<QuickFixSelector> {
        self.read().clone()
    }

    /// Selectors whose exit filter accepts `exit_status`, in registration order.
    pub fn matching_exit(&self, exit_status: ExitStatus) -> Vec<QuickFixSelector> {
        self.read()
            .iter()
            .filter(|s| s.applies_to(exit_status))
            .cloned()
            .collect()
    }

    pub fn ids(&self) -> Vec<String> {
        self.read().iter().map(|s| s.id().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{QuickFixOptions, SelectorType};

    fn selector(id: &str, exit: ExitStatus) -> QuickFixSelector {
        QuickFixSelector::unresolved(QuickFixOptions::new(id, ".*", exit))
    }

    #[test]
    fn test_registry_creation() {
        let registry = SelectorRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_register_preserves_order() {
        let registry = SelectorRegistry::new();
        registry.register(selector("a", ExitStatus::Error));
        registry.register(selector("b", ExitStatus::Error));
        registry.register(selector("c", ExitStatus::Error));

        assert_eq!(registry.ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_reregister_replaces_in_place() {
        let registry = SelectorRegistry::new();
        assert_eq!(
            registry.register(selector("a", ExitStatus::Error)),
            RegistrationOutcome::Added
        );
        registry.register(selector("b", ExitStatus::Error));

        let replacement = QuickFixSelector::internal(
            QuickFixOptions::new("a", "^ls", ExitStatus::Success),
            |_| Ok(Default::default()),
        );
        assert_eq!(registry.register(replacement), RegistrationOutcome::Replaced);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.ids(), vec!["a", "b"]);
        let a = registry.get("a").unwrap();
        assert_eq!(a.selector_type(), SelectorType::Internal);
        assert_eq!(a.options.command_exit_result, ExitStatus::Success);
    }

    #[test]
    fn test_unregister() {
        let registry = SelectorRegistry::new();
        registry.register(selector("a", ExitStatus::Error));

        assert!(registry.unregister("a").is_some());
        assert!(registry.unregister("a").is_none());
        assert!(!registry.contains("a"));
    }

    #[test]
    fn test_matching_exit_filters() {
        let registry = SelectorRegistry::new();
        registry.register(selector("fail-1", ExitStatus::Error));
        registry.register(selector("ok", ExitStatus::Success));
        registry.register(selector("fail-2", ExitStatus::Error));

        let ids: Vec<_> = registry
            .matching_exit(ExitStatus::Error)
            .iter()
            .map(|s| s.id().to_string())
            .collect();
        assert_eq!(ids, vec!["fail-1", "fail-2"]);
        assert_eq!(registry.matching_exit(ExitStatus::Success).len(), 1);
    }

    #[test]
    fn test_invalid_pattern_still_registered() {
        let registry = SelectorRegistry::new();
        registry.register(QuickFixSelector::unresolved(QuickFixOptions::new(
            "broken",
            "(",
            ExitStatus::Error,
        )));
        assert!(registry.contains("broken"));
    }
}
