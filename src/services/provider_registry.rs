//! Provider registry.
//!
//! Maps selector ids to the providers that serve unresolved selectors.
//! Registration is last-write-wins; every registration gets a generation so
//! that a stale disposal handle cannot remove a newer provider.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::domain::ports::QuickFixProvider;

#[derive(Clone)]
struct ProviderEntry {
    provider: Arc<dyn QuickFixProvider>,
    generation: u64,
}

/// Registry of quick fix providers keyed by selector id.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<String, ProviderEntry>>,
    next_generation: AtomicU64,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.ids())
            .finish()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, ProviderEntry>> {
        self.providers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, ProviderEntry>> {
        self.providers.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Associate `provider` with `id`, replacing any previous provider.
    ///
    /// Returns the generation of this registration.
    pub fn insert(&self, id: impl Into<String>, provider: Arc<dyn QuickFixProvider>) -> u64 {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        self.write().insert(
            id.into(),
            ProviderEntry {
                provider,
                generation,
            },
        );
        generation
    }

    /// Remove the provider for `id` if it is still the registration `generation`.
    pub fn remove_if_current(&self, id: &str, generation: u64) -> bool {
        let mut providers = self.write();
        match providers.get(id) {
            Some(entry) if entry.generation == generation => {
                providers.remove(id);
                true
            }
            _ => false,
        }
    }

    /// Whether `generation` is the live registration for `id`.
    pub fn is_current(&self, id: &str, generation: u64) -> bool {
        self.read()
            .get(id)
            .is_some_and(|entry| entry.generation == generation)
    }

    /// Remove the provider for `id` regardless of generation.
    pub fn remove(&self, id: &str) -> Option<Arc<dyn QuickFixProvider>> {
        self.write().remove(id).map(|e| e.provider)
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn QuickFixProvider>> {
        self.read().get(id).map(|e| Arc::clone(&e.provider))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read().contains_key(id)
    }

    /// Point-in-time copy of the id -> provider map.
    pub fn snapshot(&self) -> HashMap<String, Arc<dyn QuickFixProvider>> {
        self.read()
            .iter()
            .map(|(id, e)| (id.clone(), Arc::clone(&e.provider)))
            .collect()
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().keys().cloned().collect();
        ids.sort();
        ids
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
    use crate::domain::models::{ProvidedFixes, QuickFixOptions, TerminalCommand};
    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    struct NoopProvider;

    #[async_trait]
    impl QuickFixProvider for NoopProvider {
        async fn provide_quick_fixes(
            &self,
            _command: &TerminalCommand,
            _output: Option<&[String]>,
            _options: &QuickFixOptions,
            _cancel: &CancellationToken,
        ) -> anyhow::Result<ProvidedFixes> {
            Ok(ProvidedFixes::None)
        }
    }

    #[test]
    fn test_default_registry_is_empty() {
        let registry = ProviderRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.get("x").is_none());
    }

    #[test]
    fn test_insert_and_get() {
        let registry = ProviderRegistry::new();
        registry.insert("a", Arc::new(NoopProvider));
        assert!(registry.contains("a"));
        assert!(registry.get("a").is_some());
        assert_eq!(registry.ids(), vec!["a"]);
    }

    #[test]
    fn test_last_write_wins() {
        let registry = ProviderRegistry::new();
        let first: Arc<dyn QuickFixProvider> = Arc::new(NoopProvider);
        let second: Arc<dyn QuickFixProvider> = Arc::new(NoopProvider);

        registry.insert("a", Arc::clone(&first));
        registry.insert("a", Arc::clone(&second));

        assert_eq!(registry.len(), 1);
        let current = registry.get("a").unwrap();
        assert!(Arc::ptr_eq(&current, &second));
    }

    #[test]
    fn test_stale_generation_does_not_remove() {
        let registry = ProviderRegistry::new();
        let old = registry.insert("a", Arc::new(NoopProvider));
        let new = registry.insert("a", Arc::new(NoopProvider));

        assert!(!registry.remove_if_current("a", old));
        assert!(registry.contains("a"));
        assert!(registry.remove_if_current("a", new));
        assert!(!registry.contains("a"));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let registry = ProviderRegistry::new();
        registry.insert("a", Arc::new(NoopProvider));
        let snapshot = registry.snapshot();
        registry.remove("a");

        assert_eq!(snapshot.len(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_debug_impl() {
        let registry = ProviderRegistry::new();
        registry.insert("a", Arc::new(NoopProvider));
        let debug = format!("{registry:?}");
        assert!(debug.contains("ProviderRegistry"));
        assert!(debug.contains('a'));
    }
}
