pub mod config;
pub mod evaluate;
pub mod selectors;

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::models::Config;
use crate::infrastructure::contributions::{ContributionLoader, LoadedContributions};
use crate::services::{register_builtin_providers, QuickFixService};

/// Build a service with the built-in selectors and every contributions file
/// from the configuration plus `extra`.
pub(crate) fn bootstrap(
    config: &Config,
    extra: &[PathBuf],
) -> (Arc<QuickFixService>, LoadedContributions) {
    let service = QuickFixService::new(config.quick_fix.clone());
    if config.quick_fix.builtin_providers {
        register_builtin_providers(&service);
    }

    let paths: Vec<&PathBuf> = config.contributions.iter().chain(extra).collect();
    let contributions = ContributionLoader::load_all(&paths, &service);

    (Arc::new(service), contributions)
}
