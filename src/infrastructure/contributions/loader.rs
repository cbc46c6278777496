//! Contributions file loader.
//!
//! Reads declarative selectors from YAML files and registers them with a
//! [`QuickFixService`]. Every entry becomes an unresolved selector; entries
//! that carry `fixes` also get a [`TemplateProvider`] under the same id.
//!
//! Loading several files is non-fatal: a file that fails to load is logged
//! with [`tracing::warn`] and skipped.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::errors::{QuickFixError, QuickFixResult};
use crate::domain::models::{QuickFixOptions, QuickFixSelector};
use crate::services::quick_fix_service::{ProviderRegistration, QuickFixService};
use crate::services::template_provider::{FixTemplate, TemplateProvider};

/// Top-level layout of a contributions file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionsFile {
    #[serde(default)]
    pub quick_fixes: Vec<QuickFixContribution>,
}

/// One declarative selector, optionally with templated fixes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickFixContribution {
    #[serde(flatten)]
    pub options: QuickFixOptions,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixes: Vec<FixTemplate>,
}

/// Outcome of registering one or more contributions files.
#[derive(Debug, Default)]
pub struct LoadedContributions {
    /// Ids of the selectors that were registered
    pub selector_ids: Vec<String>,
    /// Handles for the template providers
    pub registrations: Vec<ProviderRegistration>,
}

pub struct ContributionLoader;

impl ContributionLoader {
    /// Parse and validate contributions from YAML text.
    pub fn parse(yaml: &str) -> QuickFixResult<ContributionsFile> {
        let file: ContributionsFile = serde_yaml::from_str(yaml)?;

        let mut seen = HashSet::new();
        for contribution in &file.quick_fixes {
            let id = contribution.options.id.trim();
            if id.is_empty() {
                return Err(QuickFixError::InvalidContribution(
                    "quick fix id cannot be empty".to_string(),
                ));
            }
            if !seen.insert(id) {
                return Err(QuickFixError::InvalidContribution(format!(
                    "duplicate quick fix id '{id}'"
                )));
            }
        }

        Ok(file)
    }

    /// Read and parse a contributions file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<ContributionsFile> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read contributions file {}", path.display()))?;
        Self::parse(&yaml)
            .with_context(|| format!("Invalid contributions file {}", path.display()))
    }

    /// Register every contribution of `file` with `service`.
    pub fn register(file: ContributionsFile, service: &QuickFixService) -> LoadedContributions {
        let mut loaded = LoadedContributions::default();

        for contribution in file.quick_fixes {
            let id = contribution.options.id.clone();
            service.register_command_selector(QuickFixSelector::unresolved(contribution.options));

            if contribution.fixes.is_empty() {
                debug!(selector_id = %id, "Contributed selector without fixes");
            } else {
                let provider = Arc::new(TemplateProvider::new(contribution.fixes));
                loaded
                    .registrations
                    .push(service.register_quick_fix_provider(id.clone(), provider));
            }
            loaded.selector_ids.push(id);
        }

        loaded
    }

    /// Load and register several files, skipping the ones that fail.
    pub fn load_all<P: AsRef<Path>>(paths: &[P], service: &QuickFixService) -> LoadedContributions {
        let mut all = LoadedContributions::default();

        for path in paths {
            let path = path.as_ref();
            match Self::load_file(path) {
                Ok(file) => {
                    let loaded = Self::register(file, service);
                    info!(
                        path = %path.display(),
                        selectors = loaded.selector_ids.len(),
                        "Loaded quick fix contributions"
                    );
                    all.selector_ids.extend(loaded.selector_ids);
                    all.registrations.extend(loaded.registrations);
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %format!("{err:#}"), "Skipping contributions file");
                }
            }
        }

        all
    }
}
