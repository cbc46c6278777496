//! Provider port - interface for extension quick fix providers.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::models::{ProvidedFixes, QuickFixOptions, TerminalCommand};

/// Produces quick fixes for commands matched by the selector with the same id.
///
/// Providers run concurrently with the other providers of one evaluation and
/// share its cancellation token. Once the token is cancelled the result is no
/// longer needed: a provider should stop and return [`ProvidedFixes::None`].
/// Errors are logged by the engine and count as "no fixes".
#[async_trait]
pub trait QuickFixProvider: Send + Sync {
    async fn provide_quick_fixes(
        &self,
        command: &TerminalCommand,
        output: Option<&[String]>,
        options: &QuickFixOptions,
        cancel: &CancellationToken,
    ) -> anyhow::Result<ProvidedFixes>;
}
