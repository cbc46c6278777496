//! Common test utilities for integration tests
//!
//! Provides shared fixtures, helpers, and test providers used across
//! multiple integration test files.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use termfix::domain::models::{ProvidedFixes, QuickFix, QuickFixOptions, TerminalCommand};
use termfix::domain::ports::QuickFixProvider;

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Write `contents` to `name` inside `dir` and return the path
#[allow(dead_code)]
pub fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("Failed to write test file");
    path
}

/// Split text into captured output lines
#[allow(dead_code)]
pub fn lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

/// Setup test logging
#[allow(dead_code)]
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Provider returning fixed fixes after an optional delay, counting calls.
///
/// When `honor_cancel` is set the delay ends early once the token fires.
#[allow(dead_code)]
pub struct ScriptedProvider {
    pub fixes: Vec<QuickFix>,
    pub delay: Duration,
    pub honor_cancel: bool,
    pub calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl ScriptedProvider {
    pub fn immediate(fixes: Vec<QuickFix>) -> Self {
        Self {
            fixes,
            delay: Duration::ZERO,
            honor_cancel: true,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn delayed(fixes: Vec<QuickFix>, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::immediate(fixes)
        }
    }

    pub fn ignoring_cancel(mut self) -> Self {
        self.honor_cancel = false;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuickFixProvider for ScriptedProvider {
    async fn provide_quick_fixes(
        &self,
        _command: &TerminalCommand,
        _output: Option<&[String]>,
        _options: &QuickFixOptions,
        cancel: &CancellationToken,
    ) -> anyhow::Result<ProvidedFixes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            if self.honor_cancel {
                tokio::select! {
                    () = cancel.cancelled() => return Ok(ProvidedFixes::None),
                    () = tokio::time::sleep(self.delay) => {}
                }
            } else {
                tokio::time::sleep(self.delay).await;
            }
        }
        Ok(self.fixes.clone().into())
    }
}
