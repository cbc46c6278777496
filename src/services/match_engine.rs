//! Match engine.
//!
//! Evaluates a finished command against the registered selectors, invokes
//! the providers of every selector that matched, and aggregates their fixes.
//!
//! One evaluation fans out to one tokio task per extension provider. All of
//! them share a child of the caller's cancellation token; the engine joins
//! every task before returning, so an evaluation completes as a whole.
//! Internal callbacks are synchronous and run inline, in selector order.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, trace, warn};

use crate::domain::models::{
    CommandMatchResult, InternalCallback, OutputMatch, OutputMatcher, ProvidedFixes,
    QuickFix, QuickFixConfig, QuickFixOptions, RegexMatch, SelectorKind, TerminalCommand,
};
use crate::domain::ports::QuickFixProvider;
use crate::services::action_aggregator::ActionAggregator;
use crate::services::provider_registry::ProviderRegistry;
use crate::services::selector_registry::SelectorRegistry;

/// How a single provider invocation ended.
#[derive(Debug)]
enum ProviderOutcome {
    Fixes(ProvidedFixes),
    Failed(String),
    TimedOut,
    Cancelled,
}

enum Invocation {
    Ready(ProviderOutcome),
    Running(JoinHandle<ProviderOutcome>),
}

/// Evaluates finished commands against registered selectors.
#[derive(Debug)]
pub struct MatchEngine {
    selectors: Arc<SelectorRegistry>,
    providers: Arc<ProviderRegistry>,
    config: QuickFixConfig,
}

impl MatchEngine {
    pub fn new(
        selectors: Arc<SelectorRegistry>,
        providers: Arc<ProviderRegistry>,
        config: QuickFixConfig,
    ) -> Self {
        Self {
            selectors,
            providers,
            config,
        }
    }

    pub const fn config(&self) -> &QuickFixConfig {
        &self.config
    }

    /// Compute the quick fixes for a finished command.
    ///
    /// Never fails: selectors that do not match, providers that error, panic
    /// or time out, and providers still running when `cancel` fires all
    /// contribute nothing. Fixes come back in selector registration order.
    #[instrument(skip_all, fields(command_id = %command.id, exit = %command.exit_status))]
    pub async fn evaluate(
        &self,
        command: &TerminalCommand,
        output: Option<&[String]>,
        cancel: &CancellationToken,
    ) -> Vec<QuickFix> {
        if !self.config.enabled {
            debug!("Quick fixes disabled, skipping evaluation");
            return Vec::new();
        }
        if cancel.is_cancelled() {
            debug!("Evaluation cancelled before start");
            return Vec::new();
        }

        let output = output.map(|lines| tail(lines, self.config.max_output_lines));
        let candidates = self.selectors.matching_exit(command.exit_status);
        if candidates.is_empty() {
            debug!("No selectors for this exit status");
            return Vec::new();
        }

        // Tasks still running when this evaluation ends (or is dropped) get cancelled
        let evaluation_token = cancel.child_token();
        let _guard = evaluation_token.clone().drop_guard();

        let shared_command = Arc::new(command.clone());
        let shared_output: Option<Arc<[String]>> = output.map(Arc::from);

        let mut invocations: Vec<(String, Invocation)> = Vec::new();
        for selector in candidates {
            let id = selector.id().to_string();
            if self.config.is_disabled(&id) {
                debug!(selector_id = %id, "Selector disabled by configuration");
                continue;
            }

            let Some(match_result) =
                build_match_result(&selector.options, &command.command_line, output)
            else {
                trace!(selector_id = %id, "Selector did not match");
                continue;
            };
            debug!(selector_id = %id, kind = %selector.selector_type(), "Selector matched");

            let invocation = match selector.kind {
                SelectorKind::Internal(callback) => {
                    Invocation::Ready(run_internal(&callback, &match_result))
                }
                SelectorKind::Resolved(embedded) => {
                    // A provider registered under the id replaces the embedded one
                    let provider = self.providers.get(&id).unwrap_or(embedded);
                    Invocation::Running(self.spawn_provider(
                        provider,
                        Arc::clone(&shared_command),
                        shared_output.clone(),
                        selector.options,
                        evaluation_token.clone(),
                    ))
                }
                SelectorKind::Unresolved => {
                    let Some(provider) = self.providers.get(&id) else {
                        debug!(selector_id = %id, "No provider registered, selector is inert");
                        continue;
                    };
                    Invocation::Running(self.spawn_provider(
                        provider,
                        Arc::clone(&shared_command),
                        shared_output.clone(),
                        selector.options,
                        evaluation_token.clone(),
                    ))
                }
            };
            invocations.push((id, invocation));
        }

        let mut aggregator = ActionAggregator::new();
        for (id, invocation) in invocations {
            let outcome = match invocation {
                Invocation::Ready(outcome) => outcome,
                Invocation::Running(handle) => match handle.await {
                    Ok(outcome) => outcome,
                    Err(err) if err.is_panic() => {
                        ProviderOutcome::Failed("provider panicked".to_string())
                    }
                    Err(err) => ProviderOutcome::Failed(err.to_string()),
                },
            };

            match outcome {
                ProviderOutcome::Fixes(fixes) => aggregator.push(&id, fixes),
                ProviderOutcome::Failed(reason) => {
                    warn!(selector_id = %id, %reason, "Quick fix provider failed");
                }
                ProviderOutcome::TimedOut => {
                    warn!(
                        selector_id = %id,
                        timeout_ms = self.config.provider_timeout_ms,
                        "Quick fix provider timed out"
                    );
                }
                ProviderOutcome::Cancelled => {
                    debug!(selector_id = %id, "Quick fix provider cancelled");
                }
            }
        }

        let fixes = aggregator.finish();
        if !fixes.is_empty() {
            info!(fix_count = fixes.len(), "Quick fixes found");
        }
        fixes
    }

    fn spawn_provider(
        &self,
        provider: Arc<dyn QuickFixProvider>,
        command: Arc<TerminalCommand>,
        output: Option<Arc<[String]>>,
        options: QuickFixOptions,
        cancel: CancellationToken,
    ) -> JoinHandle<ProviderOutcome> {
        let timeout = self.config.provider_timeout();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => ProviderOutcome::Cancelled,
                result = tokio::time::timeout(
                    timeout,
                    provider.provide_quick_fixes(&command, output.as_deref(), &options, &cancel),
                ) => match result {
                    Ok(Ok(fixes)) => ProviderOutcome::Fixes(fixes),
                    Ok(Err(err)) => ProviderOutcome::Failed(format!("{err:#}")),
                    Err(_) => ProviderOutcome::TimedOut,
                },
            }
        })
    }
}

fn run_internal(callback: &InternalCallback, match_result: &CommandMatchResult) -> ProviderOutcome {
    match panic::catch_unwind(AssertUnwindSafe(|| callback(match_result))) {
        Ok(Ok(fixes)) => ProviderOutcome::Fixes(fixes),
        Ok(Err(err)) => ProviderOutcome::Failed(format!("{err:#}")),
        Err(_) => ProviderOutcome::Failed("callback panicked".to_string()),
    }
}

fn tail(lines: &[String], max: usize) -> &[String] {
    &lines[lines.len().saturating_sub(max)..]
}

/// Match a selector's patterns against a command line and its output.
///
/// `None` when the command line does not match, or when the selector
/// declares an output matcher and the output is absent or does not match.
pub fn build_match_result(
    options: &QuickFixOptions,
    command_line: &str,
    output: Option<&[String]>,
) -> Option<CommandMatchResult> {
    let command_line_match = options.command_line_matcher.captures(command_line)?;
    let output_match = match &options.output_matcher {
        Some(matcher) => Some(match_output(matcher, output?)?),
        None => None,
    };

    Some(CommandMatchResult {
        command_line: command_line.to_string(),
        command_line_match,
        output_match,
    })
}

/// Search the matcher's window of `lines`.
///
/// In single-match mode the window is joined with newlines, so a pattern may
/// span lines; the first match wins. With `multiple_matches` every line is
/// matched separately and all matches are collected.
pub fn match_output(matcher: &OutputMatcher, lines: &[String]) -> Option<OutputMatch> {
    let re = matcher.line_matcher.regex()?;
    let (window_start, window) = matcher.window(lines);
    if window.is_empty() {
        return None;
    }

    if matcher.multiple_matches {
        let mut matches = Vec::new();
        let mut first_line = None;
        let mut last_line = 0;
        for (index, line) in window.iter().enumerate() {
            let before = matches.len();
            matches.extend(
                re.captures_iter(line)
                    .map(|caps| RegexMatch::from_captures(re, &caps)),
            );
            if matches.len() > before {
                first_line.get_or_insert(index);
                last_line = index;
            }
        }

        let first_line = first_line?;
        return Some(OutputMatch {
            regex_match: matches[0].clone(),
            matches,
            line_range: first_line..last_line + 1,
            window_start,
            output_lines: window.to_vec(),
        });
    }

    let text = window.join("\n");
    let caps = re.captures(&text)?;
    let regex_match = RegexMatch::from_captures(re, &caps);
    let first_line = line_of(&text, regex_match.start);
    let last_line = if regex_match.end > regex_match.start {
        line_of(&text, regex_match.end - 1)
    } else {
        first_line
    };

    Some(OutputMatch {
        regex_match: regex_match.clone(),
        matches: vec![regex_match],
        line_range: first_line..last_line + 1,
        window_start,
        output_lines: window.to_vec(),
    })
}

/// Line index of a byte offset in newline-joined text.
fn line_of(text: &str, offset: usize) -> usize {
    text.as_bytes()[..offset]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
}
