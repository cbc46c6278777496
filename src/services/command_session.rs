//! Per-terminal evaluation guard.
//!
//! A terminal reports each finished command once, but the notification can
//! be delivered more than once and the next command can finish before the
//! previous evaluation is done. The session evaluates every command at most
//! once, remembering a bounded number of recent command ids, and cancels an
//! evaluation as soon as a newer command supersedes it.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::domain::models::{CommandId, QuickFix, TerminalCommand};
use crate::services::quick_fix_service::QuickFixService;

/// How many evaluated command ids a session remembers.
const EVALUATED_HISTORY: usize = 64;

#[derive(Debug, Default)]
struct SessionState {
    evaluated: HashSet<CommandId>,
    evaluated_order: VecDeque<CommandId>,
    in_flight: Option<(CommandId, CancellationToken)>,
}

impl SessionState {
    /// Record `id` as evaluated. `false` if it already was.
    fn mark_evaluated(&mut self, id: CommandId) -> bool {
        if !self.evaluated.insert(id) {
            return false;
        }
        self.evaluated_order.push_back(id);
        if self.evaluated_order.len() > EVALUATED_HISTORY {
            if let Some(oldest) = self.evaluated_order.pop_front() {
                self.evaluated.remove(&oldest);
            }
        }
        true
    }
}

/// Evaluation state for one terminal.
#[derive(Debug)]
pub struct CommandSession {
    service: Arc<QuickFixService>,
    state: Mutex<SessionState>,
}

impl CommandSession {
    pub fn new(service: Arc<QuickFixService>) -> Self {
        Self {
            service,
            state: Mutex::new(SessionState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Evaluate a finished command.
    ///
    /// Returns `None` when the command was already evaluated, or when the
    /// evaluation was cancelled or superseded before it completed.
    #[instrument(skip_all, fields(command_id = %command.id))]
    pub async fn on_command_finished(
        &self,
        command: &TerminalCommand,
        output: Option<&[String]>,
    ) -> Option<Vec<QuickFix>> {
        let token = {
            let mut state = self.state();
            if !state.mark_evaluated(command.id) {
                debug!("Command already evaluated");
                return None;
            }
            if let Some((previous, token)) = state.in_flight.take() {
                debug!(superseded = %previous, "Cancelling superseded evaluation");
                token.cancel();
            }

            let token = CancellationToken::new();
            state.in_flight = Some((command.id, token.clone()));
            token
        };

        let fixes = self.service.evaluate(command, output, &token).await;

        let mut state = self.state();
        if matches!(&state.in_flight, Some((id, _)) if *id == command.id) {
            state.in_flight = None;
        }
        if token.is_cancelled() {
            debug!("Evaluation cancelled, discarding fixes");
            return None;
        }
        Some(fixes)
    }

    /// Cancel the in-flight evaluation, if any.
    pub fn cancel(&self) {
        if let Some((id, token)) = self.state().in_flight.take() {
            debug!(command_id = %id, "Cancelling evaluation");
            token.cancel();
        }
    }

    pub fn is_evaluating(&self) -> bool {
        self.state().in_flight.is_some()
    }
}
