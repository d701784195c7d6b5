use debate_core::{FollowUpRound, SimulationState, SimulationStep};
use tokio::sync::watch;
use tracing::trace;

use crate::cancel::RunToken;
use crate::error::{OrchestratorError, Result};
use crate::reducer::{reduce, Action};
use crate::state_machine::PhaseMachine;

/// Single owner of the simulation state.
///
/// Updates replace the whole state under the channel's write lock. The run
/// token is checked inside that lock, so once reset has cancelled a run no
/// late continuation of it can land a mutation.
pub struct SimulationStore {
    tx: watch::Sender<SimulationState>,
}

impl Default for SimulationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SimulationState::new());
        Self { tx }
    }

    pub fn snapshot(&self) -> SimulationState {
        self.tx.borrow().clone()
    }

    pub fn read<R>(&self, f: impl FnOnce(&SimulationState) -> R) -> R {
        f(&self.tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<SimulationState> {
        self.tx.subscribe()
    }

    pub fn status(&self) -> SimulationStep {
        self.tx.borrow().status
    }

    /// Apply `action` on behalf of `token`'s run.
    pub fn dispatch(&self, token: &RunToken, action: Action) -> Result<()> {
        let name = action.name();
        let mut cancelled = false;
        self.tx.send_if_modified(|state| {
            if token.is_cancelled() {
                cancelled = true;
                return false;
            }
            replace(state, action);
            true
        });

        if cancelled {
            return Err(OrchestratorError::Cancelled);
        }
        trace!(action = name, "Dispatched");
        Ok(())
    }

    /// Move to `to` if the phase machine allows it, returning the step left.
    pub fn transition(&self, token: &RunToken, to: SimulationStep) -> Result<SimulationStep> {
        let mut outcome = Err(OrchestratorError::Cancelled);
        self.tx.send_if_modified(|state| {
            if token.is_cancelled() {
                return false;
            }
            let from = state.status;
            if let Err(e) = PhaseMachine::validate_transition(from, to) {
                outcome = Err(e);
                return false;
            }
            replace(state, Action::EnterPhase(to));
            outcome = Ok(from);
            true
        });
        outcome
    }

    /// Open a follow-up round, returning its index. Fails unless the debate
    /// is complete and no other round is being answered; the check and the
    /// push happen under one write so concurrent callers cannot both pass.
    pub fn open_follow_up(&self, token: &RunToken, round: FollowUpRound) -> Result<usize> {
        let mut outcome = Err(OrchestratorError::Cancelled);
        self.tx.send_if_modified(|state| {
            if token.is_cancelled() {
                return false;
            }
            if !PhaseMachine::accepts_follow_up(state.status) {
                outcome = Err(OrchestratorError::InvalidInput(format!(
                    "follow-up questions need a completed debate, not {}",
                    state.status
                )));
                return false;
            }
            if state.is_generating_round {
                outcome = Err(OrchestratorError::InvalidInput(
                    "a follow-up round is already being answered".to_string(),
                ));
                return false;
            }
            outcome = Ok(state.additional_rounds.len());
            replace(state, Action::FollowUpOpened(round));
            true
        });
        outcome
    }

    /// Unconditional reset, used after the run token has been cancelled.
    pub fn reset(&self) {
        self.tx.send_modify(|state| replace(state, Action::Reset));
    }
}

fn replace(state: &mut SimulationState, action: Action) {
    let current = std::mem::take(state);
    *state = reduce(current, action);
}
