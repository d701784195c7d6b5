use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{OrchestratorError, Result};

/// Identity and cancellation scope of one simulation run.
///
/// Every async chain the driver starts holds a clone. Reset cancels it, and
/// every suspension point (capability call, pacing delay, checkpoint) then
/// resolves to [`OrchestratorError::Cancelled`] without touching state.
#[derive(Debug, Clone)]
pub struct RunToken {
    id: Uuid,
    cancel: CancellationToken,
}

impl Default for RunToken {
    fn default() -> Self {
        Self::new()
    }
}

impl RunToken {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(OrchestratorError::Cancelled)
        } else {
            Ok(())
        }
    }

    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    /// Await `work` unless the run is cancelled first. The in-flight future
    /// is dropped on cancellation, so its result never reaches the caller.
    pub async fn guard<F: Future>(&self, work: F) -> Result<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(OrchestratorError::Cancelled),
            output = work => Ok(output),
        }
    }

    pub async fn sleep(&self, duration: Duration) -> Result<()> {
        self.guard(tokio::time::sleep(duration)).await
    }
}
