//! Pacing gate between debate phases.
//!
//! A pending checkpoint releases on the first of: run cancellation, an
//! explicit next trigger, or the auto-play countdown running out. Pause
//! freezes the countdown. Waiters sleep on a watch channel and wake on any
//! control change instead of polling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

use crate::cancel::RunToken;
use crate::error::{OrchestratorError, Result};

pub const DEFAULT_AUTO_ADVANCE: Duration = Duration::from_millis(2000);

/// Observable gate state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateStatus {
    /// A checkpoint is pending
    pub step_ready: bool,
    pub auto_play: bool,
    pub paused: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRelease {
    Triggered,
    AutoAdvance,
    Cancelled,
}

impl GateRelease {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Triggered => "triggered",
            Self::AutoAdvance => "auto_advance",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Controls {
    status: GateStatus,
    next_requested: bool,
}

/// Receiver side of the gate's controls, for observers that redraw when a
/// checkpoint opens or the pause and auto-play toggles flip.
#[derive(Debug, Clone)]
pub struct GateWatch {
    rx: watch::Receiver<Controls>,
}

impl GateWatch {
    /// Wait for the next control change. Errs once the gate is dropped.
    pub async fn changed(&mut self) -> std::result::Result<(), watch::error::RecvError> {
        self.rx.changed().await
    }

    /// Latest status, marking it seen.
    pub fn status(&mut self) -> GateStatus {
        self.rx.borrow_and_update().status
    }
}

pub struct CheckpointGate {
    controls: watch::Sender<Controls>,
    auto_advance: Duration,
    pending: AtomicBool,
}

/// Clears the single-flight flag however the wait ends, including when the
/// waiting future is dropped.
struct PendingGuard<'a>(&'a AtomicBool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Default for CheckpointGate {
    fn default() -> Self {
        Self::new(DEFAULT_AUTO_ADVANCE)
    }
}

impl CheckpointGate {
    pub fn new(auto_advance: Duration) -> Self {
        let (controls, _rx) = watch::channel(Controls::default());
        Self {
            controls,
            auto_advance,
            pending: AtomicBool::new(false),
        }
    }

    pub fn status(&self) -> GateStatus {
        self.controls.borrow().status
    }

    pub fn watch(&self) -> GateWatch {
        GateWatch {
            rx: self.controls.subscribe(),
        }
    }

    pub fn toggle_auto_play(&self) -> bool {
        let mut enabled = false;
        self.controls.send_modify(|c| {
            c.status.auto_play = !c.status.auto_play;
            enabled = c.status.auto_play;
        });
        enabled
    }

    pub fn set_auto_play(&self, enabled: bool) {
        self.controls
            .send_if_modified(|c| std::mem::replace(&mut c.status.auto_play, enabled) != enabled);
    }

    pub fn toggle_pause(&self) -> bool {
        let mut paused = false;
        self.controls.send_modify(|c| {
            c.status.paused = !c.status.paused;
            paused = c.status.paused;
        });
        paused
    }

    pub fn resume(&self) {
        self.controls
            .send_if_modified(|c| std::mem::replace(&mut c.status.paused, false));
    }

    /// Request release of the pending checkpoint. Ignored, returning false,
    /// when nothing is pending.
    pub fn trigger_next(&self) -> bool {
        self.controls.send_if_modified(|c| {
            if c.status.step_ready && !c.next_requested {
                c.next_requested = true;
                true
            } else {
                false
            }
        })
    }

    /// Drop every control back to its default.
    pub fn reset(&self) {
        self.controls.send_modify(|c| *c = Controls::default());
    }

    /// Block until the checkpoint releases. Only one wait may be pending.
    pub async fn wait(&self, token: &RunToken) -> Result<GateRelease> {
        if self.pending.swap(true, Ordering::SeqCst) {
            return Err(OrchestratorError::GateBusy);
        }
        let _guard = PendingGuard(&self.pending);

        let mut rx = self.controls.subscribe();
        self.controls.send_modify(|c| {
            c.status.step_ready = true;
            c.next_requested = false;
        });

        let mut elapsed = Duration::ZERO;
        let mut counting_since: Option<Instant> = None;

        let release = loop {
            let controls = *rx.borrow_and_update();
            if token.is_cancelled() {
                break GateRelease::Cancelled;
            }
            if controls.next_requested {
                break GateRelease::Triggered;
            }

            let counting = controls.status.auto_play && !controls.status.paused;
            let now = Instant::now();
            match (counting, counting_since) {
                (true, None) => counting_since = Some(now),
                (false, Some(since)) => {
                    elapsed += now - since;
                    counting_since = None;
                }
                _ => {}
            }

            let running = counting_since.map_or(Duration::ZERO, |since| now - since);
            let remaining = self.auto_advance.saturating_sub(elapsed + running);
            if counting && remaining.is_zero() {
                break GateRelease::AutoAdvance;
            }

            tokio::select! {
                _ = token.cancelled() => break GateRelease::Cancelled,
                changed = rx.changed() => {
                    if changed.is_err() {
                        break GateRelease::Cancelled;
                    }
                }
                _ = tokio::time::sleep(remaining), if counting => {}
            }
        };

        self.controls.send_modify(|c| {
            c.status.step_ready = false;
            c.next_requested = false;
        });
        debug!(release = release.as_str(), "Checkpoint released");
        Ok(release)
    }
}
