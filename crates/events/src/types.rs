//! Event types emitted while a debate simulation runs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope wrapping all events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// Monotonic position within the emitting driver
    pub sequence: u64,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// The actual event
    pub event: Event,
}

impl EventEnvelope {
    /// Create a new event envelope with auto-generated ID and timestamp
    pub fn new(event: Event) -> Self {
        Self {
            id: Uuid::new_v4(),
            sequence: 0,
            timestamp: Utc::now(),
            event,
        }
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }
}

/// All possible events in the system
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    // Simulation lifecycle
    /// The simulation moved to a new phase
    #[serde(rename = "simulation.phase_changed")]
    PhaseChanged { run_id: Uuid, from: String, to: String },

    /// A capability call failed and the run stopped in `error`
    #[serde(rename = "simulation.failed")]
    SimulationFailed {
        run_id: Uuid,
        phase: String,
        message: String,
    },

    /// The run was aborted and state cleared
    #[serde(rename = "simulation.reset")]
    SimulationReset { run_id: Uuid },

    // Research events
    /// A sector changed research status
    #[serde(rename = "research.sector_status")]
    SectorStatusChanged {
        run_id: Uuid,
        sector: String,
        status: String,
    },

    /// Curated evidence from one sector reached the board
    #[serde(rename = "research.evidence_added")]
    EvidenceAdded {
        run_id: Uuid,
        sector: String,
        count: usize,
    },

    // Debate events
    /// The typing indicator turned on or off
    #[serde(rename = "debate.typing")]
    Typing {
        run_id: Uuid,
        side: Option<String>,
        active: bool,
    },

    /// A unit of content was revealed
    #[serde(rename = "debate.revealed")]
    Revealed {
        run_id: Uuid,
        phase: String,
        unit: String,
    },

    // Checkpoint gate events
    /// A checkpoint opened and waits for release
    #[serde(rename = "gate.step_ready")]
    StepReady { run_id: Uuid, phase: String },

    /// A checkpoint released
    #[serde(rename = "gate.released")]
    GateReleased { run_id: Uuid, reason: String },

    // Follow-up events
    /// A follow-up question was asked
    #[serde(rename = "follow_up.opened")]
    FollowUpOpened {
        run_id: Uuid,
        round_id: Uuid,
        question: String,
    },

    /// Both sides answered a follow-up question
    #[serde(rename = "follow_up.settled")]
    FollowUpSettled { run_id: Uuid, round_id: Uuid },

    // System events
    /// Generic error event
    #[serde(rename = "error")]
    Error {
        message: String,
        context: Option<String>,
    },
}

impl Event {
    /// Get the run ID associated with this event, if any
    pub fn run_id(&self) -> Option<Uuid> {
        match self {
            Event::PhaseChanged { run_id, .. }
            | Event::SimulationFailed { run_id, .. }
            | Event::SimulationReset { run_id }
            | Event::SectorStatusChanged { run_id, .. }
            | Event::EvidenceAdded { run_id, .. }
            | Event::Typing { run_id, .. }
            | Event::Revealed { run_id, .. }
            | Event::StepReady { run_id, .. }
            | Event::GateReleased { run_id, .. }
            | Event::FollowUpOpened { run_id, .. }
            | Event::FollowUpSettled { run_id, .. } => Some(*run_id),
            Event::Error { .. } => None,
        }
    }
}
