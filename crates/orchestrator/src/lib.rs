//! Simulation engine: phase machine, state store, pacing gate and the
//! driver that walks a debate from framing to analysis.

pub mod cancel;
pub mod checkpoint;
pub mod config;
pub mod driver;
pub mod emitter;
pub mod error;
pub mod reducer;
pub mod state_machine;
pub mod store;
pub mod timeline;
pub mod turn;

#[cfg(test)]
mod testing;

pub use cancel::RunToken;
pub use checkpoint::{CheckpointGate, GateRelease, GateStatus, GateWatch};
pub use config::{DriverConfig, Pacing};
pub use driver::SimulationDriver;
pub use emitter::OrderedEventEmitter;
pub use error::{OrchestratorError, Result};
pub use reducer::{reduce, Action};
pub use state_machine::PhaseMachine;
pub use store::SimulationStore;
pub use timeline::{
    project, TimelineItem, TimelineItemKind, TimelineLabels, TimelineSide, TimelineView,
};
pub use turn::{acting_side, cross_exam_speaker, rebuttal_speaker};
