//! Event bus and event vocabulary for the debate simulator.
//!
//! The orchestration driver publishes phase changes, reveals and gate
//! activity here so front-ends can follow a run without polling state.

mod bus;
mod types;

pub use bus::EventBus;
pub use types::*;
