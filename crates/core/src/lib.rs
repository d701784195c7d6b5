//! Core domain types for the CEDA debate simulator.
//!
//! Everything in this crate is plain data plus pure functions: the
//! simulation record, the debate artifacts produced by each phase, and
//! the InfoQ evidence scorer.

pub mod domain;
pub mod error;
pub mod scoring;

pub use domain::*;
pub use error::{CoreError, Result};
