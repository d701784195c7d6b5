//! Whose turn it is.
//!
//! The driver uses these to pick the next speaker and the timeline uses them
//! to place the typing bubble, so both always agree.

use debate_core::{CrossExamSet, RebuttalSet, Side, SimulationState, SimulationStep};

/// Rounds of con-then-pro rebuttal turns.
pub const REBUTTAL_ROUNDS: usize = 3;

/// During `examiner`'s cross-examination the opponent speaks while a
/// question is unanswered.
pub fn cross_exam_speaker(examiner: Side, cross_exam: &CrossExamSet) -> Side {
    if cross_exam.questions(examiner).len() > cross_exam.answers(examiner).len() {
        examiner.opponent()
    } else {
        examiner
    }
}

/// Con opens every rebuttal round; pro answers once con is ahead.
pub fn rebuttal_speaker(rebuttals: &RebuttalSet) -> Side {
    if rebuttals.turns(Side::Con).len() > rebuttals.turns(Side::Pro).len() {
        Side::Pro
    } else {
        Side::Con
    }
}

pub fn rebuttals_finished(rebuttals: &RebuttalSet) -> bool {
    rebuttals.turns(Side::Con).len() >= REBUTTAL_ROUNDS
        && rebuttals.turns(Side::Pro).len() >= REBUTTAL_ROUNDS
}

/// Side acting in the current debate phase, if the phase has one.
pub fn acting_side(state: &SimulationState) -> Option<Side> {
    match state.status {
        SimulationStep::ProConstructive => Some(Side::Pro),
        SimulationStep::ConCx => Some(cross_exam_speaker(Side::Con, &state.cross_exam)),
        SimulationStep::ConConstructive => Some(Side::Con),
        SimulationStep::ProCx => Some(cross_exam_speaker(Side::Pro, &state.cross_exam)),
        SimulationStep::Rebuttal => Some(rebuttal_speaker(&state.rebuttals)),
        _ => None,
    }
}
