use debate_core::SimulationStep;

use crate::error::{OrchestratorError, Result};

/// Legal phase transitions of a simulation run.
///
/// The main path is strictly forward. Two exits exist beside it: `error`
/// from any non-idle state and `idle` (reset) from anywhere.
pub struct PhaseMachine;

impl PhaseMachine {
    pub fn validate_transition(from: SimulationStep, to: SimulationStep) -> Result<()> {
        if Self::allowed_transitions(from).contains(&to) {
            Ok(())
        } else {
            Err(OrchestratorError::invalid_transition(from, to))
        }
    }

    pub fn allowed_transitions(from: SimulationStep) -> Vec<SimulationStep> {
        use SimulationStep::*;

        let mut allowed = match from {
            Idle => vec![Framing],
            Framing => vec![WaitingConfirmation],
            WaitingConfirmation => vec![Refining, Researching],
            Refining => vec![WaitingConfirmation],
            Researching => vec![ResearchCompleted],
            ResearchCompleted => vec![ProConstructive],
            ProConstructive => vec![ConCx],
            ConCx => vec![ConConstructive],
            ConConstructive => vec![ProCx],
            ProCx => vec![Rebuttal],
            Rebuttal => vec![Analyzing],
            Analyzing => vec![Complete],
            Complete | Error => vec![],
        };

        if !matches!(from, Idle | Error) {
            allowed.push(Error);
        }
        allowed.push(Idle);
        allowed
    }

    pub fn can_transition(from: SimulationStep, to: SimulationStep) -> bool {
        Self::validate_transition(from, to).is_ok()
    }

    /// Forward successor on the main path. Confirmation moves on to research
    /// rather than back into refinement.
    pub fn next_step(current: SimulationStep) -> Option<SimulationStep> {
        use SimulationStep::*;

        match current {
            Idle => Some(Framing),
            Framing => Some(WaitingConfirmation),
            WaitingConfirmation => Some(Researching),
            Refining => Some(WaitingConfirmation),
            Researching => Some(ResearchCompleted),
            ResearchCompleted => Some(ProConstructive),
            ProConstructive => Some(ConCx),
            ConCx => Some(ConConstructive),
            ConConstructive => Some(ProCx),
            ProCx => Some(Rebuttal),
            Rebuttal => Some(Analyzing),
            Analyzing => Some(Complete),
            Complete | Error => None,
        }
    }

    pub fn is_terminal(step: SimulationStep) -> bool {
        matches!(step, SimulationStep::Complete | SimulationStep::Error)
    }

    /// Whether a phase capability call may be dispatched from `step`.
    pub fn accepts_generation(step: SimulationStep) -> bool {
        step != SimulationStep::Idle && !Self::is_terminal(step)
    }

    /// Follow-up rounds are the only work accepted after completion.
    pub fn accepts_follow_up(step: SimulationStep) -> bool {
        step == SimulationStep::Complete
    }
}
