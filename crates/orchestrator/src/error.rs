use agents::AgentError;
use debate_core::SimulationStep;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("A checkpoint is already pending for this run")]
    GateBusy,

    /// The run was reset. Never surfaced as an error state.
    #[error("Run cancelled")]
    Cancelled,

    #[error("Missing {what} for step {step}")]
    MissingContext { what: &'static str, step: SimulationStep },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl OrchestratorError {
    pub fn invalid_transition(from: SimulationStep, to: SimulationStep) -> Self {
        Self::InvalidTransition {
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        }
    }

    pub fn missing(what: &'static str, step: SimulationStep) -> Self {
        Self::MissingContext { what, step }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_error_message_passes_through() {
        let err: OrchestratorError = AgentError::Extraction("no JSON object".to_string()).into();
        assert!(err.to_string().contains("no JSON object"));
        assert!(!err.is_cancelled());
    }

    #[test]
    fn test_transition_error_names_steps() {
        let err = OrchestratorError::invalid_transition(SimulationStep::Idle, SimulationStep::Rebuttal);
        assert_eq!(err.to_string(), "Invalid state transition from idle to rebuttal");
    }
}
