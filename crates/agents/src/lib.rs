//! Role agents for the debate simulator and the OpenRouter client they share.
//!
//! [`DebateAgents`] is the only surface the orchestrator depends on.

pub mod config;
pub mod error;
pub mod json;
pub mod openrouter;
pub mod prompts;
pub mod roles;
pub mod roster;
pub mod schema;

pub use config::{AgentConfig, DEFAULT_MODEL};
pub use error::{AgentError, AgentResult};
pub use openrouter::{OpenRouterClient, RetryPolicy, DEFAULT_BASE_URL};
pub use roster::{AgentRoster, AnalysisRequest, CrossExamRequest, DebateAgents, RebuttalRequest};
pub use schema::StructuredOutput;
