//! Role agents. Each role owns its prompts and response shapes and talks to
//! the model through a shared [`Llm`] handle.

mod advocate;
mod analyst;
mod examiner;
mod framer;
mod rebuttal;
mod researcher;

pub use advocate::Advocate;
pub use analyst::MetaAnalyst;
pub use examiner::CrossExaminer;
pub use framer::IssueFramer;
pub use rebuttal::RebuttalSpeaker;
pub use researcher::Researcher;

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::AgentConfig;
use crate::error::AgentResult;
use crate::json::extract_json;
use crate::openrouter::{ChatCompletionRequest, ChatMessage, OpenRouterClient};
use crate::schema::StructuredOutput;

/// Client plus configuration, cheap to clone into every role.
#[derive(Clone)]
pub(crate) struct Llm {
    client: OpenRouterClient,
    config: Arc<AgentConfig>,
}

impl Llm {
    pub(crate) fn new(client: OpenRouterClient, config: Arc<AgentConfig>) -> Self {
        Self { client, config }
    }

    pub(crate) fn config(&self) -> &AgentConfig {
        &self.config
    }

    fn messages(system: Option<String>, user: String) -> Vec<ChatMessage> {
        system
            .map(ChatMessage::system)
            .into_iter()
            .chain(std::iter::once(ChatMessage::user(user)))
            .collect()
    }

    /// Plain completion without search or schema.
    pub(crate) async fn text(&self, user: String, operation: &str) -> AgentResult<String> {
        let request = ChatCompletionRequest::new(&self.config.model, Self::messages(None, user));
        self.client.complete(request, operation).await
    }

    /// Search-grounded completion whose JSON must be dug out of prose.
    pub(crate) async fn search_json<T: DeserializeOwned>(
        &self,
        system: String,
        user: String,
        temperature: Option<f32>,
        operation: &str,
    ) -> AgentResult<T> {
        let text = self.search_text(system, user, temperature, operation).await?;
        extract_json(&text)
    }

    pub(crate) async fn search_text(
        &self,
        system: String,
        user: String,
        temperature: Option<f32>,
        operation: &str,
    ) -> AgentResult<String> {
        let mut request =
            ChatCompletionRequest::new(&self.config.model, Self::messages(Some(system), user))
                .with_web_search();
        if let Some(temperature) = temperature {
            request = request.with_temperature(temperature);
        }
        self.client.complete(request, operation).await
    }

    /// Completion constrained to the strict schema of `T`.
    pub(crate) async fn structured<T: StructuredOutput>(
        &self,
        system: String,
        user: String,
        operation: &str,
    ) -> AgentResult<T> {
        let request =
            ChatCompletionRequest::new(&self.config.model, Self::messages(Some(system), user))
                .with_json_schema(T::output_name(), T::strict_schema());
        let text = self.client.complete(request, operation).await?;
        extract_json(&text)
    }
}
