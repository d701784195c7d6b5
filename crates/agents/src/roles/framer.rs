use debate_core::{ChatMessage, ChatRole, FramedIssue, IssueRefinement};
use tracing::info;

use super::Llm;
use crate::error::{AgentError, AgentResult};
use crate::prompts::DebatePrompts;

/// Frames a raw topic into a neutral debate question and refines it with the user.
#[derive(Clone)]
pub struct IssueFramer {
    llm: Llm,
}

impl IssueFramer {
    pub(crate) fn new(llm: Llm) -> Self {
        Self { llm }
    }

    pub async fn frame(&self, topic: &str) -> AgentResult<FramedIssue> {
        let system = DebatePrompts::issue_framer(&self.llm.config().language);
        let issue: FramedIssue = self
            .llm
            .search_json(system, format!("User Topic: {topic}"), None, "frame_issue")
            .await?;

        if !issue.is_usable() {
            return Err(AgentError::Extraction(
                "framing response has an empty refined_issue".to_string(),
            ));
        }
        info!(refined_issue = %issue.refined_issue, "Framed issue");
        Ok(issue)
    }

    /// `history` must end with the user's latest message.
    pub async fn refine(
        &self,
        history: &[ChatMessage],
        draft: &FramedIssue,
    ) -> AgentResult<IssueRefinement> {
        let latest = history
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.text.as_str())
            .unwrap_or_default();
        let transcript = history
            .iter()
            .map(|m| {
                let role = match m.role {
                    ChatRole::User => "USER",
                    ChatRole::Model => "MODEL",
                };
                format!("{role}: {}", m.text)
            })
            .collect::<Vec<_>>()
            .join("\n");
        let draft_json = serde_json::to_string(draft)?;

        let system = DebatePrompts::issue_refiner(&self.llm.config().language);
        let user = DebatePrompts::refinement_input(&draft_json, &transcript, latest);
        self.llm
            .search_json(system, user, None, "refine_issue")
            .await
    }
}
