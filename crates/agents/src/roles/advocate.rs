use debate_core::{ConstructiveSpeech, EvidenceItem, FramedIssue, Side};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use super::Llm;
use crate::error::AgentResult;
use crate::prompts::DebatePrompts;

#[derive(Debug, Deserialize, JsonSchema)]
struct FollowUpAnswer {
    /// Direct answer that keeps the speaker's stance.
    answer: String,
}

/// Speaks for one side: the constructive speech and follow-up answers.
#[derive(Clone)]
pub struct Advocate {
    llm: Llm,
}

impl Advocate {
    pub(crate) fn new(llm: Llm) -> Self {
        Self { llm }
    }

    pub async fn constructive(
        &self,
        side: Side,
        issue: &FramedIssue,
        evidence: &[EvidenceItem],
    ) -> AgentResult<ConstructiveSpeech> {
        let system = DebatePrompts::constructive(side, &self.llm.config().language);
        let user = format!(
            "Resolution: {}\nEvidence: {}",
            issue.refined_issue,
            serde_json::to_string(evidence)?
        );
        let speech: ConstructiveSpeech = self
            .llm
            .structured(system, user, &format!("{side}_constructive"))
            .await?;

        info!(side = %side, contentions = speech.contentions.len(), "Constructive speech generated");
        Ok(speech)
    }

    pub async fn answer(
        &self,
        side: Side,
        issue: &FramedIssue,
        evidence: &[EvidenceItem],
        question: &str,
    ) -> AgentResult<String> {
        let system = DebatePrompts::follow_up(side, issue, &self.llm.config().language);
        let position = match side {
            Side::Pro => &issue.positions.pro,
            Side::Con => &issue.positions.con,
        };
        let user = format!(
            "Resolution: {}\nPosition: {position}\nEvidence: {}\n\nUser Question: \"{question}\"",
            issue.refined_issue,
            serde_json::to_string(evidence)?
        );
        let reply: FollowUpAnswer = self
            .llm
            .structured(system, user, &format!("{side}_follow_up"))
            .await?;
        Ok(reply.answer)
    }
}
