use debate_core::RebuttalItem;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use super::Llm;
use crate::error::AgentResult;
use crate::prompts::DebatePrompts;
use crate::roster::RebuttalRequest;

#[derive(Debug, Deserialize, JsonSchema)]
struct RebuttalResponse {
    rebuttal_item: RebuttalItem,
}

/// Produces one rebuttal turn, chained to the opponent's previous turn.
#[derive(Clone)]
pub struct RebuttalSpeaker {
    llm: Llm,
}

impl RebuttalSpeaker {
    pub(crate) fn new(llm: Llm) -> Self {
        Self { llm }
    }

    pub async fn turn(&self, request: RebuttalRequest<'_>) -> AgentResult<RebuttalItem> {
        let side = request.side;
        let system = DebatePrompts::rebuttal(side, &self.llm.config().language);

        let past_attacks = request
            .history
            .turns(side)
            .iter()
            .map(|r| format!("Attacked: {}", r.target_claim))
            .collect::<Vec<_>>()
            .join("; ");
        let user = format!(
            "Resolution: {}\nEvidence: {}\nConstructive Speeches: {}\nPast My Attacks: {past_attacks}\n\n{}",
            request.issue.refined_issue,
            serde_json::to_string(request.evidence)?,
            serde_json::to_string(request.speeches)?,
            DebatePrompts::rebuttal_context(request.last_opponent),
        );

        let response: RebuttalResponse = self
            .llm
            .structured(system, user, &format!("{side}_rebuttal"))
            .await?;

        info!(side = %side, turn = request.turn_index, target = %response.rebuttal_item.target_claim, "Rebuttal turn generated");
        Ok(response.rebuttal_item)
    }
}
