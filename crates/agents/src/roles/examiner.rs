use debate_core::CrossExamination;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{info, warn};

use super::Llm;
use crate::error::AgentResult;
use crate::prompts::DebatePrompts;
use crate::roster::CrossExamRequest;

/// Upper bound on questions per cross-examination.
pub const MAX_QUESTIONS: usize = 2;

#[derive(Debug, Deserialize, JsonSchema)]
struct ExchangeResponse {
    /// Direct questions, at most two.
    questions: Vec<String>,
    /// Simulated answers, same order as the questions.
    answers: Vec<String>,
}

#[derive(Clone)]
pub struct CrossExaminer {
    llm: Llm,
}

impl CrossExaminer {
    pub(crate) fn new(llm: Llm) -> Self {
        Self { llm }
    }

    pub async fn examine(&self, request: CrossExamRequest<'_>) -> AgentResult<CrossExamination> {
        let examiner = request.examiner;
        let system = DebatePrompts::cross_examiner(examiner, &self.llm.config().language);

        let mut user = format!(
            "{} Speech: {}\n",
            examiner.opponent().as_str().to_uppercase(),
            serde_json::to_string(request.target_speech)?
        );
        if let Some(own) = request.own_speech {
            user.push_str(&format!(
                "{} Speech: {}\n",
                examiner.as_str().to_uppercase(),
                serde_json::to_string(own)?
            ));
        }
        user.push_str(&format!("Evidence: {}", serde_json::to_string(request.evidence)?));

        let mut response: ExchangeResponse = self
            .llm
            .structured(system, user, &format!("{examiner}_cross_exam"))
            .await?;

        if response.questions.len() > MAX_QUESTIONS {
            warn!(examiner = %examiner, asked = response.questions.len(), "Trimming excess questions");
            response.questions.truncate(MAX_QUESTIONS);
        }
        response.answers.truncate(response.questions.len());

        info!(
            examiner = %examiner,
            questions = response.questions.len(),
            answers = response.answers.len(),
            "Cross-examination generated"
        );
        Ok(CrossExamination {
            examiner,
            questions: response.questions,
            answers: response.answers,
        })
    }
}
