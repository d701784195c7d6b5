use std::collections::BTreeMap;

use debate_core::{AnalysisPoint, EvidenceEvaluation, MetaAnalysis, Sector};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::info;

use super::Llm;
use crate::error::AgentResult;
use crate::prompts::DebatePrompts;
use crate::roster::AnalysisRequest;

/// Strict schemas cannot express open maps, so every sector gets a field.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
struct IssueMapResponse {
    statistics: Vec<AnalysisPoint>,
    public_opinion: Vec<AnalysisPoint>,
    domestic_cases: Vec<AnalysisPoint>,
    international_cases: Vec<AnalysisPoint>,
    theories: Vec<AnalysisPoint>,
    stakeholders: Vec<AnalysisPoint>,
}

impl From<IssueMapResponse> for BTreeMap<Sector, Vec<AnalysisPoint>> {
    fn from(map: IssueMapResponse) -> Self {
        [
            (Sector::Statistics, map.statistics),
            (Sector::PublicOpinion, map.public_opinion),
            (Sector::DomesticCases, map.domestic_cases),
            (Sector::InternationalCases, map.international_cases),
            (Sector::Theories, map.theories),
            (Sector::Stakeholders, map.stakeholders),
        ]
        .into_iter()
        .filter(|(_, points)| !points.is_empty())
        .collect()
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct AnalysisResponse {
    issue_map: IssueMapResponse,
    evidence_evaluation: EvidenceEvaluation,
    key_agreements: Vec<String>,
    key_disagreements: Vec<String>,
    uncertainties: Vec<String>,
    reflection_prompts: Vec<String>,
}

/// Neutral referee that synthesizes the finished debate.
#[derive(Clone)]
pub struct MetaAnalyst {
    llm: Llm,
}

impl MetaAnalyst {
    pub(crate) fn new(llm: Llm) -> Self {
        Self { llm }
    }

    pub async fn analyze(&self, request: AnalysisRequest<'_>) -> AgentResult<MetaAnalysis> {
        let system = DebatePrompts::meta_analyst(&self.llm.config().language);
        let user = format!(
            "Issue: {}\nEvidence: {}\nArguments: {}\nRebuttals: {}\nCross Exam: {}",
            serde_json::to_string(request.issue)?,
            serde_json::to_string(request.evidence)?,
            serde_json::to_string(request.speeches)?,
            serde_json::to_string(request.rebuttals)?,
            serde_json::to_string(request.cross_exam)?,
        );

        let response: AnalysisResponse = self.llm.structured(system, user, "meta_analysis").await?;
        let analysis = MetaAnalysis {
            issue_map: response.issue_map.into(),
            evidence_evaluation: response.evidence_evaluation,
            key_agreements: response.key_agreements,
            key_disagreements: response.key_disagreements,
            uncertainties: response.uncertainties,
            reflection_prompts: response.reflection_prompts,
        };

        info!(
            sectors = analysis.issue_map.len(),
            evidence_score = analysis.evidence_evaluation.score,
            "Meta analysis generated"
        );
        Ok(analysis)
    }
}
