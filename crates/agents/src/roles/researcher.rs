use chrono::Utc;
use debate_core::scoring::curate;
use debate_core::{EvidenceItem, FramedIssue, RawEvidence, Sector};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::Llm;
use crate::error::AgentResult;
use crate::json::extract_json;
use crate::prompts::DebatePrompts;

#[derive(Debug, Deserialize)]
struct ResearchResponse {
    #[serde(default)]
    data: Vec<RawEvidence>,
}

/// Neutral evidence researcher. One call per sector, scored and curated locally.
#[derive(Clone)]
pub struct Researcher {
    llm: Llm,
}

impl Researcher {
    pub(crate) fn new(llm: Llm) -> Self {
        Self { llm }
    }

    /// Broadens the issue into a searchable concept for sectors that look for
    /// comparable cases and theory. Other sectors search the issue verbatim.
    pub async fn search_topic(&self, issue: &FramedIssue, sector: Sector) -> AgentResult<String> {
        if !sector.generalizes_topic() {
            return Ok(issue.refined_issue.clone());
        }

        let text = self
            .llm
            .text(
                DebatePrompts::generalize_topic(&issue.refined_issue),
                "generalize_topic",
            )
            .await?;
        let topic = text.trim();
        if topic.is_empty() {
            return Ok(issue.refined_issue.clone());
        }
        debug!(sector = %sector, topic, "Generalized search topic");
        Ok(topic.to_string())
    }

    pub async fn research(&self, issue: &FramedIssue, sector: Sector) -> AgentResult<Vec<EvidenceItem>> {
        let config = self.llm.config();
        let search_topic = self.search_topic(issue, sector).await?;
        let strategy = DebatePrompts::sector_strategy(sector, issue, &search_topic);
        let current_date = Utc::now().format("%Y-%m-%d").to_string();

        let system = DebatePrompts::researcher(sector, &config.language, &current_date);
        let user = DebatePrompts::research_task(issue, sector, &search_topic, &strategy);
        let text = self
            .llm
            .search_text(system, user, Some(config.research_temperature), "research_sector")
            .await?;

        // An unreadable answer leaves the sector empty instead of failing the phase.
        let response = match extract_json::<ResearchResponse>(&text) {
            Ok(response) => response,
            Err(e) => {
                warn!(sector = %sector, error = %e, "Discarding unparseable research response");
                return Ok(Vec::new());
            }
        };

        let raw_count = response.data.len();
        let items = curate(&response.data, sector, config.current_year());
        info!(sector = %sector, raw_count, kept = items.len(), "Sector research curated");
        Ok(items)
    }
}
