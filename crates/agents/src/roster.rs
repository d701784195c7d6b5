//! The capability boundary between the simulation driver and the model.
//!
//! The driver only ever sees [`DebateAgents`]; [`AgentRoster`] is the
//! OpenRouter-backed implementation. Tests substitute their own.

use std::sync::Arc;

use async_trait::async_trait;
use debate_core::{
    ChatMessage, ConstructiveSpeech, CrossExamSet, CrossExamination, EvidenceItem, FramedIssue,
    IssueRefinement, MetaAnalysis, ProConArguments, RebuttalItem, RebuttalSet, Sector, Side,
    SpeechDraft,
};

use crate::config::AgentConfig;
use crate::error::AgentResult;
use crate::openrouter::OpenRouterClient;
use crate::roles::{
    Advocate, CrossExaminer, IssueFramer, Llm, MetaAnalyst, RebuttalSpeaker, Researcher,
};

/// Input for one cross-examination. The con examiner only has the pro
/// speech; the pro examiner also sees its own.
#[derive(Debug, Clone, Copy)]
pub struct CrossExamRequest<'a> {
    pub examiner: Side,
    pub target_speech: &'a SpeechDraft,
    pub own_speech: Option<&'a SpeechDraft>,
    pub evidence: &'a [EvidenceItem],
}

#[derive(Debug, Clone, Copy)]
pub struct RebuttalRequest<'a> {
    pub side: Side,
    pub issue: &'a FramedIssue,
    pub evidence: &'a [EvidenceItem],
    pub speeches: &'a ProConArguments,
    pub history: &'a RebuttalSet,
    /// The opponent's latest turn, absent on the opening turn.
    pub last_opponent: Option<&'a RebuttalItem>,
    pub turn_index: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct AnalysisRequest<'a> {
    pub issue: &'a FramedIssue,
    pub evidence: &'a [EvidenceItem],
    pub speeches: &'a ProConArguments,
    pub rebuttals: &'a RebuttalSet,
    pub cross_exam: &'a CrossExamSet,
}

#[async_trait]
pub trait DebateAgents: Send + Sync {
    async fn frame_issue(&self, topic: &str) -> AgentResult<FramedIssue>;

    async fn refine_issue(
        &self,
        history: &[ChatMessage],
        draft: &FramedIssue,
    ) -> AgentResult<IssueRefinement>;

    /// Scored, filtered and capped evidence for one sector. An unreadable
    /// model answer yields an empty list rather than an error.
    async fn research_sector(
        &self,
        issue: &FramedIssue,
        sector: Sector,
    ) -> AgentResult<Vec<EvidenceItem>>;

    async fn constructive_speech(
        &self,
        side: Side,
        issue: &FramedIssue,
        evidence: &[EvidenceItem],
    ) -> AgentResult<ConstructiveSpeech>;

    async fn cross_examine(&self, request: CrossExamRequest<'_>) -> AgentResult<CrossExamination>;

    async fn rebuttal_turn(&self, request: RebuttalRequest<'_>) -> AgentResult<RebuttalItem>;

    async fn analyze(&self, request: AnalysisRequest<'_>) -> AgentResult<MetaAnalysis>;

    async fn answer_question(
        &self,
        side: Side,
        issue: &FramedIssue,
        evidence: &[EvidenceItem],
        question: &str,
    ) -> AgentResult<String>;
}

/// All role agents sharing one client and configuration.
#[derive(Clone)]
pub struct AgentRoster {
    framer: IssueFramer,
    researcher: Researcher,
    advocate: Advocate,
    examiner: CrossExaminer,
    rebuttal: RebuttalSpeaker,
    analyst: MetaAnalyst,
}

impl AgentRoster {
    pub fn new(client: OpenRouterClient, config: AgentConfig) -> Self {
        let client = client.with_retry_policy(config.retry);
        let llm = Llm::new(client, Arc::new(config));
        Self {
            framer: IssueFramer::new(llm.clone()),
            researcher: Researcher::new(llm.clone()),
            advocate: Advocate::new(llm.clone()),
            examiner: CrossExaminer::new(llm.clone()),
            rebuttal: RebuttalSpeaker::new(llm.clone()),
            analyst: MetaAnalyst::new(llm),
        }
    }

    pub fn framer(&self) -> &IssueFramer {
        &self.framer
    }

    pub fn researcher(&self) -> &Researcher {
        &self.researcher
    }
}

#[async_trait]
impl DebateAgents for AgentRoster {
    async fn frame_issue(&self, topic: &str) -> AgentResult<FramedIssue> {
        self.framer.frame(topic).await
    }

    async fn refine_issue(
        &self,
        history: &[ChatMessage],
        draft: &FramedIssue,
    ) -> AgentResult<IssueRefinement> {
        self.framer.refine(history, draft).await
    }

    async fn research_sector(
        &self,
        issue: &FramedIssue,
        sector: Sector,
    ) -> AgentResult<Vec<EvidenceItem>> {
        self.researcher.research(issue, sector).await
    }

    async fn constructive_speech(
        &self,
        side: Side,
        issue: &FramedIssue,
        evidence: &[EvidenceItem],
    ) -> AgentResult<ConstructiveSpeech> {
        self.advocate.constructive(side, issue, evidence).await
    }

    async fn cross_examine(&self, request: CrossExamRequest<'_>) -> AgentResult<CrossExamination> {
        self.examiner.examine(request).await
    }

    async fn rebuttal_turn(&self, request: RebuttalRequest<'_>) -> AgentResult<RebuttalItem> {
        self.rebuttal.turn(request).await
    }

    async fn analyze(&self, request: AnalysisRequest<'_>) -> AgentResult<MetaAnalysis> {
        self.analyst.analyze(request).await
    }

    async fn answer_question(
        &self,
        side: Side,
        issue: &FramedIssue,
        evidence: &[EvidenceItem],
        question: &str,
    ) -> AgentResult<String> {
        self.advocate.answer(side, issue, evidence, question).await
    }
}
