//! Test doubles for driver and reducer tests.

use std::sync::Mutex;
use std::time::Duration;

use agents::{
    AgentError, AgentResult, AnalysisRequest, CrossExamRequest, DebateAgents, RebuttalRequest,
};
use async_trait::async_trait;
use debate_core::scoring::expand_evidence;
use debate_core::{
    ChatMessage, Conclusion, ConstructiveSpeech, Contention, CrossExamination, EvidenceItem,
    FramedIssue, Introduction, IssueRefinement, MetaAnalysis, OperationalFit, RawEvidence,
    RebuttalItem, Sector, Side, SourceTier,
};

pub(crate) fn evidence_item(sector: Sector) -> EvidenceItem {
    let raw = RawEvidence {
        headline: format!("{sector} finding"),
        detail: "Measured **12%** change over two years".to_string(),
        source: "National Statistics Office".to_string(),
        url: "https://stats.example.org/report".to_string(),
        pub_year: Some(2025),
        source_tier: SourceTier::Tier1,
        has_stats: true,
        op_fit: OperationalFit::Direct,
        st_type: None,
    };
    expand_evidence(&[raw], sector, 2025)
        .into_iter()
        .next()
        .expect("one raw item expands to one evidence item")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RebuttalCall {
    pub side: Side,
    pub turn_index: usize,
    pub last_opponent: Option<String>,
    pub history_len: usize,
}

/// Deterministic [`DebateAgents`] with switchable failures and delays.
#[derive(Default)]
pub(crate) struct FakeAgents {
    failing_sector: Option<Sector>,
    failing_cross_exam: bool,
    failing_answer: Option<Side>,
    research_delay: Duration,
    speech_delay: Duration,
    pro_answer_delay: Duration,
    con_answer_delay: Duration,
    rebuttal_calls: Mutex<Vec<RebuttalCall>>,
}

impl FakeAgents {
    pub fn failing_sector(mut self, sector: Sector) -> Self {
        self.failing_sector = Some(sector);
        self
    }

    pub fn failing_cross_exam(mut self) -> Self {
        self.failing_cross_exam = true;
        self
    }

    pub fn failing_answer(mut self, side: Side) -> Self {
        self.failing_answer = Some(side);
        self
    }

    pub fn with_research_delay(mut self, delay: Duration) -> Self {
        self.research_delay = delay;
        self
    }

    pub fn with_speech_delay(mut self, delay: Duration) -> Self {
        self.speech_delay = delay;
        self
    }

    pub fn with_answer_delay(mut self, side: Side, delay: Duration) -> Self {
        match side {
            Side::Pro => self.pro_answer_delay = delay,
            Side::Con => self.con_answer_delay = delay,
        }
        self
    }

    pub fn rebuttal_calls(&self) -> Vec<RebuttalCall> {
        self.rebuttal_calls.lock().unwrap().clone()
    }
}

fn speech(side: Side) -> ConstructiveSpeech {
    ConstructiveSpeech {
        introduction: Introduction {
            hook: format!("{side} hook"),
            definitions: "Remote work means working away from the office.".to_string(),
            value_criterion: "Social welfare".to_string(),
            roadmap: "1. Productivity 2. Wellbeing".to_string(),
        },
        contentions: (1..=2)
            .map(|n| Contention {
                signpost: format!("Point {n}"),
                claim: format!("{side} claim {n}"),
                reasoning: "Evidence shows it.".to_string(),
                evidence_id: vec!["EV-STA-01".to_string()],
                sector: "economic".to_string(),
            })
            .collect(),
        conclusion: Conclusion {
            summary: format!("{side} summary"),
            final_appeal: format!("Vote {side}"),
        },
    }
}

#[async_trait]
impl DebateAgents for FakeAgents {
    async fn frame_issue(&self, topic: &str) -> AgentResult<FramedIssue> {
        Ok(FramedIssue::new(format!("Should {topic} be the default?"))
            .with_positions("Yes", "No"))
    }

    async fn refine_issue(
        &self,
        _history: &[ChatMessage],
        draft: &FramedIssue,
    ) -> AgentResult<IssueRefinement> {
        Ok(IssueRefinement {
            message: "Scoped to Korea.".to_string(),
            draft: draft.clone().with_scope("Korea", "2020-2025"),
        })
    }

    async fn research_sector(
        &self,
        _issue: &FramedIssue,
        sector: Sector,
    ) -> AgentResult<Vec<EvidenceItem>> {
        tokio::time::sleep(self.research_delay).await;
        if self.failing_sector == Some(sector) {
            return Err(AgentError::api("search backend down", Some(500)));
        }
        Ok(vec![evidence_item(sector)])
    }

    async fn constructive_speech(
        &self,
        side: Side,
        _issue: &FramedIssue,
        _evidence: &[EvidenceItem],
    ) -> AgentResult<ConstructiveSpeech> {
        tokio::time::sleep(self.speech_delay).await;
        Ok(speech(side))
    }

    async fn cross_examine(&self, request: CrossExamRequest<'_>) -> AgentResult<CrossExamination> {
        if self.failing_cross_exam {
            return Err(AgentError::api("examiner unavailable", Some(503)));
        }
        let examiner = request.examiner;
        Ok(CrossExamination {
            examiner,
            questions: vec![format!("{examiner} Q1"), format!("{examiner} Q2")],
            answers: vec!["A1".to_string(), "A2".to_string()],
        })
    }

    async fn rebuttal_turn(&self, request: RebuttalRequest<'_>) -> AgentResult<RebuttalItem> {
        self.rebuttal_calls.lock().unwrap().push(RebuttalCall {
            side: request.side,
            turn_index: request.turn_index,
            last_opponent: request.last_opponent.map(|item| item.target_claim.clone()),
            history_len: request.history.len(),
        });
        Ok(RebuttalItem {
            target_claim: format!("{}-{}", request.side, request.turn_index),
            defense: "Defended".to_string(),
            rebuttal: "Attacked".to_string(),
            ..Default::default()
        })
    }

    async fn analyze(&self, _request: AnalysisRequest<'_>) -> AgentResult<MetaAnalysis> {
        Ok(MetaAnalysis {
            key_agreements: vec!["Both value wellbeing".to_string()],
            ..Default::default()
        })
    }

    async fn answer_question(
        &self,
        side: Side,
        _issue: &FramedIssue,
        _evidence: &[EvidenceItem],
        question: &str,
    ) -> AgentResult<String> {
        let delay = match side {
            Side::Pro => self.pro_answer_delay,
            Side::Con => self.con_answer_delay,
        };
        tokio::time::sleep(delay).await;
        if self.failing_answer == Some(side) {
            return Err(AgentError::api("answer down", Some(502)));
        }
        Ok(format!("{side} answers: {question}"))
    }
}
