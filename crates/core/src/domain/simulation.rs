use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::debate::{CrossExamSet, FollowUpRound, MetaAnalysis, ProConArguments, RebuttalSet};
use super::evidence::{EvidenceItem, Sector, SectorStatus};
use super::issue::FramedIssue;
use crate::error::{CoreError, Result};

/// Phase of a simulation run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum SimulationStep {
    #[default]
    Idle,
    Framing,
    WaitingConfirmation,
    Refining,
    Researching,
    ResearchCompleted,
    ProConstructive,
    ConCx,
    ConConstructive,
    ProCx,
    Rebuttal,
    Analyzing,
    Complete,
    Error,
}

impl SimulationStep {
    pub const ALL: [SimulationStep; 14] = [
        Self::Idle,
        Self::Framing,
        Self::WaitingConfirmation,
        Self::Refining,
        Self::Researching,
        Self::ResearchCompleted,
        Self::ProConstructive,
        Self::ConCx,
        Self::ConConstructive,
        Self::ProCx,
        Self::Rebuttal,
        Self::Analyzing,
        Self::Complete,
        Self::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Framing => "framing",
            Self::WaitingConfirmation => "waiting_confirmation",
            Self::Refining => "refining",
            Self::Researching => "researching",
            Self::ResearchCompleted => "research_completed",
            Self::ProConstructive => "pro_constructive",
            Self::ConCx => "con_cx",
            Self::ConConstructive => "con_constructive",
            Self::ProCx => "pro_cx",
            Self::Rebuttal => "rebuttal",
            Self::Analyzing => "analyzing",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| CoreError::UnknownStep(s.to_string()))
    }

    /// Steps of the paced debate, from the first constructive to analysis.
    pub fn is_debate_phase(&self) -> bool {
        matches!(
            self,
            Self::ProConstructive
                | Self::ConCx
                | Self::ConConstructive
                | Self::ProCx
                | Self::Rebuttal
                | Self::Analyzing
        )
    }
}

impl std::fmt::Display for SimulationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One entry of the framing conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// The whole state of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub status: SimulationStep,
    pub error: Option<String>,
    pub original_topic: String,
    pub framed_issue: Option<FramedIssue>,
    pub framing_chat: Vec<ChatMessage>,
    pub evidence_board: Vec<EvidenceItem>,
    pub sector_statuses: BTreeMap<Sector, SectorStatus>,
    pub arguments: ProConArguments,
    pub cross_exam: CrossExamSet,
    pub rebuttals: RebuttalSet,
    pub analysis: Option<MetaAnalysis>,
    pub additional_rounds: Vec<FollowUpRound>,
    pub is_generating_round: bool,
    pub is_typing: bool,
}

impl SimulationState {
    pub fn new() -> Self {
        Self {
            status: SimulationStep::Idle,
            error: None,
            original_topic: String::new(),
            framed_issue: None,
            framing_chat: Vec::new(),
            evidence_board: Vec::new(),
            sector_statuses: pending_sectors(),
            arguments: ProConArguments::default(),
            cross_exam: CrossExamSet::default(),
            rebuttals: RebuttalSet::default(),
            analysis: None,
            additional_rounds: Vec::new(),
            is_generating_round: false,
            is_typing: false,
        }
    }

    pub fn evidence(&self, id: &str) -> Option<&EvidenceItem> {
        self.evidence_board.iter().find(|item| item.id == id)
    }

    pub fn evidence_in(&self, sector: Sector) -> impl Iterator<Item = &EvidenceItem> {
        self.evidence_board
            .iter()
            .filter(move |item| item.sector == sector)
    }

    pub fn sector_status(&self, sector: Sector) -> SectorStatus {
        self.sector_statuses
            .get(&sector)
            .copied()
            .unwrap_or_default()
    }

    pub fn all_sectors_settled(&self) -> bool {
        Sector::ALL
            .iter()
            .all(|sector| self.sector_status(*sector).is_settled())
    }

    pub fn latest_round(&self) -> Option<&FollowUpRound> {
        self.additional_rounds.last()
    }
}

impl Default for SimulationState {
    fn default() -> Self {
        Self::new()
    }
}

/// A status map with every sector pending.
pub fn pending_sectors() -> BTreeMap<Sector, SectorStatus> {
    Sector::ALL
        .into_iter()
        .map(|sector| (sector, SectorStatus::Pending))
        .collect()
}
