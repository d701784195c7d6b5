use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::evidence::Sector;
use crate::error::{CoreError, Result};

/// Affirmative (pro) or negative (con) side of the resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(ts_rs::TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Pro,
    Con,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pro => "pro",
            Self::Con => "con",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "pro" => Ok(Self::Pro),
            "con" => Ok(Self::Con),
            _ => Err(CoreError::UnknownSide(s.to_string())),
        }
    }

    pub fn opponent(&self) -> Self {
        match self {
            Self::Pro => Self::Con,
            Self::Con => Self::Pro,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Introduction {
    /// One striking fact or counter-point, no greeting.
    #[serde(default)]
    pub hook: String,
    pub definitions: String,
    pub value_criterion: String,
    /// Numbered list of the contentions to come.
    pub roadmap: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Contention {
    /// e.g. "Point 1"
    pub signpost: String,
    pub claim: String,
    pub reasoning: String,
    #[serde(default)]
    pub evidence_id: Vec<String>,
    /// Argument domain: economic, social, political, ethical, legal or group.
    #[serde(default)]
    pub sector: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Conclusion {
    pub summary: String,
    pub final_appeal: String,
}

/// A fully generated constructive speech.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ConstructiveSpeech {
    pub introduction: Introduction,
    pub contentions: Vec<Contention>,
    pub conclusion: Conclusion,
}

/// The revealed portion of a constructive speech.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechDraft {
    pub introduction: Option<Introduction>,
    pub contentions: Vec<Contention>,
    pub conclusion: Option<Conclusion>,
}

impl SpeechDraft {
    pub fn is_started(&self) -> bool {
        self.introduction.is_some()
    }

    pub fn is_complete(&self) -> bool {
        self.conclusion.is_some()
    }
}

impl From<ConstructiveSpeech> for SpeechDraft {
    fn from(speech: ConstructiveSpeech) -> Self {
        Self {
            introduction: Some(speech.introduction),
            contentions: speech.contentions,
            conclusion: Some(speech.conclusion),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProConArguments {
    pub pro_speech: SpeechDraft,
    pub con_speech: SpeechDraft,
}

impl ProConArguments {
    pub fn speech(&self, side: Side) -> &SpeechDraft {
        match side {
            Side::Pro => &self.pro_speech,
            Side::Con => &self.con_speech,
        }
    }

    pub fn speech_mut(&mut self, side: Side) -> &mut SpeechDraft {
        match side {
            Side::Pro => &mut self.pro_speech,
            Side::Con => &mut self.con_speech,
        }
    }
}

/// Both cross-examinations. Index `i` of an answer list answers index `i`
/// of the paired question list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossExamSet {
    pub pro_questions: Vec<String>,
    pub con_answers: Vec<String>,
    pub con_questions: Vec<String>,
    pub pro_answers: Vec<String>,
}

impl CrossExamSet {
    /// Questions asked by `examiner`.
    pub fn questions(&self, examiner: Side) -> &[String] {
        match examiner {
            Side::Pro => &self.pro_questions,
            Side::Con => &self.con_questions,
        }
    }

    /// Answers given to `examiner`'s questions.
    pub fn answers(&self, examiner: Side) -> &[String] {
        match examiner {
            Side::Pro => &self.con_answers,
            Side::Con => &self.pro_answers,
        }
    }

    pub fn questions_mut(&mut self, examiner: Side) -> &mut Vec<String> {
        match examiner {
            Side::Pro => &mut self.pro_questions,
            Side::Con => &mut self.con_questions,
        }
    }

    pub fn answers_mut(&mut self, examiner: Side) -> &mut Vec<String> {
        match examiner {
            Side::Pro => &mut self.con_answers,
            Side::Con => &mut self.pro_answers,
        }
    }
}

/// One cross-examination as generated: questions with simulated answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossExamination {
    pub examiner: Side,
    pub questions: Vec<String>,
    pub answers: Vec<String>,
}

/// One side's rebuttal turn: a defense against the last attack plus a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RebuttalItem {
    /// Claim from the opponent's constructive being attacked.
    pub target_claim: String,
    #[serde(default)]
    pub sector: String,
    pub defense: String,
    pub rebuttal: String,
    #[serde(default)]
    pub evidence_used: Vec<String>,
    #[serde(default)]
    pub logical_issue_identified: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuttalSet {
    pub pro_rebuttals: Vec<RebuttalItem>,
    pub con_rebuttals: Vec<RebuttalItem>,
}

impl RebuttalSet {
    pub fn turns(&self, side: Side) -> &[RebuttalItem] {
        match side {
            Side::Pro => &self.pro_rebuttals,
            Side::Con => &self.con_rebuttals,
        }
    }

    pub fn turns_mut(&mut self, side: Side) -> &mut Vec<RebuttalItem> {
        match side {
            Side::Pro => &mut self.pro_rebuttals,
            Side::Con => &mut self.con_rebuttals,
        }
    }

    pub fn len(&self) -> usize {
        self.pro_rebuttals.len() + self.con_rebuttals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisPoint {
    pub issue: String,
    pub pro_argument: String,
    pub con_argument: String,
    pub rebuttal_note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EvidenceEvaluation {
    pub description: String,
    pub score: f64,
}

/// Final referee synthesis of the whole debate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaAnalysis {
    pub issue_map: BTreeMap<Sector, Vec<AnalysisPoint>>,
    pub evidence_evaluation: EvidenceEvaluation,
    pub key_agreements: Vec<String>,
    pub key_disagreements: Vec<String>,
    pub uncertainties: Vec<String>,
    pub reflection_prompts: Vec<String>,
}

/// A post-debate question answered by both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpRound {
    pub id: Uuid,
    pub focus_topic: String,
    pub pro_answer: Option<String>,
    pub con_answer: Option<String>,
    pub asked_at: DateTime<Utc>,
}

impl FollowUpRound {
    pub fn new(focus_topic: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            focus_topic: focus_topic.into(),
            pro_answer: None,
            con_answer: None,
            asked_at: Utc::now(),
        }
    }

    pub fn answer(&self, side: Side) -> Option<&str> {
        match side {
            Side::Pro => self.pro_answer.as_deref(),
            Side::Con => self.con_answer.as_deref(),
        }
    }

    pub fn answer_mut(&mut self, side: Side) -> &mut Option<String> {
        match side {
            Side::Pro => &mut self.pro_answer,
            Side::Con => &mut self.con_answer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::Pro.opponent(), Side::Con);
        assert_eq!(Side::Con.opponent(), Side::Pro);
        assert_eq!(Side::parse("con").unwrap(), Side::Con);
    }

    #[test]
    fn test_cross_exam_pairing() {
        let mut cx = CrossExamSet::default();
        cx.questions_mut(Side::Con).push("Source?".to_string());
        cx.answers_mut(Side::Con).push("OECD 2023.".to_string());
        assert_eq!(cx.con_questions, vec!["Source?"]);
        assert_eq!(cx.pro_answers, vec!["OECD 2023."]);
        assert!(cx.questions(Side::Pro).is_empty());
    }

    #[test]
    fn test_speech_draft_from_full_speech() {
        let speech = ConstructiveSpeech {
            contentions: vec![Contention::default(), Contention::default()],
            ..Default::default()
        };
        let draft = SpeechDraft::from(speech);
        assert!(draft.is_started());
        assert!(draft.is_complete());
        assert_eq!(draft.contentions.len(), 2);
    }
}
