//! Projection of a simulation state into an ordered list of display items.
//!
//! [`project`] is pure: the same state, view and labels always produce the
//! same items with the same ids. Ids are keyed by content position, so as
//! the state progresses items are only appended, never renumbered, which
//! lets a renderer diff consecutive projections by id.

use std::collections::HashSet;

use debate_core::{
    CrossExamSet, ProConArguments, RebuttalSet, Side, SimulationState, SimulationStep, SpeechDraft,
};
use serde::{Deserialize, Serialize};

use crate::turn::acting_side;

const INTRO_TITLE: &str = "Introduction & Definitions";
const CONCLUSION_TITLE: &str = "Conclusion";
const ANSWER_LABEL: &str = "Answer (A)";
const DIRECT_ANSWER_LABEL: &str = "Direct Answer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimelineItemKind {
    Divider,
    Intro,
    Argument,
    Conclusion,
    Question,
    Answer,
    Rebuttal,
    UserQuery,
    Loading,
    Analyzing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineSide {
    Pro,
    Con,
    User,
    Center,
}

impl From<Side> for TimelineSide {
    fn from(side: Side) -> Self {
        match side {
            Side::Pro => Self::Pro,
            Side::Con => Self::Con,
        }
    }
}

/// Value criterion and hook shown with an introduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntroMeta {
    pub value: String,
    pub hook: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineItem {
    pub id: String,
    pub kind: TimelineItemKind,
    pub side: TimelineSide,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defense: Option<String>,
    /// Claim a rebuttal targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<IntroMeta>,
}

impl TimelineItem {
    fn new(
        id: impl Into<String>,
        kind: TimelineItemKind,
        side: impl Into<TimelineSide>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            side: side.into(),
            content: content.into(),
            title: None,
            defense: None,
            ref_id: None,
            evidence: Vec::new(),
            sector: None,
            label: None,
            meta: None,
        }
    }

    fn loading(id: &str, side: Side) -> Self {
        Self::new(id, TimelineItemKind::Loading, side, "")
    }

    fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn with_sector(mut self, sector: &str) -> Self {
        if !sector.is_empty() {
            self.sector = Some(sector.to_string());
        }
        self
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(
            self.kind,
            TimelineItemKind::Loading | TimelineItemKind::Analyzing
        )
    }
}

/// Localizable divider and placeholder texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineLabels {
    pub arguing_pro: String,
    pub cx_con: String,
    pub arguing_con: String,
    pub cx_pro: String,
    pub rebuttal_con: String,
    pub analyzing_loading: String,
    pub follow_up_title: String,
    pub con_question: String,
    pub pro_question: String,
}

impl Default for TimelineLabels {
    fn default() -> Self {
        Self {
            arguing_pro: "Affirmative Constructive".to_string(),
            cx_con: "Negative Cross-Examination".to_string(),
            arguing_con: "Negative Constructive".to_string(),
            cx_pro: "Affirmative Cross-Examination".to_string(),
            rebuttal_con: "Rebuttals".to_string(),
            analyzing_loading: "The referee is analyzing the debate...".to_string(),
            follow_up_title: "Follow Up".to_string(),
            con_question: "Negative CX (Q)".to_string(),
            pro_question: "Affirmative CX (Q)".to_string(),
        }
    }
}

/// Gate state the projection depends on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimelineView {
    pub step_ready: bool,
    pub paused: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum PhaseDivider {
    ProConstructive,
    ConCx,
    ConConstructive,
    ProCx,
    Rebuttal,
}

impl PhaseDivider {
    fn id(&self) -> &'static str {
        match self {
            Self::ProConstructive => "divider-pro-const",
            Self::ConCx => "divider-con-cx",
            Self::ConConstructive => "divider-con-const",
            Self::ProCx => "divider-pro-cx",
            Self::Rebuttal => "divider-rebuttal",
        }
    }

    fn side(&self) -> Side {
        match self {
            Self::ProConstructive | Self::ProCx => Side::Pro,
            Self::ConCx | Self::ConConstructive | Self::Rebuttal => Side::Con,
        }
    }

    fn label<'a>(&self, labels: &'a TimelineLabels) -> &'a str {
        match self {
            Self::ProConstructive => &labels.arguing_pro,
            Self::ConCx => &labels.cx_con,
            Self::ConConstructive => &labels.arguing_con,
            Self::ProCx => &labels.cx_pro,
            Self::Rebuttal => &labels.rebuttal_con,
        }
    }
}

struct Projector<'a> {
    labels: &'a TimelineLabels,
    items: Vec<TimelineItem>,
    dividers: HashSet<PhaseDivider>,
}

impl<'a> Projector<'a> {
    fn divider(&mut self, phase: PhaseDivider) {
        if self.dividers.insert(phase) {
            self.items.push(TimelineItem::new(
                phase.id(),
                TimelineItemKind::Divider,
                phase.side(),
                phase.label(self.labels),
            ));
        }
    }

    fn speech(&mut self, speech: &SpeechDraft, side: Side) {
        let prefix = side.as_str();
        if let Some(intro) = &speech.introduction {
            let mut item = TimelineItem::new(
                format!("{prefix}-intro"),
                TimelineItemKind::Intro,
                side,
                format!("{}\n\n{}", intro.definitions, intro.roadmap),
            )
            .with_title(INTRO_TITLE);
            item.meta = Some(IntroMeta {
                value: intro.value_criterion.clone(),
                hook: intro.hook.clone(),
            });
            self.items.push(item);
        }

        for (i, contention) in speech.contentions.iter().enumerate() {
            let mut item = TimelineItem::new(
                format!("{prefix}-point-{i}"),
                TimelineItemKind::Argument,
                side,
                contention.reasoning.clone(),
            )
            .with_title(format!("{}: {}", contention.signpost, contention.claim))
            .with_sector(&contention.sector);
            item.evidence = contention.evidence_id.clone();
            self.items.push(item);
        }

        if let Some(conclusion) = &speech.conclusion {
            self.items.push(
                TimelineItem::new(
                    format!("{prefix}-conclusion"),
                    TimelineItemKind::Conclusion,
                    side,
                    conclusion.final_appeal.clone(),
                )
                .with_title(CONCLUSION_TITLE),
            );
        }
    }

    fn cross_exam(&mut self, cross_exam: &CrossExamSet, examiner: Side) {
        let questions = cross_exam.questions(examiner);
        if questions.is_empty() {
            return;
        }
        let (divider, label) = match examiner {
            Side::Con => (PhaseDivider::ConCx, &self.labels.con_question),
            Side::Pro => (PhaseDivider::ProCx, &self.labels.pro_question),
        };
        let label = label.clone();
        self.divider(divider);

        let answerer = examiner.opponent();
        let answers = cross_exam.answers(examiner);
        for (i, question) in questions.iter().enumerate() {
            self.items.push(
                TimelineItem::new(
                    format!("{examiner}-q-{i}"),
                    TimelineItemKind::Question,
                    examiner,
                    question.clone(),
                )
                .with_label(label.clone()),
            );
            if let Some(answer) = answers.get(i).filter(|a| !a.is_empty()) {
                self.items.push(
                    TimelineItem::new(
                        format!("{answerer}-a-{i}"),
                        TimelineItemKind::Answer,
                        answerer,
                        answer.clone(),
                    )
                    .with_label(ANSWER_LABEL),
                );
            }
        }
    }

    fn rebuttals(&mut self, rebuttals: &RebuttalSet) {
        if rebuttals.is_empty() {
            return;
        }
        self.divider(PhaseDivider::Rebuttal);

        let con = rebuttals.turns(Side::Con);
        let pro = rebuttals.turns(Side::Pro);
        for i in 0..con.len().max(pro.len()) {
            for (side, list) in [(Side::Con, con), (Side::Pro, pro)] {
                let Some(turn) = list.get(i) else { continue };
                let mut item = TimelineItem::new(
                    format!("{side}-reb-{i}"),
                    TimelineItemKind::Rebuttal,
                    side,
                    turn.rebuttal.clone(),
                )
                .with_sector(&turn.sector);
                item.defense = Some(turn.defense.clone());
                item.ref_id = Some(turn.target_claim.clone());
                item.evidence = turn.evidence_used.clone();
                self.items.push(item);
            }
        }
    }

    fn main_round(&mut self, arguments: &ProConArguments, cross_exam: &CrossExamSet, rebuttals: &RebuttalSet) {
        if arguments.pro_speech.is_started() {
            self.divider(PhaseDivider::ProConstructive);
            self.speech(&arguments.pro_speech, Side::Pro);
        }
        self.cross_exam(cross_exam, Side::Con);
        if arguments.con_speech.is_started() {
            self.divider(PhaseDivider::ConConstructive);
            self.speech(&arguments.con_speech, Side::Con);
        }
        self.cross_exam(cross_exam, Side::Pro);
        self.rebuttals(rebuttals);
    }

    /// Divider and loading bubble for the phase still being produced.
    fn pending(&mut self, state: &SimulationState, view: TimelineView) {
        let loading = !view.step_ready && !view.paused;
        let typing = if state.is_typing && !state.is_generating_round {
            acting_side(state)
        } else {
            None
        };
        let typing_is = |side: Side| typing == Some(side);
        let args = &state.arguments;
        let cx = &state.cross_exam;

        match state.status {
            SimulationStep::ProConstructive => {
                self.divider(PhaseDivider::ProConstructive);
                if (loading && !args.pro_speech.is_started()) || typing_is(Side::Pro) {
                    self.items.push(TimelineItem::loading("loading-pro", Side::Pro));
                }
            }
            SimulationStep::ConCx => {
                self.divider(PhaseDivider::ConCx);
                if (loading && cx.questions(Side::Con).is_empty()) || typing_is(Side::Con) {
                    self.items.push(TimelineItem::loading("loading-con", Side::Con));
                } else if typing_is(Side::Pro) {
                    self.items.push(TimelineItem::loading("loading-pro", Side::Pro));
                }
            }
            SimulationStep::ConConstructive => {
                self.divider(PhaseDivider::ConConstructive);
                if (loading && !args.con_speech.is_started()) || typing_is(Side::Con) {
                    self.items.push(TimelineItem::loading("loading-con", Side::Con));
                }
            }
            SimulationStep::ProCx => {
                self.divider(PhaseDivider::ProCx);
                if (loading && cx.questions(Side::Pro).is_empty()) || typing_is(Side::Pro) {
                    self.items.push(TimelineItem::loading("loading-pro", Side::Pro));
                } else if typing_is(Side::Con) {
                    self.items.push(TimelineItem::loading("loading-con", Side::Con));
                }
            }
            SimulationStep::Rebuttal => {
                self.divider(PhaseDivider::Rebuttal);
                let con = state.rebuttals.turns(Side::Con).len();
                let pro = state.rebuttals.turns(Side::Pro).len();
                if (loading && con == pro) || typing_is(Side::Con) {
                    self.items.push(TimelineItem::loading("loading-con-reb", Side::Con));
                } else if (loading && con > pro) || typing_is(Side::Pro) {
                    self.items.push(TimelineItem::loading("loading-pro-reb", Side::Pro));
                }
            }
            SimulationStep::Analyzing => {
                if loading {
                    self.items.push(TimelineItem::new(
                        "loading-analyzing",
                        TimelineItemKind::Analyzing,
                        TimelineSide::Center,
                        self.labels.analyzing_loading.clone(),
                    ));
                }
            }
            _ => {}
        }
    }

    fn follow_ups(&mut self, state: &SimulationState) {
        for (i, round) in state.additional_rounds.iter().enumerate() {
            self.items.push(TimelineItem::new(
                format!("divider-qa-{i}"),
                TimelineItemKind::Divider,
                TimelineSide::Center,
                self.labels.follow_up_title.clone(),
            ));
            self.items.push(TimelineItem::new(
                format!("user-query-{i}"),
                TimelineItemKind::UserQuery,
                TimelineSide::User,
                round.focus_topic.clone(),
            ));
            for side in [Side::Pro, Side::Con] {
                if let Some(answer) = round.answer(side).filter(|a| !a.is_empty()) {
                    self.items.push(
                        TimelineItem::new(
                            format!("qa-{side}-{i}"),
                            TimelineItemKind::Answer,
                            side,
                            answer,
                        )
                        .with_label(DIRECT_ANSWER_LABEL),
                    );
                }
            }
        }

        if !state.is_generating_round {
            return;
        }
        match state.latest_round() {
            Some(round) if round.answer(Side::Pro).is_none() => {
                self.items.push(TimelineItem::loading("loading-qa-pro", Side::Pro));
            }
            Some(round) if round.answer(Side::Con).is_none() => {
                self.items.push(TimelineItem::loading("loading-qa-con", Side::Con));
            }
            Some(_) => {}
            None => self
                .items
                .push(TimelineItem::loading("loading-followup", Side::Pro)),
        }
    }
}

/// Project `state` into display order.
pub fn project(
    state: &SimulationState,
    view: TimelineView,
    labels: &TimelineLabels,
) -> Vec<TimelineItem> {
    let mut projector = Projector {
        labels,
        items: Vec::new(),
        dividers: HashSet::new(),
    };

    projector.main_round(&state.arguments, &state.cross_exam, &state.rebuttals);
    if !matches!(
        state.status,
        SimulationStep::Complete | SimulationStep::Error | SimulationStep::Idle
    ) {
        projector.pending(state, view);
    }
    projector.follow_ups(state);
    projector.items
}

#[cfg(test)]
mod tests {
    use debate_core::{Conclusion, Contention, FollowUpRound, Introduction, RebuttalItem};

    use super::*;

    fn ids(items: &[TimelineItem]) -> Vec<&str> {
        items.iter().map(|item| item.id.as_str()).collect()
    }

    fn full_speech(claim: &str) -> SpeechDraft {
        SpeechDraft {
            introduction: Some(Introduction {
                definitions: "Defs".to_string(),
                roadmap: "1. A 2. B".to_string(),
                value_criterion: "Welfare".to_string(),
                hook: "Hook".to_string(),
            }),
            contentions: vec![Contention {
                signpost: "Point 1".to_string(),
                claim: claim.to_string(),
                reasoning: "Because".to_string(),
                evidence_id: vec!["EV-STA-01".to_string()],
                sector: "economic".to_string(),
            }],
            conclusion: Some(Conclusion {
                summary: "Sum".to_string(),
                final_appeal: "Vote".to_string(),
            }),
        }
    }

    fn rebuttal(target: &str) -> RebuttalItem {
        RebuttalItem {
            target_claim: target.to_string(),
            defense: "Defense".to_string(),
            rebuttal: "Attack".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_pending_constructive_shows_loading() {
        let mut state = SimulationState::new();
        state.status = SimulationStep::ProConstructive;

        let items = project(&state, TimelineView::default(), &TimelineLabels::default());
        assert_eq!(ids(&items), vec!["divider-pro-const", "loading-pro"]);

        let paused = TimelineView {
            step_ready: false,
            paused: true,
        };
        let items = project(&state, paused, &TimelineLabels::default());
        assert_eq!(ids(&items), vec!["divider-pro-const"]);
    }

    #[test]
    fn test_revealed_speech_items() {
        let mut state = SimulationState::new();
        state.status = SimulationStep::ProConstructive;
        state.arguments.pro_speech = full_speech("Claim");

        let items = project(&state, TimelineView::default(), &TimelineLabels::default());
        assert_eq!(
            ids(&items),
            vec!["divider-pro-const", "pro-intro", "pro-point-0", "pro-conclusion"]
        );
        assert_eq!(items[1].content, "Defs\n\n1. A 2. B");
        assert_eq!(items[2].title.as_deref(), Some("Point 1: Claim"));
        assert_eq!(items[2].evidence, vec!["EV-STA-01"]);
        assert_eq!(items[1].meta.as_ref().map(|m| m.value.as_str()), Some("Welfare"));
    }

    #[test]
    fn test_cross_exam_answer_typing_bubble() {
        let mut state = SimulationState::new();
        state.status = SimulationStep::ConCx;
        state.arguments.pro_speech = full_speech("Claim");
        state.cross_exam.questions_mut(Side::Con).push("Source?".to_string());
        state.is_typing = true;

        let items = project(&state, TimelineView::default(), &TimelineLabels::default());
        let tail: Vec<_> = ids(&items).into_iter().rev().take(3).collect();
        assert_eq!(tail, vec!["loading-pro", "con-q-0", "divider-con-cx"]);
    }

    #[test]
    fn test_rebuttals_interleave_con_first() {
        let mut state = SimulationState::new();
        state.status = SimulationStep::Rebuttal;
        state.rebuttals.turns_mut(Side::Con).push(rebuttal("Pro claim"));
        state.rebuttals.turns_mut(Side::Pro).push(rebuttal("Con claim"));
        state.rebuttals.turns_mut(Side::Con).push(rebuttal("Pro claim 2"));

        let items = project(&state, TimelineView::default(), &TimelineLabels::default());
        assert_eq!(
            ids(&items),
            vec!["divider-rebuttal", "con-reb-0", "pro-reb-0", "con-reb-1", "loading-pro-reb"]
        );
        assert_eq!(items[2].ref_id.as_deref(), Some("Con claim"));
    }

    #[test]
    fn test_step_ready_hides_loading() {
        let mut state = SimulationState::new();
        state.status = SimulationStep::Rebuttal;
        let ready = TimelineView {
            step_ready: true,
            paused: false,
        };
        let items = project(&state, ready, &TimelineLabels::default());
        assert_eq!(ids(&items), vec!["divider-rebuttal"]);
    }

    #[test]
    fn test_follow_up_rounds_after_main_debate() {
        let mut state = SimulationState::new();
        state.status = SimulationStep::Complete;
        state.arguments.pro_speech = full_speech("Claim");
        let mut round = FollowUpRound::new("Costs?");
        round.pro_answer = Some("They fall.".to_string());
        state.additional_rounds.push(round);
        state.is_generating_round = true;

        let items = project(&state, TimelineView::default(), &TimelineLabels::default());
        let tail: Vec<_> = ids(&items).into_iter().skip(4).collect();
        assert_eq!(
            tail,
            vec!["divider-qa-0", "user-query-0", "qa-pro-0", "loading-qa-con"]
        );
        assert_eq!(items[4].side, TimelineSide::Center);
    }

    #[test]
    fn test_research_phases_project_nothing() {
        for status in [SimulationStep::Researching, SimulationStep::ResearchCompleted] {
            let mut state = SimulationState::new();
            state.status = status;
            let items = project(&state, TimelineView::default(), &TimelineLabels::default());
            assert!(items.is_empty(), "{status} projected {items:?}");
        }
    }

    #[test]
    fn test_analyzing_placeholder() {
        let mut state = SimulationState::new();
        state.status = SimulationStep::Analyzing;
        let labels = TimelineLabels::default();
        let items = project(&state, TimelineView::default(), &labels);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, TimelineItemKind::Analyzing);
        assert_eq!(items[0].content, labels.analyzing_loading);
    }

    #[test]
    fn test_projection_is_deterministic_and_append_only() {
        let mut state = SimulationState::new();
        state.status = SimulationStep::ConConstructive;
        state.arguments.pro_speech = full_speech("Claim");
        state.cross_exam.questions_mut(Side::Con).push("Q".to_string());
        state.cross_exam.answers_mut(Side::Con).push("A".to_string());
        let view = TimelineView {
            step_ready: true,
            paused: false,
        };
        let labels = TimelineLabels::default();

        let before = project(&state, view, &labels);
        assert_eq!(before, project(&state, view, &labels));

        state.arguments.con_speech.introduction = Some(Introduction::default());
        let after = project(&state, view, &labels);
        assert_eq!(&after[..before.len()], &before[..]);
        assert_eq!(after.last().map(|i| i.id.as_str()), Some("con-intro"));
    }
}
