//! State updates as data.
//!
//! Every mutation of [`SimulationState`] is an [`Action`] applied by
//! [`reduce`], a total function from (state, action) to the next state.
//! Phase changes are validated by the store before they get here.

use debate_core::{
    pending_sectors, ChatMessage, Conclusion, Contention, CrossExamSet, EvidenceItem, FollowUpRound,
    FramedIssue, Introduction, IssueRefinement, MetaAnalysis, ProConArguments, RebuttalItem,
    RebuttalSet, Sector, SectorStatus, Side, SimulationState, SimulationStep,
};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Back to a pristine idle state.
    Reset,
    SetTopic(String),
    /// Framing produced a draft; the chat opens with one welcome message.
    FramingDrafted { issue: FramedIssue, welcome: String },
    RefinementRequested(String),
    RefinementApplied(IssueRefinement),
    EditIssue(FramedIssue),
    SectorDispatched(Sector),
    SectorCompleted {
        sector: Sector,
        evidence: Vec<EvidenceItem>,
    },
    /// Move to a new phase, clearing whatever that phase regenerates.
    EnterPhase(SimulationStep),
    SetTyping(bool),
    RevealIntroduction {
        side: Side,
        introduction: Introduction,
    },
    RevealContention {
        side: Side,
        contention: Contention,
    },
    RevealConclusion {
        side: Side,
        conclusion: Conclusion,
    },
    RevealQuestion {
        examiner: Side,
        question: String,
    },
    /// Ignored unless the paired question is already revealed.
    RevealAnswer {
        examiner: Side,
        answer: String,
    },
    CrossExamSettled(CrossExamSet),
    RevealRebuttal {
        side: Side,
        item: RebuttalItem,
    },
    AnalysisReady(MetaAnalysis),
    Failed(String),
    FollowUpOpened(FollowUpRound),
    FollowUpAnswer {
        round_id: Uuid,
        side: Side,
        answer: String,
    },
    FollowUpSettled,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::SetTopic(_) => "set_topic",
            Self::FramingDrafted { .. } => "framing_drafted",
            Self::RefinementRequested(_) => "refinement_requested",
            Self::RefinementApplied(_) => "refinement_applied",
            Self::EditIssue(_) => "edit_issue",
            Self::SectorDispatched(_) => "sector_dispatched",
            Self::SectorCompleted { .. } => "sector_completed",
            Self::EnterPhase(_) => "enter_phase",
            Self::SetTyping(_) => "set_typing",
            Self::RevealIntroduction { .. } => "reveal_introduction",
            Self::RevealContention { .. } => "reveal_contention",
            Self::RevealConclusion { .. } => "reveal_conclusion",
            Self::RevealQuestion { .. } => "reveal_question",
            Self::RevealAnswer { .. } => "reveal_answer",
            Self::CrossExamSettled(_) => "cross_exam_settled",
            Self::RevealRebuttal { .. } => "reveal_rebuttal",
            Self::AnalysisReady(_) => "analysis_ready",
            Self::Failed(_) => "failed",
            Self::FollowUpOpened(_) => "follow_up_opened",
            Self::FollowUpAnswer { .. } => "follow_up_answer",
            Self::FollowUpSettled => "follow_up_settled",
        }
    }
}

pub fn reduce(mut state: SimulationState, action: Action) -> SimulationState {
    match action {
        Action::Reset => return SimulationState::new(),

        Action::SetTopic(topic) => state.original_topic = topic,

        Action::FramingDrafted { issue, welcome } => {
            state.framed_issue = Some(issue);
            state.framing_chat = vec![ChatMessage::model(welcome)];
        }

        Action::RefinementRequested(feedback) => {
            state.framing_chat.push(ChatMessage::user(feedback));
        }

        Action::RefinementApplied(refinement) => {
            state.framed_issue = Some(refinement.draft);
            state.framing_chat.push(ChatMessage::model(refinement.message));
        }

        Action::EditIssue(issue) => state.framed_issue = Some(issue),

        Action::SectorDispatched(sector) => advance_sector(&mut state, sector, SectorStatus::Loading),

        Action::SectorCompleted { sector, evidence } => {
            if state.sector_status(sector) == SectorStatus::Loading {
                state.evidence_board.extend(evidence);
            }
            advance_sector(&mut state, sector, SectorStatus::Completed);
        }

        Action::EnterPhase(step) => enter_phase(&mut state, step),

        Action::SetTyping(active) => state.is_typing = active,

        Action::RevealIntroduction { side, introduction } => {
            state.arguments.speech_mut(side).introduction = Some(introduction);
        }

        Action::RevealContention { side, contention } => {
            state.arguments.speech_mut(side).contentions.push(contention);
        }

        Action::RevealConclusion { side, conclusion } => {
            state.arguments.speech_mut(side).conclusion = Some(conclusion);
        }

        Action::RevealQuestion { examiner, question } => {
            state.cross_exam.questions_mut(examiner).push(question);
        }

        Action::RevealAnswer { examiner, answer } => {
            let asked = state.cross_exam.questions(examiner).len();
            let answers = state.cross_exam.answers_mut(examiner);
            if answers.len() < asked {
                answers.push(answer);
            } else {
                debug!(examiner = %examiner, asked, "Dropping answer without a question");
            }
        }

        Action::CrossExamSettled(cross_exam) => state.cross_exam = cross_exam,

        Action::RevealRebuttal { side, item } => state.rebuttals.turns_mut(side).push(item),

        Action::AnalysisReady(analysis) => state.analysis = Some(analysis),

        Action::Failed(message) => {
            state.error = Some(message);
            state.is_typing = false;
            state.is_generating_round = false;
        }

        Action::FollowUpOpened(round) => {
            state.additional_rounds.push(round);
            state.is_generating_round = true;
        }

        Action::FollowUpAnswer {
            round_id,
            side,
            answer,
        } => {
            if let Some(round) = state
                .additional_rounds
                .iter_mut()
                .find(|round| round.id == round_id)
            {
                *round.answer_mut(side) = Some(answer);
            }
        }

        Action::FollowUpSettled => {
            state.is_generating_round = false;
            state.is_typing = false;
        }
    }
    state
}

fn advance_sector(state: &mut SimulationState, sector: Sector, next: SectorStatus) {
    let current = state.sector_status(sector);
    if current.can_advance_to(next) {
        state.sector_statuses.insert(sector, next);
    } else {
        debug!(sector = %sector, from = current.as_str(), to = next.as_str(), "Ignoring sector regression");
    }
}

fn enter_phase(state: &mut SimulationState, step: SimulationStep) {
    match step {
        SimulationStep::Framing => {
            state.error = None;
            state.framing_chat.clear();
            state.additional_rounds.clear();
            state.sector_statuses = pending_sectors();
        }
        SimulationStep::Researching => {
            state.evidence_board.clear();
            state.sector_statuses = pending_sectors();
        }
        SimulationStep::ProConstructive => {
            state.arguments = ProConArguments::default();
            state.cross_exam = CrossExamSet::default();
            state.rebuttals = RebuttalSet::default();
            state.analysis = None;
        }
        _ => {}
    }
    state.status = step;
    state.is_typing = false;
}
