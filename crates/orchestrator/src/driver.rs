use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use agents::{AgentResult, AnalysisRequest, CrossExamRequest, DebateAgents, RebuttalRequest};
use debate_core::{
    ConstructiveSpeech, CrossExamSet, CrossExamination, EvidenceItem, FollowUpRound, FramedIssue,
    ProConArguments, RebuttalSet, Sector, SectorStatus, Side, SimulationState, SimulationStep,
    SpeechDraft,
};
use events::{Event, EventBus, EventEnvelope};
use futures::future::join_all;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::cancel::RunToken;
use crate::checkpoint::{CheckpointGate, GateStatus, GateWatch};
use crate::config::DriverConfig;
use crate::emitter::OrderedEventEmitter;
use crate::error::{OrchestratorError, Result};
use crate::reducer::Action;
use crate::store::SimulationStore;
use crate::timeline::{project, TimelineItem, TimelineLabels, TimelineView};
use crate::turn::{rebuttal_speaker, rebuttals_finished};

/// Runs one simulation at a time through framing, research and the debate.
///
/// Control operations are the only way state changes. Each async operation
/// runs under the current [`RunToken`]; [`reset`](Self::reset) cancels it,
/// which turns every pending delay, capability call and checkpoint of the
/// old run into [`OrchestratorError::Cancelled`].
pub struct SimulationDriver {
    store: SimulationStore,
    gate: CheckpointGate,
    emitter: OrderedEventEmitter,
    agents: Arc<dyn DebateAgents>,
    config: DriverConfig,
    run: Mutex<RunToken>,
}

async fn call<T>(token: &RunToken, work: impl Future<Output = AgentResult<T>>) -> Result<T> {
    Ok(token.guard(work).await??)
}

impl SimulationDriver {
    pub fn new(agents: Arc<dyn DebateAgents>, config: DriverConfig) -> Self {
        Self {
            store: SimulationStore::new(),
            gate: CheckpointGate::new(config.pacing.auto_advance),
            emitter: OrderedEventEmitter::default(),
            agents,
            config,
            run: Mutex::new(RunToken::new()),
        }
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.emitter = OrderedEventEmitter::new(bus);
        self
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn run_id(&self) -> Uuid {
        self.token().id()
    }

    fn token(&self) -> RunToken {
        self.run
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // Observers

    pub fn snapshot(&self) -> SimulationState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<SimulationState> {
        self.store.subscribe()
    }

    pub fn gate_status(&self) -> GateStatus {
        self.gate.status()
    }

    pub fn watch_gate(&self) -> GateWatch {
        self.gate.watch()
    }

    pub fn timeline(&self, labels: &TimelineLabels) -> Vec<TimelineItem> {
        let gate = self.gate.status();
        let view = TimelineView {
            step_ready: gate.step_ready,
            paused: gate.paused,
        };
        project(&self.store.snapshot(), view, labels)
    }

    pub fn events(&self) -> broadcast::Receiver<EventEnvelope> {
        self.emitter.subscribe()
    }

    // Gate controls

    pub fn toggle_auto_play(&self) -> bool {
        let enabled = self.gate.toggle_auto_play();
        info!(auto_play = enabled, "Auto-play toggled");
        enabled
    }

    pub fn toggle_pause(&self) -> bool {
        let paused = self.gate.toggle_pause();
        info!(paused, "Pause toggled");
        paused
    }

    /// Release the pending checkpoint. Returns false when none is pending.
    pub fn trigger_next(&self) -> bool {
        self.gate.trigger_next()
    }

    /// Abort the current run and return to a pristine idle state.
    pub fn reset(&self) {
        let old = {
            let mut run = self.run.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *run, RunToken::new())
        };
        old.cancel();
        self.gate.reset();
        self.store.reset();
        self.emitter.emit(Event::SimulationReset { run_id: old.id() });
        info!(run_id = %old.id(), "Simulation reset");
    }

    // Framing

    /// Set the topic to frame. Any run in progress is reset first.
    pub fn set_topic(&self, topic: impl Into<String>) -> Result<()> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(OrchestratorError::InvalidInput(
                "topic must not be empty".to_string(),
            ));
        }
        if self.store.status() != SimulationStep::Idle {
            self.reset();
        }
        self.store.dispatch(&self.token(), Action::SetTopic(topic))
    }

    /// Frame the topic into a neutral issue and wait for confirmation.
    pub async fn start(&self) -> Result<()> {
        let token = self.token();
        let topic = self.store.read(|s| s.original_topic.clone());
        if topic.trim().is_empty() {
            return Err(OrchestratorError::InvalidInput(
                "set a topic before starting".to_string(),
            ));
        }
        self.enter(&token, SimulationStep::Framing)?;

        self.guarded(&token, async {
            let issue = call(&token, self.agents.frame_issue(&topic)).await?;
            info!(issue = %issue.refined_issue, "Issue framed");
            self.store.dispatch(
                &token,
                Action::FramingDrafted {
                    issue,
                    welcome: self.config.welcome(),
                },
            )?;
            self.enter(&token, SimulationStep::WaitingConfirmation)
        })
        .await
    }

    /// One refinement cycle driven by user feedback on the draft.
    pub async fn refine(&self, feedback: impl Into<String>) -> Result<()> {
        let feedback = feedback.into();
        if feedback.trim().is_empty() {
            return Err(OrchestratorError::InvalidInput(
                "feedback must not be empty".to_string(),
            ));
        }
        let token = self.token();
        let draft = self.framed_issue(SimulationStep::Refining)?;
        self.enter(&token, SimulationStep::Refining)?;
        self.store
            .dispatch(&token, Action::RefinementRequested(feedback))?;

        self.guarded(&token, async {
            let history = self.store.read(|s| s.framing_chat.clone());
            let refinement = call(&token, self.agents.refine_issue(&history, &draft)).await?;
            self.store
                .dispatch(&token, Action::RefinementApplied(refinement))?;
            self.enter(&token, SimulationStep::WaitingConfirmation)
        })
        .await
    }

    /// Replace the draft with a user-edited one.
    pub fn edit_issue(&self, issue: FramedIssue) -> Result<()> {
        let status = self.store.status();
        if status != SimulationStep::WaitingConfirmation {
            return Err(OrchestratorError::InvalidInput(format!(
                "the issue can only be edited while waiting for confirmation, not in {status}"
            )));
        }
        if !issue.is_usable() {
            return Err(OrchestratorError::InvalidInput(
                "the refined issue must not be empty".to_string(),
            ));
        }
        self.store.dispatch(&self.token(), Action::EditIssue(issue))
    }

    /// Accept the draft, optionally edited, and run research.
    pub async fn confirm(&self, edited: Option<FramedIssue>) -> Result<()> {
        if let Some(issue) = edited {
            self.edit_issue(issue)?;
        }
        self.start_research().await
    }

    // Research

    /// Research every sector concurrently. A failing sector is logged and
    /// completes empty; the phase ends once all sectors have settled.
    pub async fn start_research(&self) -> Result<()> {
        let token = self.token();
        let issue = self.framed_issue(SimulationStep::Researching)?;
        self.enter(&token, SimulationStep::Researching)?;

        self.guarded(&token, async {
            let sectors = Sector::ALL
                .into_iter()
                .map(|sector| self.research_sector(&token, &issue, sector));
            join_all(sectors)
                .await
                .into_iter()
                .collect::<Result<Vec<()>>>()?;

            token.check()?;
            let total = self.store.read(|s| s.evidence_board.len());
            info!(evidence = total, "Research completed");
            self.enter(&token, SimulationStep::ResearchCompleted)
        })
        .await
    }

    async fn research_sector(
        &self,
        token: &RunToken,
        issue: &FramedIssue,
        sector: Sector,
    ) -> Result<()> {
        self.store.dispatch(token, Action::SectorDispatched(sector))?;
        self.sector_event(token, sector, SectorStatus::Loading);

        let evidence = match call(token, self.agents.research_sector(issue, sector)).await {
            Ok(evidence) => evidence,
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                warn!(sector = %sector, error = %e, "Sector research failed, continuing without it");
                Vec::new()
            }
        };

        let count = evidence.len();
        self.store
            .dispatch(token, Action::SectorCompleted { sector, evidence })?;
        self.sector_event(token, sector, SectorStatus::Completed);
        if count > 0 {
            self.emitter.emit(Event::EvidenceAdded {
                run_id: token.id(),
                sector: sector.to_string(),
                count,
            });
        }
        debug!(sector = %sector, count, "Sector settled");
        Ok(())
    }

    fn sector_event(&self, token: &RunToken, sector: Sector, status: SectorStatus) {
        self.emitter.emit(Event::SectorStatusChanged {
            run_id: token.id(),
            sector: sector.to_string(),
            status: status.as_str().to_string(),
        });
    }

    // Debate

    /// Run the paced debate from the first constructive to the analysis.
    pub async fn start_debate(&self) -> Result<()> {
        let token = self.token();
        let issue = self.framed_issue(SimulationStep::ProConstructive)?;
        let evidence = self.store.read(|s| s.evidence_board.clone());
        self.enter(&token, SimulationStep::ProConstructive)?;
        self.gate.resume();

        self.guarded(&token, self.run_debate(&token, &issue, &evidence))
            .await
    }

    async fn run_debate(
        &self,
        token: &RunToken,
        issue: &FramedIssue,
        evidence: &[EvidenceItem],
    ) -> Result<()> {
        let pro = call(
            token,
            self.agents.constructive_speech(Side::Pro, issue, evidence),
        )
        .await?;
        let pro_speech = self
            .reveal_speech(token, Side::Pro, SimulationStep::ProConstructive, pro)
            .await?;

        self.enter(token, SimulationStep::ConCx)?;
        self.checkpoint(token).await?;
        let con_cx = call(
            token,
            self.agents.cross_examine(CrossExamRequest {
                examiner: Side::Con,
                target_speech: &pro_speech,
                own_speech: None,
                evidence,
            }),
        )
        .await?;
        self.reveal_cross_exam(token, SimulationStep::ConCx, &con_cx)
            .await?;

        self.enter(token, SimulationStep::ConConstructive)?;
        self.checkpoint(token).await?;
        let con = call(
            token,
            self.agents.constructive_speech(Side::Con, issue, evidence),
        )
        .await?;
        let con_speech = self
            .reveal_speech(token, Side::Con, SimulationStep::ConConstructive, con)
            .await?;

        self.enter(token, SimulationStep::ProCx)?;
        self.checkpoint(token).await?;
        let pro_cx = call(
            token,
            self.agents.cross_examine(CrossExamRequest {
                examiner: Side::Pro,
                target_speech: &con_speech,
                own_speech: Some(&pro_speech),
                evidence,
            }),
        )
        .await?;
        self.reveal_cross_exam(token, SimulationStep::ProCx, &pro_cx)
            .await?;

        let cross_exam = CrossExamSet {
            con_questions: con_cx.questions,
            pro_answers: con_cx.answers,
            pro_questions: pro_cx.questions,
            con_answers: pro_cx.answers,
        };
        self.store
            .dispatch(token, Action::CrossExamSettled(cross_exam.clone()))?;

        self.enter(token, SimulationStep::Rebuttal)?;
        self.checkpoint(token).await?;
        let speeches = ProConArguments {
            pro_speech,
            con_speech,
        };
        let rebuttals = self
            .run_rebuttals(token, issue, evidence, &speeches)
            .await?;

        self.enter(token, SimulationStep::Analyzing)?;
        token.sleep(self.config.pacing.analysis_lead).await?;
        let analysis = call(
            token,
            self.agents.analyze(AnalysisRequest {
                issue,
                evidence,
                speeches: &speeches,
                rebuttals: &rebuttals,
                cross_exam: &cross_exam,
            }),
        )
        .await?;
        self.store.dispatch(token, Action::AnalysisReady(analysis))?;
        self.enter(token, SimulationStep::Complete)?;
        self.gate.resume();
        Ok(())
    }

    /// Alternate con and pro turns, each answering the opponent's latest.
    async fn run_rebuttals(
        &self,
        token: &RunToken,
        issue: &FramedIssue,
        evidence: &[EvidenceItem],
        speeches: &ProConArguments,
    ) -> Result<RebuttalSet> {
        let mut history = RebuttalSet::default();
        while !rebuttals_finished(&history) {
            let side = rebuttal_speaker(&history);
            let turn_index = history.turns(side).len();
            let request = RebuttalRequest {
                side,
                issue,
                evidence,
                speeches,
                history: &history,
                last_opponent: history.turns(side.opponent()).last(),
                turn_index,
            };
            let item = call(token, self.agents.rebuttal_turn(request)).await?;
            debug!(side = %side, turn = turn_index, target = %item.target_claim, "Rebuttal generated");

            history.turns_mut(side).push(item.clone());
            self.reveal(
                token,
                side,
                SimulationStep::Rebuttal,
                format!("{side}-reb-{turn_index}"),
                Action::RevealRebuttal { side, item },
            )
            .await?;
            self.checkpoint(token).await?;
        }
        Ok(history)
    }

    async fn reveal_speech(
        &self,
        token: &RunToken,
        side: Side,
        phase: SimulationStep,
        speech: ConstructiveSpeech,
    ) -> Result<SpeechDraft> {
        let full = SpeechDraft::from(speech.clone());
        let ConstructiveSpeech {
            introduction,
            contentions,
            conclusion,
        } = speech;

        self.reveal(
            token,
            side,
            phase,
            format!("{side}-intro"),
            Action::RevealIntroduction { side, introduction },
        )
        .await?;
        for (i, contention) in contentions.into_iter().enumerate() {
            self.reveal(
                token,
                side,
                phase,
                format!("{side}-point-{i}"),
                Action::RevealContention { side, contention },
            )
            .await?;
        }
        self.reveal(
            token,
            side,
            phase,
            format!("{side}-conclusion"),
            Action::RevealConclusion { side, conclusion },
        )
        .await?;
        Ok(full)
    }

    /// Question `i`, then its answer if one was generated, then `i + 1`.
    async fn reveal_cross_exam(
        &self,
        token: &RunToken,
        phase: SimulationStep,
        exchange: &CrossExamination,
    ) -> Result<()> {
        let examiner = exchange.examiner;
        let answerer = examiner.opponent();
        for (i, question) in exchange.questions.iter().enumerate() {
            self.reveal(
                token,
                examiner,
                phase,
                format!("{examiner}-q-{i}"),
                Action::RevealQuestion {
                    examiner,
                    question: question.clone(),
                },
            )
            .await?;
            if let Some(answer) = exchange.answers.get(i) {
                self.reveal(
                    token,
                    answerer,
                    phase,
                    format!("{answerer}-a-{i}"),
                    Action::RevealAnswer {
                        examiner,
                        answer: answer.clone(),
                    },
                )
                .await?;
            }
        }
        Ok(())
    }

    // Follow-up

    /// Ask both sides a question after the debate. Answers are generated
    /// concurrently and revealed pro first.
    pub async fn follow_up(&self, question: impl Into<String>) -> Result<()> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(OrchestratorError::InvalidInput(
                "question must not be empty".to_string(),
            ));
        }
        let token = self.token();
        let round = FollowUpRound::new(question.clone());
        let round_id = round.id;
        let index = self.store.open_follow_up(&token, round)?;
        self.emitter.emit(Event::FollowUpOpened {
            run_id: token.id(),
            round_id,
            question: question.clone(),
        });

        self.guarded(&token, async {
            let issue = self.framed_issue(SimulationStep::Complete)?;
            let evidence = self.store.read(|s| s.evidence_board.clone());
            let (pro, con) = call(&token, async {
                futures::try_join!(
                    self.agents
                        .answer_question(Side::Pro, &issue, &evidence, &question),
                    self.agents
                        .answer_question(Side::Con, &issue, &evidence, &question),
                )
            })
            .await?;

            for (side, answer) in [(Side::Pro, pro), (Side::Con, con)] {
                self.reveal(
                    &token,
                    side,
                    SimulationStep::Complete,
                    format!("qa-{side}-{index}"),
                    Action::FollowUpAnswer {
                        round_id,
                        side,
                        answer,
                    },
                )
                .await?;
            }

            self.store.dispatch(&token, Action::FollowUpSettled)?;
            self.emitter.emit(Event::FollowUpSettled {
                run_id: token.id(),
                round_id,
            });
            Ok(())
        })
        .await
    }

    // Shared steps

    fn framed_issue(&self, step: SimulationStep) -> Result<FramedIssue> {
        self.store
            .read(|s| s.framed_issue.clone())
            .ok_or_else(|| OrchestratorError::missing("framed issue", step))
    }

    fn enter(&self, token: &RunToken, to: SimulationStep) -> Result<()> {
        let from = self.store.transition(token, to)?;
        info!(run_id = %token.id(), from = %from, to = %to, "Phase changed");
        self.emitter.phase_changed(token.id(), from, to);
        Ok(())
    }

    fn set_typing(&self, token: &RunToken, side: Side, active: bool) -> Result<()> {
        self.store.dispatch(token, Action::SetTyping(active))?;
        self.emitter.typing(token.id(), Some(side), active);
        Ok(())
    }

    /// Typing indicator, then the unit, then time to read it.
    async fn reveal(
        &self,
        token: &RunToken,
        side: Side,
        phase: SimulationStep,
        unit: String,
        action: Action,
    ) -> Result<()> {
        self.set_typing(token, side, true)?;
        token.sleep(self.config.pacing.typing).await?;
        self.set_typing(token, side, false)?;
        self.store.dispatch(token, action)?;
        debug!(phase = %phase, unit = %unit, "Revealed");
        self.emitter.revealed(token.id(), phase, unit);
        token.sleep(self.config.pacing.reading).await
    }

    async fn checkpoint(&self, token: &RunToken) -> Result<()> {
        let phase = self.store.status();
        self.emitter.emit(Event::StepReady {
            run_id: token.id(),
            phase: phase.to_string(),
        });
        let release = self.gate.wait(token).await?;
        token.check()?;
        debug!(phase = %phase, release = release.as_str(), "Checkpoint passed");
        self.emitter.emit(Event::GateReleased {
            run_id: token.id(),
            reason: release.as_str().to_string(),
        });
        Ok(())
    }

    /// Await `work`; a failure other than cancellation stops the run in
    /// `error` with the failure's message.
    async fn guarded<T>(
        &self,
        token: &RunToken,
        work: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let result = work.await;
        if let Err(e) = &result {
            if !e.is_cancelled() {
                self.fail(token, e);
            }
        }
        result
    }

    fn fail(&self, token: &RunToken, err: &OrchestratorError) {
        let phase = self.store.status();
        let message = err.to_string();
        error!(run_id = %token.id(), phase = %phase, error = %message, "Simulation failed");

        let recorded = self
            .store
            .transition(token, SimulationStep::Error)
            .and_then(|_| self.store.dispatch(token, Action::Failed(message.clone())));
        match recorded {
            Ok(()) => {
                self.emitter.emit(Event::SimulationFailed {
                    run_id: token.id(),
                    phase: phase.to_string(),
                    message,
                });
            }
            Err(e) => debug!(error = %e, "Failure not recorded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::FakeAgents;

    fn driver_with(agents: FakeAgents) -> (Arc<SimulationDriver>, Arc<FakeAgents>) {
        let agents = Arc::new(agents);
        let driver = SimulationDriver::new(agents.clone(), DriverConfig::default());
        (Arc::new(driver), agents)
    }

    async fn researched(driver: &SimulationDriver) {
        driver.set_topic("Remote work").unwrap();
        driver.start().await.unwrap();
        driver.confirm(None).await.unwrap();
    }

    fn revealed_units(rx: &mut broadcast::Receiver<EventEnvelope>) -> Vec<String> {
        let mut units = Vec::new();
        while let Ok(envelope) = rx.try_recv() {
            if let Event::Revealed { unit, .. } = envelope.event {
                units.push(unit);
            }
        }
        units
    }

    #[tokio::test(start_paused = true)]
    async fn test_framing_opens_chat_with_welcome() {
        let (driver, _) = driver_with(FakeAgents::default());
        driver.set_topic("Remote work").unwrap();
        driver.start().await.unwrap();

        let state = driver.snapshot();
        assert_eq!(state.status, SimulationStep::WaitingConfirmation);
        assert_eq!(state.framing_chat.len(), 1);
        assert_eq!(state.framing_chat[0].text, driver.config().welcome());
        assert!(state.framed_issue.unwrap().is_usable());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refinement_appends_exchange() {
        let (driver, _) = driver_with(FakeAgents::default());
        driver.set_topic("Remote work").unwrap();
        driver.start().await.unwrap();
        driver.refine("Limit it to Korea").await.unwrap();

        let state = driver.snapshot();
        assert_eq!(state.status, SimulationStep::WaitingConfirmation);
        assert_eq!(state.framing_chat.len(), 3);
        assert_eq!(state.framing_chat[1].text, "Limit it to Korea");
        assert_eq!(state.framed_issue.unwrap().scope.country, "Korea");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_sector_degrades_to_empty() {
        let agents = FakeAgents::default().failing_sector(Sector::Theories);
        let (driver, _) = driver_with(agents);
        researched(&driver).await;

        let state = driver.snapshot();
        assert_eq!(state.status, SimulationStep::ResearchCompleted);
        assert!(state
            .sector_statuses
            .values()
            .all(|status| *status == SectorStatus::Completed));
        assert_eq!(state.evidence_board.len(), 5);
        assert_eq!(state.evidence_in(Sector::Theories).count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirm_with_edited_issue() {
        let (driver, _) = driver_with(FakeAgents::default());
        driver.set_topic("Remote work").unwrap();
        driver.start().await.unwrap();
        driver
            .confirm(Some(FramedIssue::new("Should remote work be a legal right?")))
            .await
            .unwrap();

        let state = driver.snapshot();
        assert_eq!(
            state.framed_issue.unwrap().refined_issue,
            "Should remote work be a legal right?"
        );
        assert_eq!(state.status, SimulationStep::ResearchCompleted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_debate_with_auto_play() {
        let (driver, agents) = driver_with(FakeAgents::default());
        researched(&driver).await;
        let mut events = driver.events();

        driver.toggle_auto_play();
        driver.start_debate().await.unwrap();

        let state = driver.snapshot();
        assert_eq!(state.status, SimulationStep::Complete);
        assert!(state.analysis.is_some());
        assert!(!state.is_typing);
        assert_eq!(state.rebuttals.con_rebuttals.len(), 3);
        assert_eq!(state.rebuttals.pro_rebuttals.len(), 3);
        assert_eq!(state.cross_exam.con_questions.len(), 2);
        assert_eq!(state.cross_exam.pro_answers.len(), 2);
        assert!(state.arguments.pro_speech.is_complete());
        assert!(state.arguments.con_speech.is_complete());

        let units = revealed_units(&mut events);
        assert_eq!(
            &units[..8],
            &[
                "pro-intro",
                "pro-point-0",
                "pro-point-1",
                "pro-conclusion",
                "con-q-0",
                "pro-a-0",
                "con-q-1",
                "pro-a-1",
            ]
        );
        assert_eq!(
            &units[units.len() - 6..],
            &["con-reb-0", "pro-reb-0", "con-reb-1", "pro-reb-1", "con-reb-2", "pro-reb-2"]
        );

        let calls = agents.rebuttal_calls();
        let chain: Vec<_> = calls
            .iter()
            .map(|c| (c.side, c.turn_index, c.last_opponent.as_deref()))
            .collect();
        assert_eq!(
            chain,
            vec![
                (Side::Con, 0, None),
                (Side::Pro, 0, Some("con-0")),
                (Side::Con, 1, Some("pro-0")),
                (Side::Pro, 1, Some("con-1")),
                (Side::Con, 2, Some("pro-1")),
                (Side::Pro, 2, Some("con-2")),
            ]
        );
        assert_eq!(calls[5].history_len, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_gate_holds_until_next() {
        let (driver, _) = driver_with(FakeAgents::default());
        researched(&driver).await;

        let task = {
            let driver = Arc::clone(&driver);
            tokio::spawn(async move { driver.start_debate().await })
        };

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(driver.snapshot().status, SimulationStep::ConCx);
        assert!(driver.gate_status().step_ready);
        assert!(driver.snapshot().cross_exam.con_questions.is_empty());

        assert!(driver.trigger_next());
        tokio::time::sleep(Duration::from_secs(60)).await;
        let state = driver.snapshot();
        assert_eq!(state.status, SimulationStep::ConConstructive);
        assert_eq!(state.cross_exam.pro_answers.len(), 2);

        driver.reset();
        assert!(task.await.unwrap().unwrap_err().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_mid_research_leaves_idle() {
        let agents = FakeAgents::default().with_research_delay(Duration::from_secs(10));
        let (driver, _) = driver_with(agents);
        driver.set_topic("Remote work").unwrap();
        driver.start().await.unwrap();

        let task = {
            let driver = Arc::clone(&driver);
            tokio::spawn(async move { driver.confirm(None).await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        let state = driver.snapshot();
        assert_eq!(state.status, SimulationStep::Researching);
        assert!(state
            .sector_statuses
            .values()
            .all(|status| *status == SectorStatus::Loading));

        driver.reset();
        assert!(task.await.unwrap().unwrap_err().is_cancelled());

        tokio::time::sleep(Duration::from_secs(30)).await;
        let state = driver.snapshot();
        assert_eq!(state, SimulationState::new());
        assert!(state.evidence_board.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_mid_debate_discards_late_results() {
        let agents = FakeAgents::default().with_speech_delay(Duration::from_secs(30));
        let (driver, _) = driver_with(agents);
        researched(&driver).await;
        let mut states = driver.subscribe();

        let task = {
            let driver = Arc::clone(&driver);
            tokio::spawn(async move { driver.start_debate().await })
        };
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(driver.snapshot().status, SimulationStep::ProConstructive);

        driver.reset();
        states.borrow_and_update();
        assert!(task.await.unwrap().unwrap_err().is_cancelled());

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(!states.has_changed().unwrap());
        assert_eq!(driver.snapshot(), SimulationState::new());
        assert!(!driver.gate_status().step_ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capability_failure_moves_to_error() {
        let agents = FakeAgents::default().failing_cross_exam();
        let (driver, _) = driver_with(agents);
        researched(&driver).await;
        driver.toggle_auto_play();

        let err = driver.start_debate().await.unwrap_err();
        assert!(matches!(err, OrchestratorError::Agent(_)));

        let state = driver.snapshot();
        assert_eq!(state.status, SimulationStep::Error);
        assert!(state.error.unwrap().contains("examiner unavailable"));
        assert!(!state.is_typing);
        assert!(state.arguments.pro_speech.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_follow_up_reveals_pro_first() {
        let agents = FakeAgents::default()
            .with_answer_delay(Side::Pro, Duration::from_secs(20))
            .with_answer_delay(Side::Con, Duration::from_millis(10));
        let (driver, _) = driver_with(agents);
        researched(&driver).await;
        driver.toggle_auto_play();
        driver.start_debate().await.unwrap();

        let mut events = driver.events();
        driver.follow_up("What about costs?").await.unwrap();

        assert_eq!(revealed_units(&mut events), vec!["qa-pro-0", "qa-con-0"]);
        let state = driver.snapshot();
        assert!(!state.is_generating_round);
        let round = state.latest_round().unwrap();
        assert_eq!(round.focus_topic, "What about costs?");
        assert_eq!(round.answer(Side::Pro), Some("pro answers: What about costs?"));
        assert_eq!(round.answer(Side::Con), Some("con answers: What about costs?"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_follow_up_failure_moves_to_error() {
        let agents = FakeAgents::default()
            .failing_answer(Side::Con)
            .with_answer_delay(Side::Pro, Duration::from_secs(5));
        let (driver, _) = driver_with(agents);
        researched(&driver).await;
        driver.toggle_auto_play();
        driver.start_debate().await.unwrap();

        let mut events = driver.events();
        let err = driver.follow_up("What about costs?").await.unwrap_err();
        assert!(matches!(err, OrchestratorError::Agent(_)));
        assert!(revealed_units(&mut events).is_empty());

        let state = driver.snapshot();
        assert_eq!(state.status, SimulationStep::Error);
        assert!(state.error.as_ref().unwrap().contains("answer down"));
        assert!(!state.is_generating_round);
        assert!(!state.is_typing);
        let round = state.latest_round().unwrap();
        assert_eq!(round.answer(Side::Pro), None);
        assert_eq!(round.answer(Side::Con), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_follow_up_waits_for_the_first() {
        let agents = FakeAgents::default().with_answer_delay(Side::Pro, Duration::from_secs(20));
        let (driver, _) = driver_with(agents);
        researched(&driver).await;
        driver.toggle_auto_play();
        driver.start_debate().await.unwrap();

        let first = {
            let driver = Arc::clone(&driver);
            tokio::spawn(async move { driver.follow_up("What about costs?").await })
        };
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(driver.snapshot().is_generating_round);

        let err = driver.follow_up("Who loses?").await.unwrap_err();
        assert!(matches!(err, OrchestratorError::InvalidInput(_)));

        first.await.unwrap().unwrap();
        let state = driver.snapshot();
        assert_eq!(state.status, SimulationStep::Complete);
        assert_eq!(state.additional_rounds.len(), 1);
        assert!(!state.is_generating_round);

        driver.follow_up("Who loses?").await.unwrap();
        assert_eq!(driver.snapshot().additional_rounds.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_control_preconditions() {
        let (driver, _) = driver_with(FakeAgents::default());
        assert!(matches!(
            driver.set_topic("   "),
            Err(OrchestratorError::InvalidInput(_))
        ));
        assert!(matches!(
            driver.start().await,
            Err(OrchestratorError::InvalidInput(_))
        ));
        assert!(driver.start_debate().await.is_err());
        assert!(driver.follow_up("Why?").await.is_err());
        assert!(!driver.trigger_next());
        assert_eq!(driver.snapshot().status, SimulationStep::Idle);
        assert!(driver.snapshot().error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_topic_resets_previous_run() {
        let (driver, _) = driver_with(FakeAgents::default());
        researched(&driver).await;
        let old_run = driver.run_id();

        driver.set_topic("Four-day week").unwrap();
        let state = driver.snapshot();
        assert_eq!(state.status, SimulationStep::Idle);
        assert_eq!(state.original_topic, "Four-day week");
        assert!(state.evidence_board.is_empty());
        assert_ne!(driver.run_id(), old_run);
    }
}
