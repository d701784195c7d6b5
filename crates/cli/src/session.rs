//! Interactive terminal session driving one simulation end to end.

use std::sync::Arc;

use agents::{AgentRoster, OpenRouterClient};
use anyhow::{Context, Result};
use colored::Colorize;
use events::Event;
use orchestrator::{GateStatus, OrchestratorError, SimulationDriver, TimelineLabels};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{SimulatorConfig, API_KEY_ENV};
use crate::render::{print_analysis, print_evidence, print_issue, TimelinePrinter};

type StdinLines = Lines<BufReader<Stdin>>;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub topic: String,
    pub auto: bool,
    pub yes: bool,
    pub follow_ups: Vec<String>,
}

/// Control keys accepted while the debate runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Next,
    Pause,
    AutoPlay,
    Quit,
}

impl Control {
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "n" | "next" | "" => Some(Self::Next),
            "p" | "pause" => Some(Self::Pause),
            "a" | "auto" => Some(Self::AutoPlay),
            "q" | "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

pub async fn run(options: RunOptions, config: SimulatorConfig) -> Result<()> {
    let api_key = std::env::var(API_KEY_ENV)
        .with_context(|| format!("{API_KEY_ENV} must be set to call OpenRouter"))?;
    let client = OpenRouterClient::new(api_key, &config.api_base_url);
    let roster = AgentRoster::new(client, config.agent_config());
    let driver = Arc::new(SimulationDriver::new(
        Arc::new(roster),
        config.driver_config(),
    ));

    let event_log = spawn_event_log(&driver);
    let outcome = drive(&driver, &options).await;
    event_log.abort();

    match outcome {
        Err(e) if is_cancelled(&e) => {
            println!("{}", "Simulation reset.".yellow());
            Ok(())
        }
        Err(e) => {
            if let Some(message) = driver.snapshot().error {
                eprintln!("{} {}", "Simulation failed:".red().bold(), message);
            }
            Err(e)
        }
        ok => ok,
    }
}

fn is_cancelled(err: &anyhow::Error) -> bool {
    err.downcast_ref::<OrchestratorError>()
        .is_some_and(OrchestratorError::is_cancelled)
}

async fn drive(driver: &Arc<SimulationDriver>, options: &RunOptions) -> Result<()> {
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    driver.set_topic(&options.topic)?;
    println!("{} {}", "Framing".bold(), options.topic);
    driver.start().await?;
    confirm_issue(driver, &mut stdin, options.yes).await?;

    println!("{}", "Researching all sectors...".dimmed());
    driver.confirm(None).await?;
    print_evidence(&driver.snapshot().evidence_board);

    if options.auto {
        driver.toggle_auto_play();
    }
    println!();
    println!(
        "{}",
        "Controls: [Enter/n] next  [p] pause  [a] auto-play  [q] quit".dimmed()
    );

    let (stop_tx, renderer) = spawn_renderer(Arc::clone(driver));
    let controls = spawn_controls(Arc::clone(driver), stdin);
    let outcome = driver.start_debate().await;
    let _ = stop_tx.send(());
    renderer.await?;
    controls.abort();
    outcome?;

    for question in &options.follow_ups {
        let (stop_tx, renderer) = spawn_renderer(Arc::clone(driver));
        let outcome = driver.follow_up(question.clone()).await;
        let _ = stop_tx.send(());
        renderer.await?;
        outcome?;
    }

    if let Some(analysis) = driver.snapshot().analysis {
        print_analysis(&analysis);
    }
    Ok(())
}

async fn confirm_issue(
    driver: &SimulationDriver,
    stdin: &mut StdinLines,
    auto_confirm: bool,
) -> Result<()> {
    for message in driver.snapshot().framing_chat {
        println!("{} {}", "Moderator:".bold(), message.text);
    }
    loop {
        if let Some(issue) = driver.snapshot().framed_issue {
            print_issue(&issue);
        }
        if auto_confirm {
            return Ok(());
        }

        println!();
        println!("{}", "Press Enter to confirm, or type feedback to refine:".dimmed());
        let Some(line) = stdin.next_line().await? else {
            return Ok(());
        };
        let line = line.trim();
        if line.is_empty() || line.eq_ignore_ascii_case("y") {
            return Ok(());
        }

        driver.refine(line).await?;
        if let Some(reply) = driver.snapshot().framing_chat.last() {
            println!("{} {}", "Moderator:".bold(), reply.text);
        }
    }
}

/// Print new timeline items whenever the state or the gate changes until
/// told to stop.
fn spawn_renderer(driver: Arc<SimulationDriver>) -> (oneshot::Sender<()>, JoinHandle<()>) {
    let (stop_tx, mut stop_rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        let labels = TimelineLabels::default();
        let mut states = driver.subscribe();
        let mut gate = driver.watch_gate();
        let mut printer = TimelinePrinter::default();
        let mut was_ready = false;
        // Items from earlier phases are already on screen.
        let _ = printer.render_new(&driver.timeline(&labels));
        loop {
            tokio::select! {
                changed = states.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = gate.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let status = gate.status();
                    if prompts_for_next(was_ready, status) {
                        println!("{}", "Ready. [Enter] to continue.".dimmed());
                    }
                    was_ready = status.step_ready;
                }
                _ = &mut stop_rx => {
                    printer.print_new(&driver.timeline(&labels));
                    break;
                }
            }
            printer.print_new(&driver.timeline(&labels));
        }
    });
    (stop_tx, handle)
}

/// Prompt once when a checkpoint opens and nothing will release it alone.
fn prompts_for_next(was_ready: bool, status: GateStatus) -> bool {
    status.step_ready && !was_ready && !status.auto_play
}

/// Mirror driver events into the log until aborted.
fn spawn_event_log(driver: &SimulationDriver) -> JoinHandle<()> {
    let mut events = driver.events();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(envelope) => log_event(envelope.sequence, &envelope.event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Event log fell behind");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

fn log_event(sequence: u64, event: &Event) {
    match event {
        Event::PhaseChanged { from, to, .. } => debug!(sequence, %from, %to, "Phase changed"),
        Event::SectorStatusChanged { sector, status, .. } => {
            debug!(sequence, %sector, %status, "Sector status")
        }
        Event::EvidenceAdded { sector, count, .. } => {
            info!(sequence, %sector, count, "Evidence added")
        }
        Event::GateReleased { reason, .. } => info!(sequence, %reason, "Checkpoint released"),
        Event::SimulationFailed { phase, message, .. } => {
            warn!(sequence, %phase, %message, "Simulation failed")
        }
        _ => {}
    }
}

fn spawn_controls(driver: Arc<SimulationDriver>, mut stdin: StdinLines) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Ok(Some(line)) = stdin.next_line().await {
            match Control::parse(&line) {
                Some(Control::Next) => {
                    if !driver.trigger_next() {
                        println!("{}", "Nothing to advance yet.".dimmed());
                    }
                }
                Some(Control::Pause) => {
                    let paused = driver.toggle_pause();
                    let note = if paused { "Paused." } else { "Resumed." };
                    println!("{}", note.dimmed());
                }
                Some(Control::AutoPlay) => {
                    let enabled = driver.toggle_auto_play();
                    let note = if enabled { "Auto-play on." } else { "Auto-play off." };
                    println!("{}", note.dimmed());
                }
                Some(Control::Quit) => {
                    driver.reset();
                    break;
                }
                None => println!("{}", "Unknown command.".dimmed()),
            }
        }
    })
}
