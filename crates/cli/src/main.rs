mod config;
mod render;
mod session;

use anyhow::Result;
use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use debate_core::scoring::{score, EvidenceSignals, MIN_EVIDENCE_SCORE};
use debate_core::{OperationalFit, Sector, SourceTier};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{SimulatorConfig, CONFIG_FILE, SIM_DIR};
use crate::session::RunOptions;

#[derive(Parser)]
#[command(name = "ceda-sim")]
#[command(about = "CEDA-format debate simulator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration into the current directory
    Init,
    /// Frame, research and debate a topic
    Run {
        topic: String,

        /// Advance checkpoints automatically
        #[arg(long)]
        auto: bool,

        /// Accept the first framing without refinement
        #[arg(short, long)]
        yes: bool,

        /// Output language code, overriding the config
        #[arg(long)]
        language: Option<String>,

        /// Question to put to both sides after the debate; repeatable
        #[arg(long = "follow-up")]
        follow_up: Vec<String>,
    },
    /// Print the InfoQ breakdown of a piece of evidence
    Score {
        #[arg(long)]
        has_stats: bool,

        #[arg(long, default_value = "")]
        detail: String,

        /// Publication year, unknown when omitted
        #[arg(long)]
        year: Option<i32>,

        #[arg(long, default_value = "tier3")]
        tier: String,

        #[arg(long, default_value = "weak")]
        fit: String,

        #[arg(long, default_value = "Statistics")]
        sector: String,

        /// Reference year for recency, this year when omitted
        #[arg(long)]
        current_year: Option<i32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init => init_project().await,
        Commands::Run {
            topic,
            auto,
            yes,
            language,
            follow_up,
        } => {
            init_tracing();
            let cwd = std::env::current_dir()?;
            let config = SimulatorConfig::load(&cwd).await?.with_language(language);
            tracing::info!(model = %config.model, language = %config.language, "Starting simulation");
            let options = RunOptions {
                topic,
                auto,
                yes,
                follow_ups: follow_up,
            };
            session::run(options, config).await
        }
        Commands::Score {
            has_stats,
            detail,
            year,
            tier,
            fit,
            sector,
            current_year,
        } => {
            let signals = EvidenceSignals {
                has_stats,
                detail: &detail,
                pub_year: year,
                source_tier: SourceTier::parse(&tier)?,
                op_fit: OperationalFit::parse(&fit)?,
            };
            let current_year = current_year.unwrap_or_else(|| Utc::now().year());
            print_score(&signals, Sector::parse(&sector)?, current_year);
            Ok(())
        }
    }
}

async fn init_project() -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config_path = SimulatorConfig::path_in(&cwd);

    if config_path.exists() {
        println!("Already initialized at {}", config_path.display());
        return Ok(());
    }

    SimulatorConfig::default().save(&cwd).await?;

    println!();
    println!("Initialized ceda-sim in {}", cwd.display());
    println!();
    println!("Created:");
    println!("  {}/", SIM_DIR);
    println!("  └── {}", CONFIG_FILE);
    println!();
    println!("Next steps:");
    println!("  1. export {}=<your key>", config::API_KEY_ENV);
    println!("  2. ceda-sim run \"<topic>\"");

    Ok(())
}

fn print_score(signals: &EvidenceSignals<'_>, sector: Sector, current_year: i32) {
    let result = score(signals, sector, current_year);
    let info_q = result.info_q;
    let verdict = if result.score >= MIN_EVIDENCE_SCORE {
        "kept".green()
    } else {
        "discarded".red()
    };

    println!("{} {} ({})", "Score:".bold(), result.score, verdict);
    println!("  resolution   {:>3}", info_q.resolution);
    println!("  temporal     {:>3}", info_q.temporal);
    println!("  reliability  {:>3}", info_q.reliability);
    println!("  context      {:>3}", info_q.context);
    println!(
        "  objectivity {:>3}  relevance {:>3}  significance {:>3}",
        result.breakdown.objectivity, result.breakdown.relevance, result.breakdown.significance
    );
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ceda_sim=info,orchestrator=info,agents=info".into()),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_collects_follow_ups() {
        let cli = Cli::try_parse_from([
            "ceda-sim",
            "run",
            "Remote work",
            "--auto",
            "--follow-up",
            "Costs?",
            "--follow-up",
            "Who loses?",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                topic,
                auto,
                yes,
                follow_up,
                ..
            } => {
                assert_eq!(topic, "Remote work");
                assert!(auto);
                assert!(!yes);
                assert_eq!(follow_up, vec!["Costs?", "Who loses?"]);
            }
            _ => panic!("expected run"),
        }
    }
}
