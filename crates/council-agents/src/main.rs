use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coordination::{route, CouncilDebate, ModelId};
use council_agents::config::{load_config, load_stage1};
use council_agents::report::{CouncilMemberRow, DebateReport};
use tracing::info;

/// Run an anonymized critique-and-rank round across an LLM council
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML file overriding council settings from the environment
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Have every council member critique and rank stage-1 answers
    Debate {
        /// The original user question
        #[arg(long)]
        query: String,

        /// JSON array of {"model", "response"} stage-1 answers
        #[arg(long)]
        stage1: PathBuf,

        /// Critics to ask instead of the configured council (comma separated)
        #[arg(long, value_delimiter = ',')]
        models: Vec<ModelId>,
    },
    /// Show which provider a model identifier routes to
    Route { model: ModelId },
    /// List the configured council and credential status
    Council,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "council_agents=info,coordination=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Debate {
            query,
            stage1,
            models,
        } => {
            let stage1_results = load_stage1(&stage1)?;
            info!(
                answers = stage1_results.len(),
                council = config.council_models.len(),
                timeout_secs = config.timeout.as_secs(),
                "Council debate starting"
            );

            let debate = CouncilDebate::from_config(&config)?;
            let active = (!models.is_empty()).then_some(models.as_slice());
            let round = debate
                .run_debate(&query, &stage1_results, active)
                .await
                .context("Debate round aborted")?;

            let report = DebateReport::from_round(&query, round);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Route { model } => {
            println!("{}", route(&model));
        }
        Command::Council => {
            let rows: Vec<CouncilMemberRow> = config
                .council_models
                .iter()
                .map(|m| CouncilMemberRow::new(m, &config))
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    Ok(())
}
