mod cli;
mod config;
mod data_dir;
mod documents;
mod drafting;
mod errors;
mod evaluation;
mod facts;
mod llm_client;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, info_span, Instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::data_dir::DataDir;
use crate::drafting::drafter::{generate_demand_letter, DraftOptions};
use crate::evaluation::evaluator::{run_evaluation, EvaluateOptions};
use crate::facts::CachePolicy;
use crate::llm_client::{ChatModel, LlmClient, Services};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting demand v{}", env!("CARGO_PKG_VERSION"));

    let services = build_services(&config)?;
    let span = info_span!("run", run_id = %Uuid::new_v4());

    run(cli.command, &config, &services).instrument(span).await
}

async fn run(command: Command, config: &Config, services: &Services) -> Result<()> {
    match command {
        Command::Draft {
            input_dir,
            output_file,
            model,
            no_research,
        } => {
            let options = DraftOptions {
                model,
                research: !no_research,
            };
            generate_demand_letter(services, &input_dir, &output_file, &options).await?;
        }
        Command::Evaluate {
            reprocess,
            model,
            compare,
        } => {
            let options = EvaluateOptions {
                model,
                cache: if reprocess {
                    CachePolicy::Reprocess
                } else {
                    CachePolicy::Reuse
                },
                compare,
            };
            let data = DataDir::new(config.data_dir.clone());
            let results =
                run_evaluation(services.text.as_ref(), &data, &config.templates_dir, &options)
                    .await?;
            info!("Evaluated {} letters", results.len());
        }
    }
    Ok(())
}

/// One client per provider, shared by every stage of the run.
fn build_services(config: &Config) -> Result<Services> {
    let timeout = Duration::from_secs(config.llm_timeout_secs);

    let text: Arc<dyn ChatModel> = Arc::new(LlmClient::new(
        config.openai_api_key.clone(),
        &config.openai_base_url,
        timeout,
    )?);
    info!("LLM client initialized ({})", config.openai_base_url);

    let search = match &config.perplexity_api_key {
        Some(key) => {
            let client: Arc<dyn ChatModel> = Arc::new(LlmClient::new(
                key.clone(),
                &config.perplexity_base_url,
                timeout,
            )?);
            info!("Search client initialized ({})", config.perplexity_base_url);
            Some(client)
        }
        None => None,
    };

    Ok(Services { text, search })
}
