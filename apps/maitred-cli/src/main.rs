//! Interactive front end: you play restaurant staff, the agent plays the
//! guest trying to book a table.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use maitred_config::{load_config, resolve_api_key, MaitredConfig};
use maitred_core::types::Persona;
use maitred_core::SessionRuntime;
use maitred_skills::{LlmSkillExecutor, OpenRouterClient, OpenRouterConfig, SkillExecutorConfig};
use maitred_stores::JsonSnapshotStore;

#[derive(Debug, Parser)]
#[command(name = "maitred", about = "Table-booking guest persona")]
struct Cli {
    /// Path to maitred.yaml; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the snapshot output directory from the config.
    #[arg(long)]
    reservations_dir: Option<PathBuf>,

    /// Verbose logging (RUST_LOG still takes precedence).
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => MaitredConfig::default(),
    };
    debug!(app = %config.app.name, model = %config.llm.model, "configuration loaded");

    let api_key = resolve_api_key(&config.llm)
        .context("set the API key environment variable to use the live LLM backend")?;
    let client = OpenRouterClient::new(OpenRouterConfig {
        api_key,
        endpoint: config.llm.endpoint.clone(),
        timeout_secs: config.llm.timeout_secs,
    })?;
    let executor = LlmSkillExecutor::new(
        client,
        SkillExecutorConfig {
            model: config.llm.model.clone(),
            temperature: config.llm.temperature,
            max_output_tokens: config.llm.max_output_tokens,
        },
    );

    let reservations_dir = cli
        .reservations_dir
        .unwrap_or_else(|| PathBuf::from(&config.app.reservations_dir));
    let store = JsonSnapshotStore::new(reservations_dir);

    let runtime = SessionRuntime::new(Arc::new(executor), Arc::new(store));
    let persona = Persona::default();
    let goals = config.guest.to_goal_facts()?;
    let guest_name = persona.name.clone();
    let mut state = runtime.create(persona, goals);

    println!(
        "=== Guest simulation: booking a table at {} ===",
        state.goals.restaurant_name
    );
    println!("Answer as the restaurant staff. Type quit or exit to stop.\n");

    // The guest opens the conversation before any staff input.
    let opened = runtime.step(&state, None).await?;
    println!("{guest_name}: {}", opened.reply);
    state = opened.state;

    let stdin = io::stdin();
    loop {
        if runtime.is_complete(&state) {
            println!("\nConversation complete.");
            if let Some(path) = &state.workflow.saved_file_path {
                println!("Reservation snapshot: {path}");
            }
            break;
        }

        print!("staff> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!("\nGoodbye.");
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if matches!(message.to_lowercase().as_str(), "quit" | "exit") {
            println!("Ending the conversation. Goodbye!");
            break;
        }

        let step = runtime.step(&state, Some(message)).await?;
        println!("{guest_name}: {}", step.reply);
        state = step.state;
    }

    Ok(())
}
