// SPDX-FileCopyrightText: 2026 Glance Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Glance - ask a multimodal LLM about your screen.
//!
//! This binary is a thin consumer of the request pipeline: it loads config,
//! builds the OpenAI transport, runs one `execute` call, and renders the
//! structured answer. Screenshot capture and session storage live with the
//! caller; here the image comes from `--image` and history from
//! `--history-file`.

mod render;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use glance_config::GlanceConfig;
use glance_core::{AskRequest, HistoryTurn};
use glance_pipeline::{BudgetParams, Orchestrator, PromptSet, RetryPolicy};

/// Glance - ask a multimodal LLM about your screen.
#[derive(Parser, Debug)]
#[command(name = "glance", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question, optionally about a screenshot.
    Ask {
        /// The question. Omit it to have the screenshot analyzed as-is.
        question: Option<String>,

        /// Path to an already-captured screenshot (PNG).
        #[arg(long)]
        image: Option<PathBuf>,

        /// JSON file of prior {"question", "answer"} pairs to carry as
        /// conversation history.
        #[arg(long)]
        history_file: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match glance_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            glance_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.assistant.log_level);

    match cli.command {
        Commands::Ask {
            question,
            image,
            history_file,
        } => run_ask(&config, question, image, history_file).await,
        Commands::Config => {
            match toml::to_string_pretty(&config) {
                Ok(rendered) => {
                    print!("{rendered}");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("{} {e}", "error:".red().bold());
                    ExitCode::FAILURE
                }
            }
        }
    }
}

async fn run_ask(
    config: &GlanceConfig,
    question: Option<String>,
    image_path: Option<PathBuf>,
    history_path: Option<PathBuf>,
) -> ExitCode {
    let image = match image_path.map(std::fs::read).transpose() {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("{} could not read image: {e}", "error:".red().bold());
            return ExitCode::FAILURE;
        }
    };

    let history = match history_path.map(load_history).transpose() {
        Ok(history) => history.unwrap_or_default(),
        Err(e) => {
            eprintln!("{} could not read history file: {e}", "error:".red().bold());
            return ExitCode::FAILURE;
        }
    };

    let transport = match glance_openai::OpenAiTransport::new(config) {
        Ok(transport) => Arc::new(transport),
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            return ExitCode::FAILURE;
        }
    };

    let orchestrator = Orchestrator::new(
        transport,
        prompt_set(config),
        budget_params(config),
        retry_policy(config),
    );

    let request = AskRequest {
        question: question.unwrap_or_default(),
        image,
        history,
        custom_instructions: config.prompt.custom_instructions.clone(),
    };

    // Ctrl-C cancels the in-flight request cooperatively.
    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    match orchestrator.execute(request, cancel).await {
        Ok(answer) => {
            render::render_answer(&answer);
            ExitCode::SUCCESS
        }
        Err(failure) => {
            eprintln!("{} {failure}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

/// Reads history turns from a JSON array of `{"question", "answer"}` pairs.
fn load_history(path: PathBuf) -> Result<Vec<HistoryTurn>, std::io::Error> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(std::io::Error::other)
}

/// Builds the prompt set: file overrides inline overrides the built-in
/// default.
fn prompt_set(config: &GlanceConfig) -> PromptSet {
    if let Some(path) = &config.prompt.system_prompt_file {
        match std::fs::read_to_string(path) {
            Ok(content) if !content.trim().is_empty() => {
                return PromptSet {
                    system_prompt: content.trim().to_string(),
                };
            }
            Ok(_) => warn!(path = path.as_str(), "system prompt file is empty, falling back"),
            Err(e) => warn!(
                path = path.as_str(),
                error = %e,
                "failed to read system prompt file, falling back"
            ),
        }
    }

    if let Some(prompt) = &config.prompt.system_prompt
        && !prompt.trim().is_empty()
    {
        return PromptSet {
            system_prompt: prompt.trim().to_string(),
        };
    }

    PromptSet::default()
}

fn budget_params(config: &GlanceConfig) -> BudgetParams {
    BudgetParams {
        total_ceiling: config.budget.total_ceiling,
        buffer_tokens: config.budget.buffer_tokens,
        response_floor: config.budget.response_floor,
        response_ceiling: config.budget.response_ceiling,
    }
}

fn retry_policy(config: &GlanceConfig) -> RetryPolicy {
    RetryPolicy {
        max_attempts: config.retry.max_attempts,
        base_delay: Duration::from_secs(config.retry.base_delay_secs),
        watchdog: Duration::from_secs(config.retry.watchdog_secs),
        transport_timeout: Duration::from_secs(config.retry.request_timeout_secs),
    }
}

fn init_tracing(log_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
