//! Argument parsing and the pieces shared by every subcommand.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use agentflow_agent::{Roster, rosters};
use agentflow_llm::{ChatCompletion, ClientSettings, build_client, echo_chat};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use eyre::{Result, WrapErr, bail, eyre};
use tracing::{info, warn};

pub mod agents;
pub mod chat;
pub mod compare;
pub mod plan;
pub mod rag;
pub mod research;
pub mod tools;
pub mod workflow;

/// Agentic AI patterns over an OpenAI-compatible chat API.
#[derive(Parser, Debug)]
#[command(name = "agentflow", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Answer with a local echo model instead of calling the endpoint.
    #[arg(long, global = true)]
    pub offline: bool,

    /// Log filter such as `debug` or `agentflow_agent=trace`. Takes
    /// precedence over RUST_LOG.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(flatten)]
    pub endpoint: EndpointArgs,
}

/// Chat endpoint settings.
#[derive(Args, Debug, Clone, Default)]
pub struct EndpointArgs {
    /// Base URL of the chat endpoint.
    #[arg(long, env = "AZURE_AI_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    #[arg(long, env = "AZURE_AI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Model or deployment name.
    #[arg(long, env = "AZURE_AI_MODEL_NAME", global = true)]
    pub model: Option<String>,

    /// `api-version` for versioned deployments.
    #[arg(long, env = "AZURE_OPENAI_API_VERSION", global = true)]
    pub api_version: Option<String>,
}

impl EndpointArgs {
    /// Settings for the client, or `None` when endpoint or key is missing.
    pub fn settings(&self) -> Option<ClientSettings> {
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        let mut settings = ClientSettings::new(present(&self.endpoint)?, present(&self.api_key)?);
        if let Some(model) = present(&self.model) {
            settings = settings.with_model(model);
        }
        if let Some(api_version) = present(&self.api_version) {
            settings = settings.with_api_version(api_version);
        }
        Some(settings)
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Chat with one agent at a time.
    Chat(chat::Chat),
    /// Run several agents in sequence or in parallel with a reviewer.
    Workflow(workflow::Workflow),
    /// Ask two agents the same question side by side.
    Compare(compare::Compare),
    /// Ask the conference assistant, which can call tools.
    Tools(tools::Tools),
    /// Answer a question from the knowledge base.
    Rag(rag::Rag),
    /// Plan a task, execute the plan and reflect on it.
    Plan(plan::Plan),
    /// Research a marketing question across social platforms.
    Research(research::Research),
    /// List the built-in agent rosters.
    Agents(agents::Agents),
}

/// Where subcommands get their chat model from.
#[derive(Debug, Clone)]
pub struct Models {
    offline: bool,
    endpoint: EndpointArgs,
}

impl Models {
    /// The chat client, failing when nothing is configured.
    pub fn client(&self) -> Result<Arc<dyn ChatCompletion>> {
        if self.offline {
            info!("offline mode: replies come from the echo model");
            return Ok(Arc::new(echo_chat()));
        }
        let Some(settings) = self.endpoint.settings() else {
            warn!("Azure AI credentials are not configured");
            bail!(
                "set AZURE_AI_ENDPOINT and AZURE_AI_API_KEY (or a .env file), or pass --offline"
            );
        };
        let client =
            build_client(&settings).ok_or_else(|| eyre!("failed to initialize the chat client"))?;
        info!(model = client.model(), variant = ?client.variant(), "connected to chat endpoint");
        Ok(Arc::new(client))
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let models = Models {
            offline: self.offline,
            endpoint: self.endpoint,
        };
        match self.command {
            Command::Chat(cmd) => cmd.run(&models).await,
            Command::Workflow(cmd) => cmd.run(&models).await,
            Command::Compare(cmd) => cmd.run(&models).await,
            Command::Tools(cmd) => cmd.run(&models).await,
            Command::Rag(cmd) => cmd.run(&models).await,
            Command::Plan(cmd) => cmd.run(&models).await,
            Command::Research(cmd) => cmd.run(&models).await,
            Command::Agents(cmd) => cmd.run(),
        }
    }
}

/// A built-in roster by name, or one read from a YAML file.
pub fn load_roster(name: &str, file: Option<&Path>) -> Result<Roster> {
    match file {
        Some(path) => {
            let yaml = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read roster {}", path.display()))?;
            Ok(Roster::from_yaml_str(&yaml)?)
        }
        None => rosters::by_name(name).ok_or_else(|| {
            eyre!("unknown roster `{name}`; expected assistants, advanced, launch or research")
        }),
    }
}

/// `YYYYmmdd_HHMMSS`, for export file names.
pub fn file_timestamp() -> String {
    Utc::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Write `contents` to `dir/file_name`, creating `dir` if needed.
pub async fn write_export(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .wrap_err_with(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, contents)
        .await
        .wrap_err_with(|| format!("failed to write {}", path.display()))?;
    println!("Saved {}", path.display());
    Ok(path)
}

/// Join positional words into one prompt.
pub fn joined(words: &[String]) -> String {
    words.join(" ").trim().to_string()
}
