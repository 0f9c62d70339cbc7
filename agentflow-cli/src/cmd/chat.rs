//! Single-agent chat, one-shot or interactive.

use std::{io::Write, path::PathBuf};

use agentflow_agent::ChatSession;
use agentflow_llm::ModelParameters;
use clap::Args;
use eyre::{Result, eyre};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{Models, joined, load_roster};

#[derive(Args, Debug)]
pub struct Chat {
    /// Built-in roster to pick the agent from.
    #[arg(long, default_value = "assistants")]
    pub roster: String,

    /// YAML roster file, used instead of a built-in roster.
    #[arg(long)]
    pub roster_file: Option<PathBuf>,

    /// Agent key; defaults to the first agent of the roster.
    #[arg(long, short)]
    pub agent: Option<String>,

    #[arg(long)]
    pub temperature: Option<f32>,

    #[arg(long)]
    pub max_tokens: Option<usize>,

    /// Prompt for a single turn. Without one an interactive session starts.
    pub prompt: Vec<String>,
}

const HELP: &str = "Commands: /agent <key>, /agents, /history, /clear, /quit";

impl Chat {
    pub async fn run(self, models: &Models) -> Result<()> {
        let roster = load_roster(&self.roster, self.roster_file.as_deref())?;
        let mut agent = match &self.agent {
            Some(key) => roster.require(key)?.key.clone(),
            None => roster
                .keys()
                .first()
                .map(|key| key.to_string())
                .ok_or_else(|| eyre!("roster has no agents"))?,
        };
        let parameters = ModelParameters {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let mut session = ChatSession::new(Some(models.client()?), roster).with_parameters(parameters);

        if !self.prompt.is_empty() {
            let reply = session.send(&agent, &joined(&self.prompt)).await?;
            println!("{reply}");
            return Ok(());
        }

        println!("{HELP}");
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("{agent}> ");
            std::io::stdout().flush()?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();
            match line {
                "" => {}
                "/quit" | "/exit" => break,
                "/clear" => {
                    session.clear();
                    println!("History cleared.");
                }
                "/agents" => {
                    for profile in session.roster().iter() {
                        println!("  {:<20} {}", profile.key, profile.label());
                    }
                }
                "/history" => {
                    if let Some(history) = session.history(&agent) {
                        for message in history.iter() {
                            println!("[{:?}] {}", message.role, message.content.as_deref().unwrap_or_default());
                        }
                    }
                }
                command if command.starts_with("/agent ") => {
                    let key = command["/agent ".len()..].trim();
                    match session.roster().get(key) {
                        Some(profile) => {
                            println!("Now talking to {}", profile.label());
                            agent = profile.key.clone();
                        }
                        None => println!("Unknown agent `{key}`"),
                    }
                }
                command if command.starts_with('/') => println!("{HELP}"),
                prompt => {
                    let reply = session.send(&agent, prompt).await?;
                    println!("{reply}\n");
                }
            }
        }
        Ok(())
    }
}
