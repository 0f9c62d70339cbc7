//! Multi-agent workflows.

use std::{path::PathBuf, sync::Arc};

use agentflow_agent::{ContextStyle, Orchestrator, Roster, WorkflowEvent, WorkflowMode, WorkflowResult};
use clap::{Args, ValueEnum};
use eyre::{Result, bail, eyre};
use tokio_stream::StreamExt;
use tracing::warn;

use super::{Models, file_timestamp, joined, load_roster, write_export};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Each agent sees every earlier output.
    Sequential,
    /// Agents work in parallel, then a reviewer sees all of them.
    Review,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StyleArg {
    Threaded,
    Transcript,
    Briefing,
}

impl From<StyleArg> for ContextStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Threaded => ContextStyle::Threaded,
            StyleArg::Transcript => ContextStyle::Transcript,
            StyleArg::Briefing => ContextStyle::Briefing,
        }
    }
}

#[derive(Args, Debug)]
pub struct Workflow {
    /// Built-in roster: assistants, advanced, launch or research.
    #[arg(long, default_value = "advanced")]
    pub team: String,

    /// YAML roster file, used instead of a built-in roster.
    #[arg(long)]
    pub roster_file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ModeArg::Sequential)]
    pub mode: ModeArg,

    /// Comma-separated agent keys in run order; defaults to the whole roster.
    #[arg(long, value_delimiter = ',')]
    pub agents: Vec<String>,

    /// Reviewer in review mode; defaults to the last agent.
    #[arg(long)]
    pub reviewer: Option<String>,

    /// How earlier outputs are shown to later agents.
    #[arg(long, value_enum, default_value_t = StyleArg::Threaded)]
    pub style: StyleArg,

    /// Print progress as each agent starts and finishes.
    #[arg(long)]
    pub stream: bool,

    /// Print the results as JSON.
    #[arg(long)]
    pub json: bool,

    /// Directory to save the JSON results in.
    #[arg(long)]
    pub export: Option<PathBuf>,

    #[arg(required = true)]
    pub query: Vec<String>,
}

impl Workflow {
    fn workflow_mode(&self, roster: &Roster) -> Result<WorkflowMode> {
        let mut agents: Vec<String> = if self.agents.is_empty() {
            roster.keys().into_iter().map(String::from).collect()
        } else {
            self.agents.clone()
        };
        match self.mode {
            ModeArg::Sequential => Ok(WorkflowMode::sequential(agents)),
            ModeArg::Review => {
                let reviewer = match &self.reviewer {
                    Some(reviewer) => {
                        agents.retain(|key| key != reviewer);
                        reviewer.clone()
                    }
                    None => agents
                        .pop()
                        .ok_or_else(|| eyre!("review mode needs at least two agents"))?,
                };
                if agents.is_empty() {
                    bail!("review mode needs at least one agent besides the reviewer");
                }
                Ok(WorkflowMode::parallel_then_review(agents, reviewer))
            }
        }
    }

    pub async fn run(self, models: &Models) -> Result<()> {
        let roster = load_roster(&self.team, self.roster_file.as_deref())?;
        let mode = self.workflow_mode(&roster)?;
        let query = joined(&self.query);
        let orchestrator = Orchestrator::new(models.client()?, roster).with_style(self.style.into());

        let results = if self.stream {
            stream_run(Arc::new(orchestrator), mode, query).await?
        } else {
            let results = orchestrator.run(&mode, &query).await?;
            if !self.json {
                for output in results.outputs() {
                    println!("{} {}\n{}\n", output.icon, output.name, output.text);
                }
            }
            results
        };

        if results.failures() > 0 {
            warn!(failures = results.failures(), "some agents failed");
        }
        if self.json {
            println!("{}", results.to_json_pretty()?);
        }
        if let Some(dir) = &self.export {
            let file_name = format!("workflow_{}.json", file_timestamp());
            write_export(dir, &file_name, &results.to_json_pretty()?).await?;
        }
        Ok(())
    }
}

async fn stream_run(
    orchestrator: Arc<Orchestrator>,
    mode: WorkflowMode,
    query: String,
) -> Result<WorkflowResult> {
    let mut events = orchestrator.stream(mode, query);
    while let Some(event) = events.next().await {
        match event {
            WorkflowEvent::AgentStart {
                agent_name, icon, ..
            } => println!("{icon} {agent_name} is working..."),
            WorkflowEvent::AgentComplete {
                agent_name,
                icon,
                result,
                ..
            } => println!("{icon} {agent_name}\n{result}\n"),
            WorkflowEvent::WorkflowComplete { results } => return Ok(results),
            WorkflowEvent::WorkflowFailed { error } => bail!("workflow failed: {error}"),
        }
    }
    Err(eyre!("workflow ended without a result"))
}

#[cfg(test)]
mod tests {
    use agentflow_agent::rosters;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cmd::{Cli, Command};

    fn parse(args: &[&str]) -> Workflow {
        let argv = ["agentflow", "workflow"].iter().chain(args.iter());
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Workflow(cmd) => cmd,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_sequential_defaults_to_whole_roster() {
        let cmd = parse(&["q"]);
        let mode = cmd.workflow_mode(&rosters::advanced()).unwrap();
        assert_eq!(
            mode.roles(),
            vec!["Analyst", "Strategist", "Innovator", "Critic"]
        );
    }

    #[test]
    fn test_review_uses_last_agent() {
        let cmd = parse(&["--mode", "review", "--agents", "Analyst,Strategist,Critic", "q"]);
        let mode = cmd.workflow_mode(&rosters::advanced()).unwrap();
        assert_eq!(
            mode,
            WorkflowMode::parallel_then_review(["Analyst", "Strategist"], "Critic")
        );
    }

    #[test]
    fn test_review_with_named_reviewer() {
        let cmd = parse(&["--mode", "review", "--reviewer", "Analyst", "q"]);
        let mode = cmd.workflow_mode(&rosters::advanced()).unwrap();
        assert_eq!(
            mode,
            WorkflowMode::parallel_then_review(["Strategist", "Innovator", "Critic"], "Analyst")
        );
    }

    #[test]
    fn test_review_needs_two_agents() {
        let cmd = parse(&["--mode", "review", "--agents", "Critic", "q"]);
        assert!(cmd.workflow_mode(&rosters::advanced()).is_err());
    }

    #[tokio::test]
    async fn test_stream_run_returns_results() {
        let orchestrator = Orchestrator::new(Arc::new(agentflow_llm::echo_chat()), rosters::advanced());
        let results = stream_run(
            Arc::new(orchestrator),
            WorkflowMode::sequential(["Analyst"]),
            "q".to_string(),
        )
        .await
        .unwrap();
        assert_eq!(results.get("Analyst"), Some("echo:q"));
    }
}
