//! The tool-calling conference assistant.

use agentflow_agent::{ToolAgent, ToolLoopState, tool_agent::DEFAULT_MAX_ITERATIONS};
use agentflow_tools::conference_registry;
use clap::Args;
use eyre::Result;
use tracing::warn;

use super::{Models, joined};

#[derive(Args, Debug)]
pub struct Tools {
    /// List the available tools and exit.
    #[arg(long)]
    pub list: bool,

    /// Model turns allowed before giving up.
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: usize,

    /// Print the full run, tool calls included, as JSON.
    #[arg(long)]
    pub json: bool,

    #[arg(required_unless_present = "list")]
    pub message: Vec<String>,
}

impl Tools {
    pub async fn run(self, models: &Models) -> Result<()> {
        if self.list {
            let registry = conference_registry().await?;
            for spec in registry.specs().await {
                println!("{:<24} {}", spec.function.name, spec.function.description);
            }
            return Ok(());
        }

        let agent = ToolAgent::conference(models.client()?)
            .await?
            .with_max_iterations(self.max_iterations);
        let outcome = agent.run(&joined(&self.message)).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            return Ok(());
        }
        for call in &outcome.tool_calls {
            println!("🔧 {}({}) → {}", call.name, call.arguments, call.result);
        }
        if outcome.final_state == ToolLoopState::Exhausted {
            warn!(iterations = outcome.iterations, "tool loop hit its iteration limit");
        }
        println!("{}", outcome.response);
        Ok(())
    }
}
