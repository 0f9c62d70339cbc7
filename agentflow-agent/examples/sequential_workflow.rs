use std::sync::Arc;

use agentflow_agent::prelude::*;
use agentflow_llm::echo_chat;
use futures::StreamExt;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("agentflow workflow demo (echo model)");
    println!("====================================\n");

    // The echo model replies with `echo:` plus the last user message, which
    // makes the context each agent receives visible in its output.
    let orchestrator = Orchestrator::new(Arc::new(echo_chat()), rosters::advanced());

    // 1. Sequential: every agent sees all earlier outputs
    let mode = WorkflowMode::sequential(["Analyst", "Strategist"]);
    let results = orchestrator
        .run(&mode, "Should we expand into the Kenyan market?")
        .await?;
    for output in results.outputs() {
        println!("{} {}\n{}\n", output.icon, output.name, output.text);
    }
    println!("{}\n", results.to_json_pretty()?);

    // 2. Parallel then review, streamed as it runs
    let mode = WorkflowMode::review_by_last(orchestrator.roster());
    let mut events = Arc::new(orchestrator.with_style(ContextStyle::Briefing))
        .stream(mode, "Launch a budgeting app for students");
    while let Some(event) = events.next().await {
        match event {
            WorkflowEvent::AgentStart { agent_name, .. } => println!("▶ {agent_name}"),
            WorkflowEvent::AgentComplete { agent_name, .. } => println!("✅ {agent_name}"),
            WorkflowEvent::WorkflowComplete { results } => {
                println!("\nReviewer saw {} outputs", results.len() - 1);
            }
            WorkflowEvent::WorkflowFailed { error } => println!("❌ {error}"),
        }
    }

    Ok(())
}
