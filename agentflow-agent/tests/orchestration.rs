use std::sync::Arc;

use agentflow_agent::prelude::*;
use agentflow_llm::{ChatRequest, ChatResponse, FnChat, LlmError, echo_chat};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn sequential_workflow_threads_outputs_into_later_roles() {
    let orchestrator = Orchestrator::new(Arc::new(echo_chat()), rosters::advanced());
    let mode = WorkflowMode::sequential(["Analyst", "Strategist"]);

    let result = orchestrator.run(&mode, "expand to Lagos").await.unwrap();

    assert_eq!(
        result.to_json_pretty().unwrap(),
        serde_json::to_string_pretty(&serde_json::json!({
            "Analyst": "echo:expand to Lagos",
            "Strategist": "echo:[Analyst]: echo:expand to Lagos\nexpand to Lagos",
        }))
        .unwrap()
    );
}

#[tokio::test]
async fn launch_team_review_gets_every_phase_output() {
    let chat = FnChat::new(|request: ChatRequest| {
        let prompt = request.last_text();
        if prompt.starts_with("Based on the following context") {
            Ok(ChatResponse::from_text("approved"))
        } else {
            Ok(ChatResponse::from_text("draft"))
        }
    });
    let orchestrator = Orchestrator::new(Arc::new(chat), rosters::launch_team())
        .with_style(ContextStyle::Briefing);
    let mode = WorkflowMode::review_by_last(orchestrator.roster());

    let result = orchestrator.run(&mode, "Smart water bottle").await.unwrap();

    assert_eq!(
        result.pairs(),
        vec![
            ("researcher", "draft"),
            ("strategist", "draft"),
            ("writer", "draft"),
            ("reviewer", "approved"),
        ]
    );
}

#[tokio::test]
async fn failing_backend_yields_inline_errors_for_every_role() {
    let chat = FnChat::new(|_request: ChatRequest| Err(LlmError::api(401, "bad key")));
    let orchestrator = Orchestrator::new(Arc::new(chat), rosters::research_team());
    let mode = WorkflowMode::all_sequential(orchestrator.roster());

    let result = orchestrator.run(&mode, "Gen Z in Nigeria").await.unwrap();

    assert_eq!(result.len(), 6);
    assert_eq!(result.failures(), 6);
    assert!(
        result
            .outputs()
            .iter()
            .all(|output| output.text == "Error: API error (401): bad key")
    );
}

#[tokio::test]
async fn conference_tool_agent_runs_with_offline_backend() {
    let agent = ToolAgent::conference(Arc::new(echo_chat()))
        .await
        .unwrap();
    let outcome = agent.run("What should I pack?").await.unwrap();

    assert_eq!(outcome.response, "echo:What should I pack?");
    assert_eq!(outcome.iterations, 1);
}
