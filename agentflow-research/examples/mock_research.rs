use std::sync::Arc;

use agentflow_llm::echo_chat;
use agentflow_research::prelude::*;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let question = ResearchQuestion::by_key("mpesa_competition")
        .ok_or("preset question missing")?;
    let pipeline = ResearchPipeline::new(Arc::new(echo_chat()), Arc::new(MockSources::new()));

    // Phase 1 on its own, to show what the analyst is given
    let data = pipeline.collect(question.search_query()).await;
    println!("{}", data.summary(&question.question));

    // Both phases; the echo model turns prompts into the report text
    let outcome = pipeline.run(&question).await?;
    println!("{}", outcome.to_text_report());
    Ok(())
}
