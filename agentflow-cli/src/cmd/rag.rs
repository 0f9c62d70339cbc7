//! Retrieval-augmented answers from a knowledge base.

use std::path::PathBuf;

use agentflow_cognitive::{KnowledgeBase, RagAgent, retrieval::DEFAULT_TOP_K};
use clap::Args;
use eyre::{Result, WrapErr};

use super::{Models, joined};

#[derive(Args, Debug)]
pub struct Rag {
    /// YAML knowledge base, used instead of the built-in one.
    #[arg(long)]
    pub kb_file: Option<PathBuf>,

    /// Documents retrieved per question.
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Only show which documents match; no model call.
    #[arg(long)]
    pub search_only: bool,

    #[arg(required = true)]
    pub question: Vec<String>,
}

impl Rag {
    fn knowledge_base(&self) -> Result<KnowledgeBase> {
        match &self.kb_file {
            Some(path) => {
                let yaml = std::fs::read_to_string(path)
                    .wrap_err_with(|| format!("failed to read knowledge base {}", path.display()))?;
                Ok(KnowledgeBase::from_yaml_str(&yaml)?)
            }
            None => Ok(KnowledgeBase::builtin()?),
        }
    }

    pub async fn run(self, models: &Models) -> Result<()> {
        let knowledge_base = self.knowledge_base()?;
        let question = joined(&self.question);

        if self.search_only {
            let hits = knowledge_base.search(&question, self.top_k);
            if hits.is_empty() {
                println!("No matching documents.");
            }
            for hit in hits {
                println!("{:>3}  {} ({})", hit.score, hit.title, hit.doc_id);
            }
            return Ok(());
        }

        let agent = RagAgent::new(models.client()?, knowledge_base).with_top_k(self.top_k);
        let answer = agent.answer(&question).await;
        if !answer.has_sources() {
            println!("No relevant documents found in the knowledge base.");
            return Ok(());
        }
        println!("{}\n", answer.answer);
        println!("Sources:");
        for source in &answer.sources {
            println!("  - {} (score {})", source.title, source.score);
        }
        Ok(())
    }
}
