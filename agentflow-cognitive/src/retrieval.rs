//! Keyword retrieval over a small document set, and answering grounded in it.

use std::{collections::HashSet, sync::Arc};

use agentflow_core::message::Message;
use agentflow_llm::{ChatCompletion, ModelParameters};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{CognitiveError, Result};

/// Number of documents retrieved when the caller does not say.
pub const DEFAULT_TOP_K: usize = 2;

const BUILTIN_DOCUMENTS: &str = include_str!("../data/knowledge_base.yaml");

const RAG_SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions based on the provided context.

Rules:
1. Only use information from the provided context
2. If the context doesn't contain the answer, say so clearly
3. Cite which document you're using when answering
4. Be concise but complete
5. If asked about something not in the context, acknowledge the limitation";

/// A document in the knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
}

/// A search match and its keyword score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub doc_id: String,
    pub title: String,
    pub content: String,
    pub score: usize,
}

/// Documents searchable by keyword overlap.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    documents: Vec<Document>,
    word: Regex,
}

impl KnowledgeBase {
    pub fn new(documents: Vec<Document>) -> Result<Self> {
        let mut seen = HashSet::new();
        if let Some(duplicate) = documents.iter().find(|doc| !seen.insert(doc.id.as_str())) {
            return Err(CognitiveError::invalid_config(format!(
                "duplicate document id: {}",
                duplicate.id
            )));
        }
        let word = Regex::new(r"\w+")
            .map_err(|e| CognitiveError::retrieval(format!("Regex error: {e}")))?;
        Ok(Self { documents, word })
    }

    /// The five documents about the conference and the tools it covers.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml_str(BUILTIN_DOCUMENTS)
    }

    /// Load a YAML list of `{id, title, content}` documents.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Self::new(serde_yaml::from_str(yaml)?)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn words(&self, text: &str) -> HashSet<String> {
        let lower = text.to_lowercase();
        self.word
            .find_iter(&lower)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Rank documents by how many distinct query words they contain.
    ///
    /// Documents sharing no word with the query are left out. Equal scores
    /// keep knowledge-base order.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<SearchHit> {
        let query_words = self.words(query);

        let mut hits: Vec<SearchHit> = self
            .documents
            .iter()
            .filter_map(|doc| {
                let doc_words = self.words(&format!("{} {}", doc.title, doc.content));
                let score = query_words.intersection(&doc_words).count();
                (score > 0).then(|| SearchHit {
                    doc_id: doc.id.clone(),
                    title: doc.title.clone(),
                    content: doc.content.clone(),
                    score,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.cmp(&a.score));
        hits.truncate(top_k);
        debug!(query, hits = hits.len(), "knowledge base search");
        hits
    }
}

/// Context block handed to the model.
pub fn build_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| format!("Document: {}\n{}", hit.title, hit.content))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

/// An answer together with the documents it was grounded in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagAnswer {
    pub question: String,
    pub answer: String,
    pub sources: Vec<SearchHit>,
    /// Whether `answer` is error text rather than model output.
    pub failed: bool,
}

impl RagAnswer {
    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }
}

/// Answers questions from a knowledge base.
pub struct RagAgent {
    client: Arc<dyn ChatCompletion>,
    knowledge_base: KnowledgeBase,
    top_k: usize,
}

impl RagAgent {
    pub fn new(client: Arc<dyn ChatCompletion>, knowledge_base: KnowledgeBase) -> Self {
        Self {
            client,
            knowledge_base,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge_base
    }

    /// Retrieve, then answer from what was retrieved.
    ///
    /// With no matching documents the model is not called and the answer is
    /// empty.
    pub async fn answer(&self, question: &str) -> RagAnswer {
        let sources = self.knowledge_base.search(question, self.top_k);
        if sources.is_empty() {
            info!(question, "no relevant documents");
            return RagAnswer {
                question: question.to_string(),
                answer: String::new(),
                sources,
                failed: false,
            };
        }

        let (answer, failed) = self.generate(question, &sources).await;
        RagAnswer {
            question: question.to_string(),
            answer,
            sources,
            failed,
        }
    }

    /// Answer `question` from the given documents.
    pub async fn generate(&self, question: &str, sources: &[SearchHit]) -> (String, bool) {
        let context = build_context(sources);
        let user_prompt = format!(
            "Context from knowledge base:\n{context}\n\n---\n\nQuestion: {question}\n\nPlease answer based on the context above."
        );
        let messages = vec![Message::system(RAG_SYSTEM_PROMPT), Message::user(user_prompt)];

        match self
            .client
            .complete_text(messages, ModelParameters::default().with_temperature(0.3))
            .await
        {
            Ok(answer) => (answer, false),
            Err(err) => {
                warn!(error = %err, "rag answer failed");
                (format!("Error generating response: {err}"), true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use agentflow_llm::{ChatRequest, ChatResponse, FnChat, LlmError};
    use pretty_assertions::assert_eq;

    use super::*;

    fn doc(id: &str, title: &str, content: &str) -> Document {
        Document {
            id: id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_builtin_documents() {
        let kb = KnowledgeBase::builtin().unwrap();
        assert_eq!(kb.len(), 5);
        assert!(kb.get("dotnet_conf_2025").unwrap().content.contains("Cape Town Convention Centre"));
        assert!(kb.get("python_streamlit").is_some());
    }

    #[test]
    fn test_search_ranks_by_overlap() {
        let kb = KnowledgeBase::new(vec![
            doc("a", "Alpha", "parking available"),
            doc("b", "Beta", "parking and wifi available"),
            doc("c", "Gamma", "nothing relevant"),
        ])
        .unwrap();

        let hits = kb.search("Is WiFi or parking available?", 5);
        let ids: Vec<&str> = hits.iter().map(|hit| hit.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(hits[0].score, 3);
    }

    #[test]
    fn test_search_ties_keep_order_and_truncate() {
        let kb = KnowledgeBase::new(vec![
            doc("first", "One", "agents"),
            doc("second", "Two", "agents"),
            doc("third", "Three", "agents"),
        ])
        .unwrap();

        let hits = kb.search("AGENTS", DEFAULT_TOP_K);
        let ids: Vec<&str> = hits.iter().map(|hit| hit.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[test]
    fn test_search_without_overlap_is_empty() {
        let kb = KnowledgeBase::builtin().unwrap();
        assert!(kb.search("zzzz qqqq", 2).is_empty());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = KnowledgeBase::new(vec![doc("a", "A", "x"), doc("a", "B", "y")]);
        assert!(matches!(result, Err(CognitiveError::InvalidConfig { .. })));
    }

    #[test]
    fn test_context_format() {
        let hits = vec![
            SearchHit {
                doc_id: "a".into(),
                title: "A".into(),
                content: "one".into(),
                score: 1,
            },
            SearchHit {
                doc_id: "b".into(),
                title: "B".into(),
                content: "two".into(),
                score: 1,
            },
        ];
        assert_eq!(build_context(&hits), "Document: A\none\n\n---\n\nDocument: B\ntwo");
    }

    #[tokio::test]
    async fn test_answer_uses_context_and_low_temperature() {
        let chat = FnChat::new(|request: ChatRequest| {
            assert_eq!(request.temperature, Some(0.3));
            let prompt = request.last_text();
            assert!(prompt.contains("Document: .NET Conf 2025 - Cape Town Event Guide"));
            assert!(prompt.ends_with("Please answer based on the context above."));
            Ok(ChatResponse::from_text("November 22, 2025"))
        });
        let agent = RagAgent::new(Arc::new(chat), KnowledgeBase::builtin().unwrap());

        let answer = agent.answer("When is .NET Conf in Cape Town?").await;
        assert_eq!(answer.answer, "November 22, 2025");
        assert_eq!(answer.sources[0].doc_id, "dotnet_conf_2025");
        assert!(!answer.failed);
    }

    #[tokio::test]
    async fn test_answer_failure_is_inline() {
        let chat = FnChat::new(|_request: ChatRequest| Err(LlmError::api(500, "down")));
        let agent = RagAgent::new(Arc::new(chat), KnowledgeBase::builtin().unwrap());

        let answer = agent.answer("What does Copilot cost?").await;
        assert_eq!(answer.answer, "Error generating response: API error (500): down");
        assert!(answer.failed);
        assert!(answer.has_sources());
    }
}
