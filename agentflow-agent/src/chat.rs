//! Single-agent chat sessions and side-by-side comparison.

use std::{collections::HashMap, sync::Arc};

use agentflow_core::message::{Conversation, Message};
use agentflow_llm::{ChatCompletion, ModelParameters};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::{AgentError, Result, inline_error},
    profile::{AgentProfile, Roster},
};

/// Reply recorded when no chat client is configured.
pub const NOT_CONFIGURED_REPLY: &str =
    "⚠️ Please configure your Azure AI credentials in the .env file.";

/// One agent's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentOutput {
    pub key: String,
    pub name: String,
    pub icon: String,
    pub text: String,
    /// Whether `text` is an inline error rather than model output.
    #[serde(default)]
    pub failed: bool,
}

impl AgentOutput {
    pub(crate) fn new(profile: &AgentProfile, text: String, failed: bool) -> Self {
        Self {
            key: profile.key.clone(),
            name: profile.name.clone(),
            icon: profile.icon.clone(),
            text,
            failed,
        }
    }
}

/// Send `messages` and return the reply text, or the inline error text and `true`.
pub(crate) async fn complete_inline(
    client: &dyn ChatCompletion,
    messages: Vec<Message>,
    parameters: ModelParameters,
) -> (String, bool) {
    match client.complete_text(messages, parameters).await {
        Ok(text) => (text, false),
        Err(err) => {
            warn!(error = %err, category = err.category(), "chat completion failed");
            (inline_error(&err), true)
        }
    }
}

/// Ask one agent a single question with no prior history.
pub async fn ask(
    client: &dyn ChatCompletion,
    profile: &AgentProfile,
    prompt: &str,
    parameters: ModelParameters,
) -> AgentOutput {
    let messages = vec![
        Message::system(&profile.system_prompt),
        Message::user(prompt),
    ];
    let (text, failed) = complete_inline(client, messages, parameters).await;
    AgentOutput::new(profile, text, failed)
}

/// Chat with agents from a roster, keeping a separate history per agent.
///
/// Each turn sends only the agent's system prompt and the new prompt; the
/// history is kept for display and export.
pub struct ChatSession {
    client: Option<Arc<dyn ChatCompletion>>,
    roster: Roster,
    parameters: ModelParameters,
    histories: HashMap<String, Conversation>,
}

impl ChatSession {
    pub fn new(client: Option<Arc<dyn ChatCompletion>>, roster: Roster) -> Self {
        Self {
            client,
            roster,
            parameters: ModelParameters::default(),
            histories: HashMap::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: ModelParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Send a prompt to an agent and record both turns.
    ///
    /// Model failures come back as inline error text; only an unknown agent
    /// is an error.
    pub async fn send(&mut self, agent_key: &str, prompt: &str) -> Result<String> {
        let profile = self.roster.require(agent_key)?.clone();
        info!(agent = %profile.key, "chat turn");

        let reply = match &self.client {
            Some(client) => ask(client.as_ref(), &profile, prompt, self.parameters).await.text,
            None => NOT_CONFIGURED_REPLY.to_string(),
        };

        let history = self.histories.entry(profile.key).or_default();
        history.push(Message::user(prompt));
        history.push(Message::assistant(&reply));
        Ok(reply)
    }

    pub fn history(&self, agent_key: &str) -> Option<&Conversation> {
        self.histories.get(agent_key)
    }

    /// Forget every agent's history.
    pub fn clear(&mut self) {
        self.histories.clear();
    }
}

/// Two agents' answers to the same question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub query: String,
    pub first: AgentOutput,
    pub second: AgentOutput,
}

/// Ask two different agents the same question concurrently.
pub async fn compare(
    client: Arc<dyn ChatCompletion>,
    roster: &Roster,
    first: &str,
    second: &str,
    query: &str,
) -> Result<Comparison> {
    if first == second {
        return Err(AgentError::configuration(
            "comparison needs two different agents",
        ));
    }
    let first_profile = roster.require(first)?;
    let second_profile = roster.require(second)?;
    let parameters = ModelParameters::default();

    let (first, second) = tokio::join!(
        ask(client.as_ref(), first_profile, query, parameters),
        ask(client.as_ref(), second_profile, query, parameters),
    );
    Ok(Comparison {
        query: query.to_string(),
        first,
        second,
    })
}

#[cfg(test)]
mod tests {
    use agentflow_core::message::Role;
    use agentflow_llm::{ChatResponse, FnChat, LlmError, echo_chat};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::profile::rosters;

    #[tokio::test]
    async fn test_session_keeps_history_per_agent() {
        let mut session = ChatSession::new(Some(Arc::new(echo_chat())), rosters::assistants());

        let reply = session.send("Agent 1", "what is RAG?").await.unwrap();
        assert_eq!(reply, "echo:what is RAG?");
        session.send("Agent 2", "fix my code").await.unwrap();
        session.send("Agent 1", "and agents?").await.unwrap();

        let history = session.history("Agent 1").unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history.messages()[3].text(), "echo:and agents?");
        assert_eq!(session.history("Agent 2").unwrap().len(), 2);

        session.clear();
        assert!(session.history("Agent 1").is_none());
    }

    #[tokio::test]
    async fn test_session_without_client_records_warning() {
        let mut session = ChatSession::new(None, rosters::assistants());
        let reply = session.send("Agent 3", "a poem").await.unwrap();

        assert_eq!(reply, NOT_CONFIGURED_REPLY);
        let last = session.history("Agent 3").unwrap().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_unknown_agent_is_an_error() {
        let mut session = ChatSession::new(None, rosters::assistants());
        let err = session.send("Agent 9", "hi").await.unwrap_err();
        assert!(err.is_user_error());
    }

    #[tokio::test]
    async fn test_model_failure_is_inline() {
        let chat = FnChat::new(|_request| Err(LlmError::api(401, "invalid key")));
        let mut session = ChatSession::new(Some(Arc::new(chat)), rosters::assistants());

        let reply = session.send("Agent 1", "hi").await.unwrap();
        assert_eq!(reply, "Error: API error (401): invalid key");
    }

    #[tokio::test]
    async fn test_compare_uses_each_system_prompt() {
        let chat = FnChat::new(|request: agentflow_llm::ChatRequest| {
            let system = request.messages[0].text().to_string();
            let opener = system.split_whitespace().take(4).collect::<Vec<_>>().join(" ");
            Ok(ChatResponse::from_text(opener))
        });
        let roster = rosters::advanced();

        let comparison = compare(Arc::new(chat), &roster, "Analyst", "Critic", "q")
            .await
            .unwrap();
        assert_eq!(comparison.first.text, "You are a data");
        assert_eq!(comparison.second.text, "You are a critical");
        assert_eq!(comparison.second.icon, "🔍");
    }

    #[tokio::test]
    async fn test_compare_rejects_same_agent() {
        let roster = rosters::advanced();
        let result = compare(Arc::new(echo_chat()), &roster, "Critic", "Critic", "q").await;
        assert!(result.is_err());
    }
}
