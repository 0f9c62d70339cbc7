//! Multi-agent orchestration.
//!
//! A workflow runs an ordered list of agents against one query and collects
//! exactly one output per agent, in order. Failed calls are recorded as
//! inline error text and never stop the run.

use std::{sync::Arc, time::Instant};

use agentflow_core::message::Message;
use agentflow_llm::{ChatCompletion, ModelParameters};
use futures::future::join_all;
use serde::{
    Deserialize, Serialize, Serializer,
    ser::SerializeMap,
};
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{error, info};

use crate::{
    chat::{AgentOutput, complete_inline},
    error::{Result, inline_error},
    profile::{AgentProfile, Roster},
};

/// How earlier outputs are presented to later agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextStyle {
    /// One user message: each prior output as `[key]: text` on its own line,
    /// followed by the query.
    #[default]
    Threaded,
    /// The query as a user message followed by each prior output as an
    /// assistant message `[key]: text`.
    Transcript,
    /// A team briefing naming each prior contributor, then the agent's task.
    Briefing,
}

impl ContextStyle {
    /// Messages sent to `profile` given the outputs produced before it.
    pub fn messages(&self, profile: &AgentProfile, query: &str, prior: &[AgentOutput]) -> Vec<Message> {
        let mut messages = vec![Message::system(&profile.system_prompt)];
        match self {
            ContextStyle::Threaded => {
                let mut content = String::new();
                for output in prior {
                    content.push_str(&format!("[{}]: {}\n", output.key, output.text));
                }
                content.push_str(query);
                messages.push(Message::user(content));
            }
            ContextStyle::Transcript => {
                messages.push(Message::user(query));
                messages.extend(
                    prior
                        .iter()
                        .map(|output| Message::assistant(format!("[{}]: {}", output.key, output.text))),
                );
            }
            ContextStyle::Briefing if prior.is_empty() => {
                messages.push(Message::user(format!(
                    "As the {}, analyze this: {query}",
                    profile.name
                )));
            }
            ContextStyle::Briefing => {
                let summary = prior
                    .iter()
                    .map(|output| format!("**{}:**\n{}", output.name, output.text))
                    .collect::<Vec<_>>()
                    .join("\n\n");
                messages.push(Message::user(format!(
                    "Based on the following context from other team members:\n\n{summary}\n\nNow, as the {}, provide your contribution for: {query}",
                    profile.name
                )));
            }
        }
        messages
    }
}

/// Which agents run and how their context is shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowMode {
    /// Every agent sees all earlier outputs.
    Sequential(Vec<String>),
    /// The phase agents run concurrently without seeing each other; the
    /// reviewer then sees every phase output.
    ParallelThenReview {
        parallel: Vec<String>,
        reviewer: String,
    },
}

impl WorkflowMode {
    pub fn sequential<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Sequential(roles.into_iter().map(Into::into).collect())
    }

    pub fn parallel_then_review<I, S>(parallel: I, reviewer: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ParallelThenReview {
            parallel: parallel.into_iter().map(Into::into).collect(),
            reviewer: reviewer.into(),
        }
    }

    /// Every role in execution order.
    pub fn roles(&self) -> Vec<&str> {
        match self {
            Self::Sequential(roles) => roles.iter().map(String::as_str).collect(),
            Self::ParallelThenReview { parallel, reviewer } => parallel
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(reviewer.as_str()))
                .collect(),
        }
    }

    /// All roster agents in sequence.
    pub fn all_sequential(roster: &Roster) -> Self {
        Self::sequential(roster.keys())
    }

    /// All but the last roster agent in parallel, the last one reviewing.
    pub fn review_by_last(roster: &Roster) -> Self {
        let mut keys = roster.keys();
        let reviewer = keys.pop().unwrap_or_default();
        Self::parallel_then_review(keys, reviewer)
    }
}

/// Ordered mapping from agent key to output text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkflowResult {
    outputs: Vec<AgentOutput>,
}

impl WorkflowResult {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.outputs
            .iter()
            .find(|output| output.key == key)
            .map(|output| output.text.as_str())
    }

    pub fn outputs(&self) -> &[AgentOutput] {
        &self.outputs
    }

    pub fn keys(&self) -> Vec<&str> {
        self.outputs.iter().map(|output| output.key.as_str()).collect()
    }

    /// `(key, text)` pairs in execution order.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.outputs
            .iter()
            .map(|output| (output.key.as_str(), output.text.as_str()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// Number of agents whose output is an inline error.
    pub fn failures(&self) -> usize {
        self.outputs.iter().filter(|output| output.failed).count()
    }

    /// Pretty JSON object `{key: text}` in execution order.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// A repeated key replaces the earlier output in its original position.
    fn push(&mut self, output: AgentOutput) {
        match self.outputs.iter_mut().find(|existing| existing.key == output.key) {
            Some(existing) => *existing = output,
            None => self.outputs.push(output),
        }
    }
}

impl Serialize for WorkflowResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.outputs.len()))?;
        for output in &self.outputs {
            map.serialize_entry(&output.key, &output.text)?;
        }
        map.end()
    }
}

/// Progress notifications emitted while a workflow runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    AgentStart {
        agent: String,
        agent_name: String,
        icon: String,
    },
    AgentComplete {
        agent: String,
        agent_name: String,
        icon: String,
        result: String,
    },
    WorkflowComplete {
        results: WorkflowResult,
    },
    WorkflowFailed {
        error: String,
    },
}

impl WorkflowEvent {
    fn start(profile: &AgentProfile) -> Self {
        Self::AgentStart {
            agent: profile.key.clone(),
            agent_name: profile.name.clone(),
            icon: profile.icon.clone(),
        }
    }

    fn complete(output: &AgentOutput) -> Self {
        Self::AgentComplete {
            agent: output.key.clone(),
            agent_name: output.name.clone(),
            icon: output.icon.clone(),
            result: output.text.clone(),
        }
    }
}

fn emit(events: Option<&UnboundedSender<WorkflowEvent>>, event: WorkflowEvent) {
    if let Some(events) = events {
        // A dropped receiver only means nobody is watching.
        let _ = events.send(event);
    }
}

/// Runs workflows over a roster with an injected chat capability.
pub struct Orchestrator {
    client: Arc<dyn ChatCompletion>,
    roster: Roster,
    style: ContextStyle,
    parameters: ModelParameters,
}

impl Orchestrator {
    pub fn new(client: Arc<dyn ChatCompletion>, roster: Roster) -> Self {
        Self {
            client,
            roster,
            style: ContextStyle::default(),
            parameters: ModelParameters::default(),
        }
    }

    pub fn with_style(mut self, style: ContextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_parameters(mut self, parameters: ModelParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Run a workflow and return the outputs.
    ///
    /// Fails only when a role is missing from the roster, before any call.
    pub async fn run(&self, mode: &WorkflowMode, query: &str) -> Result<WorkflowResult> {
        self.execute(mode, query, None).await
    }

    /// Run a workflow, reporting progress on `events`.
    pub async fn run_with_events(
        &self,
        mode: &WorkflowMode,
        query: &str,
        events: UnboundedSender<WorkflowEvent>,
    ) -> Result<WorkflowResult> {
        let outcome = self.execute(mode, query, Some(&events)).await;
        match &outcome {
            Ok(results) => emit(
                Some(&events),
                WorkflowEvent::WorkflowComplete {
                    results: results.clone(),
                },
            ),
            Err(err) => emit(
                Some(&events),
                WorkflowEvent::WorkflowFailed {
                    error: err.to_string(),
                },
            ),
        }
        outcome
    }

    /// Run a workflow in the background and stream its events.
    ///
    /// The stream ends after `WorkflowComplete` or `WorkflowFailed`.
    pub fn stream(
        self: Arc<Self>,
        mode: WorkflowMode,
        query: impl Into<String>,
    ) -> UnboundedReceiverStream<WorkflowEvent> {
        let (sender, receiver) = unbounded_channel();
        let query = query.into();
        tokio::spawn(async move {
            if let Err(err) = self.run_with_events(&mode, &query, sender).await {
                error!(error = %err, "workflow aborted");
            }
        });
        UnboundedReceiverStream::new(receiver)
    }

    async fn execute(
        &self,
        mode: &WorkflowMode,
        query: &str,
        events: Option<&UnboundedSender<WorkflowEvent>>,
    ) -> Result<WorkflowResult> {
        let profiles = mode
            .roles()
            .into_iter()
            .map(|key| self.roster.require(key).cloned())
            .collect::<Result<Vec<_>>>()?;

        let start_time = Instant::now();
        info!(roles = profiles.len(), style = ?self.style, "starting workflow");

        let mut results = WorkflowResult::default();
        match mode {
            WorkflowMode::Sequential(_) => {
                for profile in &profiles {
                    let output = self.call_with_context(profile, query, &results, events).await;
                    results.push(output);
                }
            }
            WorkflowMode::ParallelThenReview { parallel, .. } => {
                let (phase, review) = profiles.split_at(parallel.len());
                for output in self.run_phase(phase, query, events).await {
                    results.push(output);
                }
                for profile in review {
                    let output = self.call_with_context(profile, query, &results, events).await;
                    results.push(output);
                }
            }
        }

        info!(
            roles = results.len(),
            failures = results.failures(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "workflow completed"
        );
        Ok(results)
    }

    async fn call_with_context(
        &self,
        profile: &AgentProfile,
        query: &str,
        prior: &WorkflowResult,
        events: Option<&UnboundedSender<WorkflowEvent>>,
    ) -> AgentOutput {
        emit(events, WorkflowEvent::start(profile));
        info!(agent = %profile.key, prior = prior.len(), "consulting agent");

        let messages = self.style.messages(profile, query, prior.outputs());
        let (text, failed) = complete_inline(self.client.as_ref(), messages, self.parameters).await;
        let output = AgentOutput::new(profile, text, failed);

        emit(events, WorkflowEvent::complete(&output));
        output
    }

    /// Run agents that must not see each other's output concurrently.
    async fn run_phase(
        &self,
        phase: &[AgentProfile],
        query: &str,
        events: Option<&UnboundedSender<WorkflowEvent>>,
    ) -> Vec<AgentOutput> {
        info!("Executing {} agents in parallel", phase.len());

        let handles: Vec<_> = phase
            .iter()
            .map(|profile| {
                emit(events, WorkflowEvent::start(profile));
                let client = self.client.clone();
                let messages = self.style.messages(profile, query, &[]);
                let parameters = self.parameters;
                tokio::spawn(async move {
                    complete_inline(client.as_ref(), messages, parameters).await
                })
            })
            .collect();

        let replies = join_all(handles).await;
        let mut outputs = Vec::with_capacity(phase.len());
        for (profile, reply) in phase.iter().zip(replies) {
            let (text, failed) = match reply {
                Ok(reply) => reply,
                Err(err) => {
                    error!(agent = %profile.key, "Agent task join error: {}", err);
                    (inline_error(&err), true)
                }
            };
            let output = AgentOutput::new(profile, text, failed);
            emit(events, WorkflowEvent::complete(&output));
            outputs.push(output);
        }
        outputs
    }
}
