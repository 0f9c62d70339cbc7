//! Tool-calling agent.
//!
//! The model/tool round trip is an explicit state machine run by
//! [`SimpleFlow`]:
//!
//! ```text
//! AwaitingModel -> ExecutingTools -> AwaitingModel -> ... -> Done
//!               \-> Failed          \-> Exhausted (iteration cap)
//! ```

use std::{fmt, sync::Arc};

use agentflow_core::{
    context::Context,
    error::Result as FlowResultT,
    flow::SimpleFlow,
    message::{Message, ToolCall},
    node::Node,
    state::FlowState,
};
use agentflow_llm::{ChatCompletion, ChatRequest};
use agentflow_tools::{
    ToolContext, ToolError, ToolRegistry,
    conference::{DEFAULT_LATENCY, conference_registry},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::error::{AgentError, Result, inline_error};

/// Default cap on model round trips.
pub const DEFAULT_MAX_ITERATIONS: usize = 5;

/// Response recorded when the iteration cap is hit.
pub const MAX_ITERATIONS_REPLY: &str = "Maximum iterations reached";

/// System prompt of the conference assistant.
pub const CONFERENCE_ASSISTANT_PROMPT: &str = "You are a helpful conference assistant. You help attendees prepare for conferences.
When asked about conference preparation, use the available tools to gather information about:
- Weather conditions
- Venue details
- Travel times
Then provide comprehensive, personalized advice based on the tool results.";

const ITERATIONS_KEY: &str = "iterations";
const PENDING_KEY: &str = "pending_calls";
const RESPONSE_KEY: &str = "response";
const RECORDS_KEY: &str = "tool_calls";

/// States of the tool loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolLoopState {
    AwaitingModel,
    ExecutingTools,
    Done,
    Exhausted,
    Failed,
}

impl FlowState for ToolLoopState {
    fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Exhausted | Self::Failed)
    }
}

/// One tool invocation as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub name: String,
    pub arguments: Value,
    pub status: String,
    pub result: Value,
}

/// Outcome of a tool-agent run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRunOutcome {
    pub response: String,
    pub tool_calls: Vec<ToolCallRecord>,
    pub iterations: usize,
    pub final_state: ToolLoopState,
}

struct ModelTurnNode {
    client: Arc<dyn ChatCompletion>,
    registry: ToolRegistry,
    max_iterations: usize,
}

impl fmt::Debug for ModelTurnNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelTurnNode")
            .field("model", &self.client.model())
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}

#[async_trait]
impl Node for ModelTurnNode {
    type State = ToolLoopState;

    async fn execute(&self, mut context: Context) -> FlowResultT<(Context, ToolLoopState)> {
        let iterations: usize = context.get_json(ITERATIONS_KEY)?.unwrap_or(0);
        if iterations >= self.max_iterations {
            warn!(iterations, "tool loop hit the iteration cap");
            context.set(RESPONSE_KEY, MAX_ITERATIONS_REPLY)?;
            return Ok((context, ToolLoopState::Exhausted));
        }
        context.set(ITERATIONS_KEY, iterations + 1)?;

        let request = ChatRequest::new(context.conversation().messages().to_vec())
            .with_tools(self.registry.specs().await);

        let response = match self.client.complete(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "model call failed in tool loop");
                context.set(RESPONSE_KEY, inline_error(&err))?;
                return Ok((context, ToolLoopState::Failed));
            }
        };

        let Some(message) = response.into_message() else {
            context.set(RESPONSE_KEY, "")?;
            return Ok((context, ToolLoopState::Done));
        };

        if message.has_tool_calls() {
            info!(
                iteration = iterations + 1,
                calls = message.tool_calls.len(),
                "model requested tools"
            );
            context.set(PENDING_KEY, &message.tool_calls)?;
            context.push_message(Message::assistant_with_tools(
                message.content.clone(),
                message.tool_calls.clone(),
            ));
            Ok((context, ToolLoopState::ExecutingTools))
        } else {
            context.set(RESPONSE_KEY, message.text())?;
            context.push_message(message);
            Ok((context, ToolLoopState::Done))
        }
    }

    fn name(&self) -> String {
        "model_turn".to_string()
    }
}

struct ToolExecutionNode {
    registry: ToolRegistry,
    tool_context: ToolContext,
}

impl fmt::Debug for ToolExecutionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolExecutionNode")
            .field("session_id", &self.tool_context.session_id)
            .finish()
    }
}

impl ToolExecutionNode {
    async fn run_call(&self, call: &ToolCall) -> (Value, Value) {
        let arguments: Value = match serde_json::from_str(&call.function.arguments) {
            Ok(arguments) => arguments,
            Err(err) => {
                let payload = json!({ "error": format!("Invalid arguments: {err}") });
                return (Value::String(call.function.arguments.clone()), payload);
            }
        };

        let payload = match self
            .registry
            .execute_tool(&call.function.name, &arguments, &self.tool_context)
            .await
        {
            Ok(result) => result.to_payload(),
            Err(ToolError::NotFound(_)) => json!({ "error": "Unknown tool" }),
            Err(err) => json!({ "error": err.to_string() }),
        };
        (arguments, payload)
    }
}

#[async_trait]
impl Node for ToolExecutionNode {
    type State = ToolLoopState;

    async fn execute(&self, mut context: Context) -> FlowResultT<(Context, ToolLoopState)> {
        let calls: Vec<ToolCall> = context.get_json(PENDING_KEY)?.unwrap_or_default();
        context.remove_json(PENDING_KEY);
        let mut records: Vec<ToolCallRecord> = context.get_json(RECORDS_KEY)?.unwrap_or_default();

        for call in &calls {
            info!(tool = %call.function.name, "executing tool call");
            let (arguments, result) = self.run_call(call).await;
            context.push_message(Message::tool_result(call, result.to_string()));
            records.push(ToolCallRecord {
                name: call.function.name.clone(),
                arguments,
                status: "completed".to_string(),
                result,
            });
        }

        context.set(RECORDS_KEY, &records)?;
        Ok((context, ToolLoopState::AwaitingModel))
    }

    fn name(&self) -> String {
        "tool_execution".to_string()
    }
}

/// An agent that lets the model call registered tools before answering.
pub struct ToolAgent {
    client: Arc<dyn ChatCompletion>,
    registry: ToolRegistry,
    system_prompt: String,
    max_iterations: usize,
    tool_context: ToolContext,
}

impl ToolAgent {
    pub fn new(client: Arc<dyn ChatCompletion>, registry: ToolRegistry) -> Self {
        Self {
            client,
            registry,
            system_prompt: CONFERENCE_ASSISTANT_PROMPT.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tool_context: ToolContext::new(),
        }
    }

    /// The conference assistant with its three simulated tools.
    pub async fn conference(client: Arc<dyn ChatCompletion>) -> Result<Self> {
        let registry = conference_registry().await?;
        Ok(Self::new(client, registry)
            .with_tool_context(ToolContext::new().with_simulated_latency(DEFAULT_LATENCY)))
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tool_context(mut self, tool_context: ToolContext) -> Self {
        self.tool_context = tool_context;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    fn flow(&self) -> Result<SimpleFlow<ToolLoopState>> {
        let flow = SimpleFlow::builder()
            .name("tool_agent")
            .initial_state(ToolLoopState::AwaitingModel)
            .max_steps(2 * self.max_iterations + 2)
            .node(
                ToolLoopState::AwaitingModel,
                ModelTurnNode {
                    client: self.client.clone(),
                    registry: self.registry.clone(),
                    max_iterations: self.max_iterations,
                },
            )
            .node(
                ToolLoopState::ExecutingTools,
                ToolExecutionNode {
                    registry: self.registry.clone(),
                    tool_context: self.tool_context.clone(),
                },
            )
            .build()?;
        Ok(flow)
    }

    /// Answer `user_message`, calling tools as the model requests.
    pub async fn run(&self, user_message: &str) -> Result<ToolRunOutcome> {
        let mut context = Context::new();
        context.push_message(Message::system(&self.system_prompt));
        context.push_message(Message::user(user_message));

        let result = self.flow()?.execute(context).await?;
        if let Some(error) = result.error {
            return Err(AgentError::coordination(error));
        }

        let context = result.context;
        let outcome = ToolRunOutcome {
            response: context.get_json(RESPONSE_KEY)?.unwrap_or_default(),
            tool_calls: context.get_json(RECORDS_KEY)?.unwrap_or_default(),
            iterations: context.get_json(ITERATIONS_KEY)?.unwrap_or(0),
            final_state: result.final_state,
        };
        info!(
            iterations = outcome.iterations,
            tool_calls = outcome.tool_calls.len(),
            state = ?outcome.final_state,
            "tool agent finished"
        );
        Ok(outcome)
    }
}
