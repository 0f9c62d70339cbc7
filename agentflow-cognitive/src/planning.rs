//! Task planning: decompose, execute step by step, reflect.
//!
//! [`Planner::run`] drives the phases as a [`SimpleFlow`] over
//! [`PlanState`], executing one plan step per node visit.

use std::{fmt, sync::Arc};

use agentflow_core::{
    context::Context,
    error::Result as FlowResultT,
    flow::SimpleFlow,
    message::Message,
    node::Node,
    state::FlowState,
};
use agentflow_llm::{ChatCompletion, ChatRequest, ModelParameters, ResponseFormat};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::error::{CognitiveError, Result};

const PLANNER_PROMPT: &str = r#"You are an expert task planner. Your job is to break down complex tasks into clear, actionable steps.

For each task, create a plan with:
1. A brief analysis of the task
2. 4-6 specific, actionable steps
3. Expected outcome for each step

Format your response as JSON:
{
    "analysis": "Brief analysis of the task",
    "steps": [
        {
            "step_number": 1,
            "title": "Step title",
            "description": "What to do",
            "expected_outcome": "What should result"
        }
    ],
    "success_criteria": "How to know if the task is complete"
}

Be specific and practical. Each step should be clear enough to execute."#;

const EXECUTOR_PROMPT: &str = "You are an expert executor. You receive a step from a plan and execute it thoughtfully.

For each step:
1. Consider the context and previous results
2. Execute the step thoroughly
3. Provide concrete, actionable output
4. Note any challenges or insights

Keep your response focused and practical (2-3 paragraphs max).";

const REFLECTION_PROMPT: &str = "You are a reflective analyst. Review the task execution and provide insights.

Analyze:
1. What went well
2. What could be improved
3. Key learnings
4. Next steps or recommendations

Be concise (3-4 key points total).";

const TASK_KEY: &str = "task";
const PLAN_KEY: &str = "plan";
const RESULTS_KEY: &str = "execution_results";
const REFLECTION_KEY: &str = "reflection";

/// Sample tasks offered by the planning demo.
pub const SAMPLE_TASKS: [(&str, &str); 3] = [
    (
        "launch_campaign",
        "Plan and execute a social media campaign for launching a new AI-powered mobile app targeting young professionals",
    ),
    (
        "market_research",
        "Conduct comprehensive market research for entering the AI education space with online courses",
    ),
    (
        "build_mvp",
        "Plan the development of an MVP for a SaaS platform that helps small businesses manage customer relationships",
    ),
];

fn plan_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "analysis": { "type": "string" },
            "steps": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "step_number": { "type": "integer" },
                        "title": { "type": "string" },
                        "description": { "type": "string" },
                        "expected_outcome": { "type": "string" }
                    },
                    "required": ["step_number", "title", "description"]
                }
            },
            "success_criteria": { "type": "string" }
        },
        "required": ["analysis", "steps"]
    })
}

/// One step of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    pub step_number: u32,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub expected_outcome: String,
}

/// A decomposed task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPlan {
    pub analysis: String,
    pub steps: Vec<PlanStep>,
    #[serde(default)]
    pub success_criteria: String,
    /// Set when planning failed; such a plan has no steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskPlan {
    /// The plan recorded when planning fails.
    pub fn failed(error: impl fmt::Display) -> Self {
        Self {
            analysis: "Failed to create plan".to_string(),
            steps: Vec::new(),
            success_criteria: "N/A".to_string(),
            error: Some(error.to_string()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Parse and validate the model's JSON plan.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let schema = plan_schema();
        let validator = jsonschema::Validator::new(&schema)
            .map_err(|e| CognitiveError::planning(format!("Planning schema compile error: {e}")))?;
        validator
            .validate(&value)
            .map_err(|e| CognitiveError::planning(format!("Planning JSON invalid: {e}")))?;
        Ok(serde_json::from_value(value)?)
    }
}

/// Output of one executed step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub step_number: u32,
    pub title: String,
    pub result: String,
    #[serde(default)]
    pub failed: bool,
}

/// How far a planning run goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanMode {
    PlanOnly,
    PlanAndExecute,
    #[default]
    PlanExecuteReflect,
}

impl PlanMode {
    fn executes(&self) -> bool {
        !matches!(self, Self::PlanOnly)
    }

    fn reflects(&self) -> bool {
        matches!(self, Self::PlanExecuteReflect)
    }
}

/// Phases of a planning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanState {
    Planning,
    Executing,
    Reflecting,
    Complete,
    /// Planning failed; nothing else ran.
    Halted,
}

impl FlowState for PlanState {
    fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Halted)
    }
}

/// Everything a planning run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningReport {
    pub task: String,
    pub plan: TaskPlan,
    pub execution_results: Vec<StepResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reflection: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl PlanningReport {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn preview(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Plans and executes tasks with a chat model.
#[derive(Clone)]
pub struct Planner {
    client: Arc<dyn ChatCompletion>,
    parameters: ModelParameters,
}

impl fmt::Debug for Planner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Planner")
            .field("model", &self.client.model())
            .field("parameters", &self.parameters)
            .finish()
    }
}

impl Planner {
    pub fn new(client: Arc<dyn ChatCompletion>) -> Self {
        Self {
            client,
            parameters: ModelParameters::default().with_temperature(0.7),
        }
    }

    /// Ask the model for a JSON plan. Failures yield [`TaskPlan::failed`].
    pub async fn create_plan(&self, task: &str) -> TaskPlan {
        let request = ChatRequest::new(vec![
            Message::system(PLANNER_PROMPT),
            Message::user(format!("Create a detailed execution plan for this task: {task}")),
        ])
        .with_parameters(self.parameters)
        .with_response_format(ResponseFormat::JsonObject);

        let outcome = match self.client.complete(request).await {
            Ok(response) => match response.text() {
                Some(text) => TaskPlan::from_json_str(text),
                None => Err(CognitiveError::planning("model returned no plan")),
            },
            Err(err) => Err(err.into()),
        };

        match outcome {
            Ok(plan) => {
                info!(steps = plan.steps.len(), "plan created");
                plan
            }
            Err(err) => {
                warn!(error = %err, "planning failed");
                TaskPlan::failed(err)
            }
        }
    }

    /// Execute one step given the results so far.
    pub async fn execute_step(
        &self,
        step: &PlanStep,
        task: &str,
        previous: &[StepResult],
    ) -> StepResult {
        let mut context_summary = String::new();
        if !previous.is_empty() {
            context_summary.push_str("\n\nPrevious steps completed:\n");
            context_summary.push_str(
                &previous
                    .iter()
                    .map(|r| format!("Step {}: {}...", r.step_number, preview(&r.result, 100)))
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
        }

        let prompt = format!(
            "Task Context: {task}\n\nCurrent Step:\n- Title: {}\n- Description: {}\n- Expected Outcome: {}\n{context_summary}\n\nExecute this step and provide the results.",
            step.title, step.description, step.expected_outcome
        );
        let messages = vec![Message::system(EXECUTOR_PROMPT), Message::user(prompt)];

        let (result, failed) = match self.client.complete_text(messages, self.parameters).await {
            Ok(text) => (text, false),
            Err(err) => {
                warn!(step = step.step_number, error = %err, "step execution failed");
                (format!("Error executing step: {err}"), true)
            }
        };
        StepResult {
            step_number: step.step_number,
            title: step.title.clone(),
            result,
            failed,
        }
    }

    /// Review the executed steps.
    pub async fn reflect(&self, task: &str, results: &[StepResult]) -> String {
        let results_summary = results
            .iter()
            .map(|r| {
                format!(
                    "Step {} ({}): {}...",
                    r.step_number,
                    r.title,
                    preview(&r.result, 150)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "Original Task: {task}\n\nExecution Results:\n{results_summary}\n\nProvide your reflection and insights."
        );
        let messages = vec![Message::system(REFLECTION_PROMPT), Message::user(prompt)];

        match self.client.complete_text(messages, self.parameters).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "reflection failed");
                format!("Error in reflection: {err}")
            }
        }
    }

    fn flow(&self, mode: PlanMode) -> Result<SimpleFlow<PlanState>> {
        let flow = SimpleFlow::builder()
            .name("planner")
            .initial_state(PlanState::Planning)
            .node(
                PlanState::Planning,
                PlanningNode {
                    planner: self.clone(),
                    mode,
                },
            )
            .node(
                PlanState::Executing,
                ExecutionNode {
                    planner: self.clone(),
                    mode,
                },
            )
            .node(
                PlanState::Reflecting,
                ReflectionNode {
                    planner: self.clone(),
                },
            )
            .build()?;
        Ok(flow)
    }

    /// Plan `task`, then execute and reflect as `mode` asks.
    pub async fn run(&self, task: &str, mode: PlanMode) -> Result<PlanningReport> {
        let mut context = Context::new();
        context.set(TASK_KEY, task)?;

        let result = self.flow(mode)?.execute(context).await?;
        if let Some(error) = result.error {
            return Err(CognitiveError::planning(error));
        }

        let context = result.context;
        let plan = context
            .get_json(PLAN_KEY)?
            .ok_or_else(|| CognitiveError::planning("planning produced no plan"))?;
        Ok(PlanningReport {
            task: task.to_string(),
            plan,
            execution_results: context.get_json(RESULTS_KEY)?.unwrap_or_default(),
            reflection: context.get_json(REFLECTION_KEY)?,
            timestamp: Utc::now(),
        })
    }
}

#[derive(Debug)]
struct PlanningNode {
    planner: Planner,
    mode: PlanMode,
}

#[async_trait]
impl Node for PlanningNode {
    type State = PlanState;

    async fn execute(&self, mut context: Context) -> FlowResultT<(Context, PlanState)> {
        let task: String = context.require(TASK_KEY)?;
        let plan = self.planner.create_plan(&task).await;
        let failed = plan.is_failed();
        context.set(PLAN_KEY, &plan)?;

        let next = if failed {
            PlanState::Halted
        } else if self.mode.executes() {
            PlanState::Executing
        } else {
            PlanState::Complete
        };
        Ok((context, next))
    }

    fn name(&self) -> String {
        "planning".to_string()
    }
}

#[derive(Debug)]
struct ExecutionNode {
    planner: Planner,
    mode: PlanMode,
}

#[async_trait]
impl Node for ExecutionNode {
    type State = PlanState;

    async fn execute(&self, mut context: Context) -> FlowResultT<(Context, PlanState)> {
        let task: String = context.require(TASK_KEY)?;
        let plan: TaskPlan = context.require(PLAN_KEY)?;
        let mut results: Vec<StepResult> = context.get_json(RESULTS_KEY)?.unwrap_or_default();

        if let Some(step) = plan.steps.get(results.len()) {
            info!(step = step.step_number, total = plan.steps.len(), title = %step.title, "executing step");
            let result = self.planner.execute_step(step, &task, &results).await;
            results.push(result);
            context.set(RESULTS_KEY, &results)?;
        }

        let next = if results.len() < plan.steps.len() {
            PlanState::Executing
        } else if self.mode.reflects() {
            PlanState::Reflecting
        } else {
            PlanState::Complete
        };
        Ok((context, next))
    }

    fn name(&self) -> String {
        "execution".to_string()
    }
}

#[derive(Debug)]
struct ReflectionNode {
    planner: Planner,
}

#[async_trait]
impl Node for ReflectionNode {
    type State = PlanState;

    async fn execute(&self, mut context: Context) -> FlowResultT<(Context, PlanState)> {
        let task: String = context.require(TASK_KEY)?;
        let results: Vec<StepResult> = context.get_json(RESULTS_KEY)?.unwrap_or_default();
        let reflection = self.planner.reflect(&task, &results).await;
        context.set(REFLECTION_KEY, reflection)?;
        Ok((context, PlanState::Complete))
    }

    fn name(&self) -> String {
        "reflection".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use agentflow_llm::{ChatResponse, FnChat, LlmError};
    use pretty_assertions::assert_eq;

    use super::*;

    const PLAN_JSON: &str = r#"{
        "analysis": "Two things to do",
        "steps": [
            {"step_number": 1, "title": "Research", "description": "Look around", "expected_outcome": "Notes"},
            {"step_number": 2, "title": "Write", "description": "Write it up", "expected_outcome": "Draft"}
        ],
        "success_criteria": "Draft exists"
    }"#;

    /// Answers planning requests with `PLAN_JSON` and records every other prompt.
    fn scripted_chat(prompts: Arc<Mutex<Vec<String>>>) -> Arc<dyn ChatCompletion> {
        Arc::new(FnChat::new(move |request: ChatRequest| {
            if request.response_format == Some(ResponseFormat::JsonObject) {
                return Ok(ChatResponse::from_text(PLAN_JSON));
            }
            let prompt = request.last_text().to_string();
            let reply = if prompt.starts_with("Original Task") {
                "reflected".to_string()
            } else {
                "x".repeat(120)
            };
            prompts.lock().unwrap().push(prompt);
            Ok(ChatResponse::from_text(reply))
        }))
    }

    #[test]
    fn test_plan_parsing_validates_shape() {
        let plan = TaskPlan::from_json_str(PLAN_JSON).unwrap();
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[1].title, "Write");

        let missing_steps = TaskPlan::from_json_str(r#"{"analysis": "a"}"#);
        assert!(matches!(missing_steps, Err(CognitiveError::PlanningFailed { .. })));
        assert!(TaskPlan::from_json_str("not json").is_err());
    }

    #[tokio::test]
    async fn test_failed_plan_shape() {
        let planner = Planner::new(Arc::new(FnChat::new(|_request: ChatRequest| {
            Ok(ChatResponse::from_text("I cannot do JSON"))
        })));

        let plan = planner.create_plan("anything").await;
        assert_eq!(plan.analysis, "Failed to create plan");
        assert!(plan.steps.is_empty());
        assert_eq!(plan.success_criteria, "N/A");
        assert!(plan.error.is_some());
    }

    #[tokio::test]
    async fn test_plan_request_uses_json_format() {
        let planner = Planner::new(Arc::new(FnChat::new(|request: ChatRequest| {
            assert_eq!(request.response_format, Some(ResponseFormat::JsonObject));
            assert_eq!(request.temperature, Some(0.7));
            assert_eq!(
                request.last_text(),
                "Create a detailed execution plan for this task: ship it"
            );
            Ok(ChatResponse::from_text(PLAN_JSON))
        })));
        assert!(!planner.create_plan("ship it").await.is_failed());
    }

    #[tokio::test]
    async fn test_full_run_summarises_previous_steps() {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let planner = Planner::new(scripted_chat(prompts.clone()));

        let report = planner.run("write a report", PlanMode::PlanExecuteReflect).await.unwrap();

        assert_eq!(report.execution_results.len(), 2);
        assert_eq!(report.reflection.as_deref(), Some("reflected"));

        let prompts = prompts.lock().unwrap();
        assert_eq!(prompts.len(), 3);
        assert!(!prompts[0].contains("Previous steps completed"));
        assert!(prompts[1].contains(&format!("Previous steps completed:\nStep 1: {}...", "x".repeat(100))));
        assert!(prompts[2].contains(&format!("Step 1 (Research): {}...", "x".repeat(120))));
    }

    #[tokio::test]
    async fn test_plan_only_skips_execution() {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let planner = Planner::new(scripted_chat(prompts.clone()));

        let report = planner.run("t", PlanMode::PlanOnly).await.unwrap();
        assert_eq!(report.plan.steps.len(), 2);
        assert!(report.execution_results.is_empty());
        assert!(report.reflection.is_none());
        assert!(prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_plan_halts() {
        let planner = Planner::new(Arc::new(FnChat::new(|_request: ChatRequest| {
            Err(LlmError::api(500, "down"))
        })));

        let report = planner.run("t", PlanMode::PlanExecuteReflect).await.unwrap();
        assert!(report.plan.is_failed());
        assert!(report.execution_results.is_empty());
        assert!(report.reflection.is_none());
    }

    #[tokio::test]
    async fn test_step_failure_is_inline() {
        let planner = Planner::new(Arc::new(FnChat::new(|request: ChatRequest| {
            if request.response_format.is_some() {
                Ok(ChatResponse::from_text(PLAN_JSON))
            } else {
                Err(LlmError::api(429, "slow down"))
            }
        })));

        let report = planner.run("t", PlanMode::PlanExecuteReflect).await.unwrap();
        assert_eq!(
            report.execution_results[0].result,
            "Error executing step: API error (429): slow down"
        );
        assert!(report.execution_results.iter().all(|r| r.failed));
        assert_eq!(
            report.reflection.as_deref(),
            Some("Error in reflection: API error (429): slow down")
        );
    }
}
