//! State-machine flow execution.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use crate::{
    context::Context,
    error::{FlowError, Result},
    node::Node,
    state::FlowState,
};

/// Default cap on node executions for a single run.
pub const DEFAULT_MAX_STEPS: usize = 1000;

/// Flow execution result.
#[derive(Debug, Clone)]
pub struct FlowResult<S: FlowState> {
    /// Final execution state.
    pub final_state: S,
    /// Final context after execution.
    pub context: Context,
    /// Total execution time.
    pub duration: Duration,
    /// Number of node executions.
    pub steps: usize,
    /// Whether the flow completed successfully.
    pub success: bool,
    /// Any error that occurred.
    pub error: Option<String>,
}

/// Runs nodes keyed by state until a terminal state is reached.
pub struct SimpleFlow<S: FlowState> {
    nodes: HashMap<S, Arc<dyn Node<State = S>>>,
    initial_state: S,
    max_steps: usize,
    name: String,
}

impl<S: FlowState> SimpleFlow<S> {
    /// Create a new flow builder.
    pub fn builder() -> SimpleFlowBuilder<S> {
        SimpleFlowBuilder::new()
    }

    /// Execute the flow.
    ///
    /// A node error ends the run with `success == false`; the context is kept
    /// as it was before the failing node.
    pub async fn execute(&self, mut context: Context) -> Result<FlowResult<S>> {
        let start_time = Instant::now();
        let mut current_state = self.initial_state.clone();
        let mut steps = 0;

        loop {
            if current_state.is_terminal() {
                return Ok(FlowResult {
                    final_state: current_state,
                    context,
                    duration: start_time.elapsed(),
                    steps,
                    success: true,
                    error: None,
                });
            }

            if steps >= self.max_steps {
                return Err(FlowError::MaxStepsExceeded {
                    limit: self.max_steps,
                });
            }
            steps += 1;

            let node = self.nodes.get(&current_state).ok_or_else(|| {
                FlowError::execution(format!("No node found for state: {current_state:?}"))
            })?;

            #[cfg(feature = "tracing")]
            tracing::debug!(flow = %self.name, node = %node.name(), step = steps, "executing node");

            let snapshot = context.clone();
            match node.execute(context).await {
                Ok((new_context, new_state)) => {
                    context = new_context;
                    current_state = new_state;
                }
                Err(error) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(flow = %self.name, node = %node.name(), %error, "node failed");

                    return Ok(FlowResult {
                        final_state: current_state,
                        context: snapshot,
                        duration: start_time.elapsed(),
                        steps,
                        success: false,
                        error: Some(error.to_string()),
                    });
                }
            }
        }
    }

    /// Get the flow name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configured step cap.
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }
}

/// Builder for SimpleFlow.
pub struct SimpleFlowBuilder<S: FlowState> {
    nodes: HashMap<S, Arc<dyn Node<State = S>>>,
    initial_state: Option<S>,
    max_steps: usize,
    name: String,
}

impl<S: FlowState> SimpleFlowBuilder<S> {
    /// Create a new flow builder.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            initial_state: None,
            max_steps: DEFAULT_MAX_STEPS,
            name: "simple_flow".to_string(),
        }
    }

    /// Set the flow name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Add a node for a specific state.
    pub fn node(mut self, state: S, node: impl Node<State = S> + 'static) -> Self {
        self.nodes.insert(state, Arc::new(node));
        self
    }

    /// Set the initial state.
    pub fn initial_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Override the step cap.
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Build the flow.
    pub fn build(self) -> Result<SimpleFlow<S>> {
        let initial_state = self
            .initial_state
            .ok_or_else(|| FlowError::construction("Initial state not set"))?;

        if self.nodes.is_empty() {
            return Err(FlowError::construction("No nodes added to flow"));
        }

        Ok(SimpleFlow {
            nodes: self.nodes,
            initial_state,
            max_steps: self.max_steps,
            name: self.name,
        })
    }
}

impl<S: FlowState> Default for SimpleFlowBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{node::helpers, state::SimpleState};

    #[tokio::test]
    async fn build_requires_initial_state_and_nodes() {
        let flow = SimpleFlowBuilder::<SimpleState>::new().build();
        assert!(flow.is_err());

        let flow = SimpleFlowBuilder::new()
            .initial_state(SimpleState::Start)
            .build();
        assert!(flow.is_err());
    }

    #[tokio::test]
    async fn runs_until_terminal_state() {
        let start = helpers::fn_node("start", |mut ctx: Context| async move {
            ctx.set("visited_start", true)?;
            Ok((ctx, SimpleState::Processing))
        });
        let process = helpers::fn_node("process", |ctx: Context| async move {
            Ok((ctx, SimpleState::Success))
        });

        let flow = SimpleFlow::builder()
            .name("two_step")
            .initial_state(SimpleState::Start)
            .node(SimpleState::Start, start)
            .node(SimpleState::Processing, process)
            .build()
            .unwrap();

        let result = flow.execute(Context::new()).await.unwrap();
        assert!(result.success);
        assert_eq!(result.final_state, SimpleState::Success);
        assert_eq!(result.steps, 2);
        assert_eq!(
            result.context.get_json::<bool>("visited_start").unwrap(),
            Some(true)
        );
    }

    #[tokio::test]
    async fn execute_missing_node_yields_error() {
        let flow = SimpleFlowBuilder::new()
            .initial_state(SimpleState::Start)
            .node(
                SimpleState::Processing,
                helpers::fn_node("p", |ctx: Context| async move {
                    Ok((ctx, SimpleState::Success))
                }),
            )
            .build()
            .unwrap();

        let err = flow.execute(Context::new()).await.err().unwrap();
        assert!(err.to_string().contains("No node found for state"));
    }

    #[tokio::test]
    async fn node_error_keeps_previous_context() {
        let failing = helpers::fn_node("failing", |_ctx: Context| async move {
            Err::<(Context, SimpleState), _>(FlowError::execution("boom"))
        });

        let flow = SimpleFlowBuilder::new()
            .initial_state(SimpleState::Start)
            .node(SimpleState::Start, failing)
            .build()
            .unwrap();

        let mut context = Context::new();
        context.set("kept", 1).unwrap();
        let result = flow.execute(context).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.final_state, SimpleState::Start);
        assert!(result.error.unwrap().contains("boom"));
        assert_eq!(result.context.get_json::<i32>("kept").unwrap(), Some(1));
    }

    #[tokio::test]
    async fn exceeds_max_steps_returns_error() {
        let looping = helpers::fn_node("loop", |ctx: Context| async move {
            Ok((ctx, SimpleState::Processing))
        });

        let flow = SimpleFlowBuilder::new()
            .initial_state(SimpleState::Processing)
            .node(SimpleState::Processing, looping)
            .max_steps(7)
            .build()
            .unwrap();

        let err = flow.execute(Context::new()).await.err().unwrap();
        assert!(matches!(err, FlowError::MaxStepsExceeded { limit: 7 }));
        assert!(err.to_string().contains("maximum steps"));
    }
}
