//! Node abstraction for agentflow flows.

use std::{fmt::Debug, future::Future, marker::PhantomData, pin::Pin};

use async_trait::async_trait;

use crate::{context::Context, error::Result, state::FlowState};

/// Trait for flow nodes.
///
/// A node represents a unit of work in a flow. It takes a context,
/// performs some operation, and returns an updated context along with
/// the next state.
#[async_trait]
pub trait Node: Send + Sync + Debug {
    /// The state type this node works with.
    type State: FlowState;

    /// Execute the node's logic.
    async fn execute(&self, context: Context) -> Result<(Context, Self::State)>;

    /// Get the name of this node for debugging/logging.
    fn name(&self) -> String {
        format!("{self:?}")
    }
}

/// Boxed future returned by [`FnNode`] closures.
pub type NodeFuture<S> = Pin<Box<dyn Future<Output = Result<(Context, S)>> + Send>>;

/// A simple functional node that wraps a closure.
pub struct FnNode<F, S>
where
    F: Fn(Context) -> NodeFuture<S> + Send + Sync,
    S: FlowState,
{
    func: F,
    name: String,
    _phantom: PhantomData<S>,
}

impl<F, S> Debug for FnNode<F, S>
where
    F: Fn(Context) -> NodeFuture<S> + Send + Sync,
    S: FlowState,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnNode").field("name", &self.name).finish()
    }
}

impl<F, S> FnNode<F, S>
where
    F: Fn(Context) -> NodeFuture<S> + Send + Sync,
    S: FlowState,
{
    /// Create a new functional node.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            func,
            name: name.into(),
            _phantom: PhantomData,
        }
    }
}

#[async_trait]
impl<F, S> Node for FnNode<F, S>
where
    F: Fn(Context) -> NodeFuture<S> + Send + Sync,
    S: FlowState,
{
    type State = S;

    async fn execute(&self, context: Context) -> Result<(Context, Self::State)> {
        (self.func)(context).await
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

/// Helper functions for creating common node types.
pub mod helpers {
    use super::*;

    /// Create a functional node from an async closure.
    pub fn fn_node<F, Fut, S>(
        name: impl Into<String>,
        f: F,
    ) -> FnNode<impl Fn(Context) -> NodeFuture<S> + Send + Sync, S>
    where
        F: Fn(Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(Context, S)>> + Send + 'static,
        S: FlowState,
    {
        FnNode::new(name, move |ctx| -> NodeFuture<S> { Box::pin(f(ctx)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{message::Message, state::SimpleState};

    #[derive(Debug)]
    struct ReplyNode {
        reply: String,
    }

    #[async_trait]
    impl Node for ReplyNode {
        type State = SimpleState;

        async fn execute(&self, mut context: Context) -> Result<(Context, Self::State)> {
            context.push_message(Message::assistant(&self.reply));
            context.set("replied", true)?;
            Ok((context, SimpleState::Success))
        }

        fn name(&self) -> String {
            "reply".to_string()
        }
    }

    #[tokio::test]
    async fn test_struct_node() {
        let node = ReplyNode {
            reply: "done".to_string(),
        };

        let (context, state) = node.execute(Context::new()).await.unwrap();

        assert_eq!(state, SimpleState::Success);
        assert_eq!(context.conversation().last().map(Message::text), Some("done"));
        assert_eq!(context.get_json::<bool>("replied").unwrap(), Some(true));
        assert_eq!(node.name(), "reply");
    }

    #[tokio::test]
    async fn test_fn_node() {
        let node = helpers::fn_node("fn_node", |mut ctx: Context| async move {
            ctx.set("processed", true)?;
            Ok((ctx, SimpleState::Success))
        });

        let (context, state) = node.execute(Context::new()).await.unwrap();

        assert_eq!(state, SimpleState::Success);
        assert_eq!(context.get_json::<bool>("processed").unwrap(), Some(true));
        assert_eq!(node.name(), "fn_node");
    }
}
