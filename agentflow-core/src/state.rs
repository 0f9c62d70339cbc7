//! State management for agentflow flows.

/// Trait representing a state in a flow.
///
/// A flow keeps running nodes until it lands on a terminal state.
pub trait FlowState:
    Clone + PartialEq + Eq + std::hash::Hash + std::fmt::Debug + Send + Sync + 'static
{
    /// Returns true if this is a terminal state (the flow should stop).
    fn is_terminal(&self) -> bool;
}

/// A simple enum-based state for basic flows.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SimpleState {
    /// Initial state
    Start,
    /// Processing state
    Processing,
    /// Successful completion
    Success,
    /// Error state
    Error,
}

impl FlowState for SimpleState {
    fn is_terminal(&self) -> bool {
        matches!(self, SimpleState::Success | SimpleState::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!SimpleState::Start.is_terminal());
        assert!(!SimpleState::Processing.is_terminal());
        assert!(SimpleState::Success.is_terminal());
        assert!(SimpleState::Error.is_terminal());
    }
}
