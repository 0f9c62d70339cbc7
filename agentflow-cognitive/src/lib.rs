//! Cognitive patterns for agentflow: planning and retrieval-augmented
//! answering.
//!
//! ```rust
//! use agentflow_cognitive::retrieval::KnowledgeBase;
//!
//! let kb = KnowledgeBase::builtin().unwrap();
//! let hits = kb.search("Where is .NET Conf held?", 2);
//! assert_eq!(hits[0].doc_id, "dotnet_conf_2025");
//! ```

pub mod error;
pub mod planning;
pub mod retrieval;

pub use error::{CognitiveError, Result};
pub use planning::{PlanMode, PlanState, PlanStep, Planner, PlanningReport, StepResult, TaskPlan};
pub use retrieval::{Document, KnowledgeBase, RagAgent, RagAnswer, SearchHit};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        error::{CognitiveError, Result},
        planning::{PlanMode, Planner, PlanningReport, TaskPlan},
        retrieval::{KnowledgeBase, RagAgent, RagAnswer},
    };
}
