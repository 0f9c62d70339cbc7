//! Multi-source trend research for agentflow.
//!
//! Platform data comes from a [`TrendSources`] implementation, either the
//! simulated [`MockSources`] or the HTTP-backed [`LiveSources`]. The
//! [`ResearchPipeline`] gathers it concurrently, then has two agents turn it
//! into insights and a client report.
//!
//! ```rust
//! use agentflow_research::{MockSources, records::Platform};
//!
//! let report = MockSources::trends("Detty December", "NG");
//! assert_eq!(report.interest_over_time.len(), 12);
//! assert_eq!(report.platform, Platform::GoogleTrends.label());
//! ```

pub mod aggregate;
pub mod error;
pub mod live;
pub mod mock;
pub mod pipeline;
pub mod questions;
pub mod records;
pub mod sources;

pub use error::{ResearchError, Result};
pub use live::{LiveSettings, LiveSources, RedditCredentials};
pub use mock::MockSources;
pub use pipeline::{CollectedData, ResearchOutcome, ResearchPipeline};
pub use questions::{ResearchQuestion, presets};
pub use records::{Platform, RegionShare, Sentiment, SentimentBreakdown};
pub use sources::TrendSources;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        error::{ResearchError, Result},
        live::LiveSources,
        mock::MockSources,
        pipeline::{ResearchOutcome, ResearchPipeline},
        questions::ResearchQuestion,
        sources::TrendSources,
    };
}
