//! The data-source seam between the pipeline and platform connectors.

use async_trait::async_trait;

use crate::records::{
    Platform, RedditReport, TikTokReport, TrendsReport, TwitterReport, WebSearchReport,
};

/// Platform connectors.
///
/// `None` means the platform is unavailable or returned nothing; the pipeline
/// records it and carries on.
#[async_trait]
pub trait TrendSources: Send + Sync {
    /// Short description for logs and status output.
    fn name(&self) -> &str;

    /// Whether a platform is configured at all.
    fn is_available(&self, platform: Platform) -> bool;

    async fn search_tweets(&self, query: &str, max_results: usize) -> Option<TwitterReport>;

    async fn search_videos(&self, query: &str, max_results: usize) -> Option<TikTokReport>;

    async fn search_posts(&self, query: &str, max_results: usize) -> Option<RedditReport>;

    async fn get_trends(&self, query: &str, geo: &str) -> Option<TrendsReport>;

    async fn web_search(&self, query: &str, max_results: usize) -> Option<WebSearchReport>;

    /// `(platform, available)` for every platform.
    fn availability(&self) -> Vec<(Platform, bool)> {
        Platform::ALL
            .iter()
            .map(|platform| (*platform, self.is_available(*platform)))
            .collect()
    }
}
