//! The two-phase trend research pipeline.
//!
//! Phase 1 queries every platform concurrently and keeps whatever comes back.
//! Phase 2 runs the insight analyst and then the report generator, each as a
//! single chat turn. A failed analysis stops the run before the report.

use std::{
    collections::BTreeMap,
    fmt::Write as _,
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use agentflow_agent::{AgentProfile, Roster, ask, rosters};
use agentflow_llm::{ChatCompletion, ModelParameters};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::{ResearchError, Result},
    questions::ResearchQuestion,
    records::{
        Platform, RedditReport, RegionShare, TikTokReport, TrendsReport, TwitterReport,
        WebSearchReport,
    },
    sources::TrendSources,
};

pub const TWITTER_LIMIT: usize = 50;
pub const TIKTOK_LIMIT: usize = 30;
pub const REDDIT_LIMIT: usize = 50;
pub const WEB_LIMIT: usize = 20;
pub const DEFAULT_GEO: &str = "NG";

const ANALYST_KEY: &str = "insight_analyst";
const REPORTER_KEY: &str = "report_generator";

/// Whatever phase 1 gathered; `None` marks a platform that returned nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectedData {
    pub twitter: Option<TwitterReport>,
    pub tiktok: Option<TikTokReport>,
    pub reddit: Option<RedditReport>,
    #[serde(rename = "google_trends")]
    pub trends: Option<TrendsReport>,
    #[serde(rename = "web_search")]
    pub web: Option<WebSearchReport>,
}

impl CollectedData {
    fn has(&self, platform: Platform) -> bool {
        match platform {
            Platform::Twitter => self.twitter.is_some(),
            Platform::TikTok => self.tiktok.is_some(),
            Platform::Reddit => self.reddit.is_some(),
            Platform::GoogleTrends => self.trends.is_some(),
            Platform::WebSearch => self.web.is_some(),
        }
    }

    pub fn collected_platforms(&self) -> Vec<Platform> {
        Platform::ALL.into_iter().filter(|p| self.has(*p)).collect()
    }

    pub fn failed_platforms(&self) -> Vec<Platform> {
        Platform::ALL.into_iter().filter(|p| !self.has(*p)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.collected_platforms().is_empty()
    }

    /// Tweets, videos, posts and web results. Trends count for nothing.
    pub fn total_data_points(&self) -> usize {
        self.twitter.as_ref().map_or(0, |r| r.total_results)
            + self.tiktok.as_ref().map_or(0, |r| r.total_results)
            + self.reddit.as_ref().map_or(0, |r| r.total_results)
            + self.web.as_ref().map_or(0, |r| r.total_results)
    }

    /// Prompt body for the insight analyst. Missing platforms are left out.
    pub fn summary(&self, question: &str) -> String {
        let mut out = format!("Research Question: {question}\n");
        if let Some(twitter) = &self.twitter {
            let m = &twitter.metrics;
            let _ = write!(
                out,
                "\nTWITTER/X DATA:\n- Total tweets: {}\n- Sentiment: {}\n- Top hashtags: {:?}\n- Geographic distribution: {}\n",
                twitter.total_results,
                m.sentiment_breakdown,
                m.top_hashtags,
                regions(&m.geographic_distribution)
            );
        }
        if let Some(tiktok) = &self.tiktok {
            let m = &tiktok.metrics;
            let _ = write!(
                out,
                "\nTIKTOK DATA:\n- Total videos: {}\n- Total views: {}\n- Engagement rate: {}%\n- Age demographics: {:?}\n",
                tiktok.total_results,
                thousands(m.total_views),
                m.total_engagement_rate,
                m.age_demographics
            );
        }
        if let Some(reddit) = &self.reddit {
            let m = &reddit.metrics;
            let _ = write!(
                out,
                "\nREDDIT DATA:\n- Total posts: {}\n- Total comments: {}\n- Top subreddits: {:?}\n- Discussion intensity: {}\n",
                reddit.total_results, m.total_comments, m.top_subreddits, m.discussion_intensity
            );
        }
        if let Some(trends) = &self.trends {
            let _ = write!(
                out,
                "\nGOOGLE TRENDS:\n- Search volume index: {}\n- Trending status: {}\n- Regional interest: {:?}\n- Related queries: {:?}\n",
                trends.search_volume_index,
                trends.trending_status,
                trends.regional_interest,
                trends.related_queries
            );
        }
        if let Some(web) = &self.web {
            let m = &web.metrics;
            let _ = write!(
                out,
                "\nWEB INTELLIGENCE:\n- Total sources: {}\n- News articles: {}\n- Blog posts: {}\n- Top domains: {:?}\n",
                web.total_results, m.news_articles, m.blog_posts, m.top_domains
            );
        }
        out
    }

    /// One line per platform for the report prompt.
    fn raw_summary(&self) -> String {
        let mut lines = Vec::new();
        if let Some(twitter) = &self.twitter {
            lines.push(format!(
                "- Twitter: {} tweets, {}",
                twitter.total_results, twitter.metrics.sentiment_breakdown
            ));
        }
        if let Some(tiktok) = &self.tiktok {
            lines.push(format!(
                "- TikTok: {} videos, {} views",
                tiktok.total_results,
                thousands(tiktok.metrics.total_views)
            ));
        }
        if let Some(reddit) = &self.reddit {
            lines.push(format!(
                "- Reddit: {} posts, {} comments",
                reddit.total_results, reddit.metrics.total_comments
            ));
        }
        if let Some(trends) = &self.trends {
            lines.push(format!(
                "- Google Trends: Index {}, Status: {}",
                trends.search_volume_index, trends.trending_status
            ));
        }
        if let Some(web) = &self.web {
            lines.push(format!("- Web Sources: {} articles", web.total_results));
        }
        lines.join("\n")
    }
}

fn regions(shares: &BTreeMap<String, RegionShare>) -> String {
    shares
        .iter()
        .map(|(region, share)| format!("{region}: {share}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `1234567` → `1,234,567`
fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn analysis_prompt(data: &CollectedData, question: &str) -> String {
    format!(
        "{}\nAnalyze this data and identify:\n\
1. Key patterns and trends\n\
2. Audience behavior insights\n\
3. Platform-specific findings\n\
4. Market opportunities\n\
5. Strategic implications for marketing\n",
        data.summary(question)
    )
}

fn report_prompt(data: &CollectedData, question: &str, insights: &str) -> String {
    format!(
        "Create a comprehensive marketing research report for the following question:\n\n\
{question}\n\n\
INSIGHTS FROM ANALYSIS:\n{insights}\n\n\
RAW DATA SUMMARY:\n{}\n\n\
Create a client-ready report with these sections:\n\
1. EXECUTIVE SUMMARY (2-3 paragraphs)\n\
2. KEY FINDINGS (5-7 bullet points)\n\
3. PLATFORM INSIGHTS\n\
4. AUDIENCE DEMOGRAPHICS & BEHAVIOR\n\
5. SENTIMENT ANALYSIS\n\
6. ACTIONABLE RECOMMENDATIONS (5-7 specific actions)\n\
7. DATA SOURCES & METHODOLOGY\n\n\
Use professional, clear language suitable for marketing executives.\n",
        data.raw_summary()
    )
}

/// A finished research run, ready for export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchOutcome {
    pub key: String,
    pub question: String,
    pub search_query: String,
    pub timestamp: DateTime<Utc>,
    pub execution_time_seconds: f64,
    pub data_sources: CollectedData,
    pub failed_apis: Vec<String>,
    pub insights: String,
    pub report: String,
}

impl ResearchOutcome {
    pub fn total_data_points(&self) -> usize {
        self.data_sources.total_data_points()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Plain-text report with a provenance footer.
    pub fn to_text_report(&self) -> String {
        let sources: Vec<&str> = self
            .data_sources
            .collected_platforms()
            .iter()
            .map(Platform::label)
            .collect();
        let failed = if self.failed_apis.is_empty() {
            "None".to_string()
        } else {
            self.failed_apis.join(", ")
        };
        format!(
            "MARKETING RESEARCH REPORT\n\
Generated: {}\n\n\
RESEARCH QUESTION:\n{}\n\n\
SEARCH QUERY:\n{}\n\n\
{}\n\n\
---\n\
Data Sources: {}\n\
Failed APIs: {}\n\
Total Data Points: {}\n\
Execution Time: {:.1} seconds\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.question,
            self.search_query,
            self.report,
            sources.join(", "),
            failed,
            thousands(self.total_data_points() as u64),
            self.execution_time_seconds
        )
    }

    /// `research_report_{key}_{YYYYmmdd_HHMMSS}`
    pub fn file_stem(&self) -> String {
        format!(
            "research_report_{}_{}",
            self.key,
            self.timestamp.format("%Y%m%d_%H%M%S")
        )
    }

    /// Write the JSON and text exports into `dir`, returning both paths.
    pub async fn export(&self, dir: &Path) -> Result<(PathBuf, PathBuf)> {
        tokio::fs::create_dir_all(dir).await?;
        let stem = self.file_stem();
        let json_path = dir.join(format!("{stem}.json"));
        let text_path = dir.join(format!("{stem}.txt"));
        tokio::fs::write(&json_path, self.to_json_pretty()?).await?;
        tokio::fs::write(&text_path, self.to_text_report()).await?;
        info!(json = %json_path.display(), text = %text_path.display(), "research exported");
        Ok((json_path, text_path))
    }
}

/// Collects platform data and turns it into insights and a report.
#[derive(Clone)]
pub struct ResearchPipeline {
    client: Arc<dyn ChatCompletion>,
    sources: Arc<dyn TrendSources>,
    team: Roster,
    geo: String,
}

impl std::fmt::Debug for ResearchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResearchPipeline")
            .field("model", &self.client.model())
            .field("sources", &self.sources.name())
            .field("geo", &self.geo)
            .finish()
    }
}

impl ResearchPipeline {
    pub fn new(client: Arc<dyn ChatCompletion>, sources: Arc<dyn TrendSources>) -> Self {
        Self {
            client,
            sources,
            team: rosters::research_team(),
            geo: DEFAULT_GEO.to_string(),
        }
    }

    /// Region passed to the trends connector.
    pub fn with_geo(mut self, geo: impl Into<String>) -> Self {
        self.geo = geo.into();
        self
    }

    pub fn sources(&self) -> &dyn TrendSources {
        self.sources.as_ref()
    }

    pub fn team(&self) -> &Roster {
        &self.team
    }

    /// Phase 1: query every platform at once.
    pub async fn collect(&self, query: &str) -> CollectedData {
        info!(sources = self.sources.name(), query, "collecting platform data");
        let sources = self.sources.as_ref();
        let (twitter, tiktok, reddit, trends, web) = tokio::join!(
            sources.search_tweets(query, TWITTER_LIMIT),
            sources.search_videos(query, TIKTOK_LIMIT),
            sources.search_posts(query, REDDIT_LIMIT),
            sources.get_trends(query, &self.geo),
            sources.web_search(query, WEB_LIMIT),
        );
        let data = CollectedData {
            twitter,
            tiktok,
            reddit,
            trends,
            web,
        };
        for platform in data.failed_platforms() {
            warn!("{platform} returned no data");
        }
        data
    }

    async fn consult(
        &self,
        key: &str,
        stage: &str,
        prompt: &str,
        parameters: ModelParameters,
    ) -> Result<String> {
        let profile: &AgentProfile = self.team.require(key)?;
        info!(agent = %profile.name, "{stage} started");
        let output = ask(self.client.as_ref(), profile, prompt, parameters).await;
        if output.failed {
            return Err(ResearchError::stage(stage, output.text));
        }
        Ok(output.text)
    }

    /// Phase 2a: the insight analyst reads the collected data.
    pub async fn analyze(&self, question: &str, data: &CollectedData) -> Result<String> {
        let parameters = ModelParameters::default()
            .with_temperature(0.7)
            .with_max_tokens(1500);
        self.consult(ANALYST_KEY, "analysis", &analysis_prompt(data, question), parameters)
            .await
    }

    /// Phase 2b: the report generator writes the client report.
    pub async fn write_report(
        &self,
        question: &str,
        data: &CollectedData,
        insights: &str,
    ) -> Result<String> {
        let parameters = ModelParameters::default()
            .with_temperature(0.7)
            .with_max_tokens(2500);
        let prompt = report_prompt(data, question, insights);
        self.consult(REPORTER_KEY, "report generation", &prompt, parameters)
            .await
    }

    /// Run both phases for `question`.
    pub async fn run(&self, question: &ResearchQuestion) -> Result<ResearchOutcome> {
        let started = Instant::now();
        let search_query = question.search_query().to_string();

        let data = self.collect(&search_query).await;
        if data.is_empty() {
            return Err(ResearchError::NoData);
        }
        let failed_apis = data
            .failed_platforms()
            .iter()
            .map(|platform| platform.label().to_string())
            .collect();

        let insights = self.analyze(&question.question, &data).await?;
        let report = self
            .write_report(&question.question, &data, &insights)
            .await?;

        let execution_time_seconds = started.elapsed().as_secs_f64();
        info!(
            key = %question.key,
            data_points = data.total_data_points(),
            "research completed in {execution_time_seconds:.1}s"
        );
        Ok(ResearchOutcome {
            key: question.key.clone(),
            question: question.question.clone(),
            search_query,
            timestamp: Utc::now(),
            execution_time_seconds,
            data_sources: data,
            failed_apis,
            insights,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use agentflow_llm::{ChatRequest, ChatResponse, FnChat, LlmError};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::mock::MockSources;

    /// Only web search answers.
    struct WebOnly;

    #[async_trait]
    impl TrendSources for WebOnly {
        fn name(&self) -> &str {
            "web-only"
        }

        fn is_available(&self, platform: Platform) -> bool {
            platform == Platform::WebSearch
        }

        async fn search_tweets(&self, _: &str, _: usize) -> Option<TwitterReport> {
            None
        }

        async fn search_videos(&self, _: &str, _: usize) -> Option<TikTokReport> {
            None
        }

        async fn search_posts(&self, _: &str, _: usize) -> Option<RedditReport> {
            None
        }

        async fn get_trends(&self, _: &str, _: &str) -> Option<TrendsReport> {
            None
        }

        async fn web_search(&self, query: &str, max_results: usize) -> Option<WebSearchReport> {
            Some(MockSources::web(query, max_results))
        }
    }

    struct Silent;

    #[async_trait]
    impl TrendSources for Silent {
        fn name(&self) -> &str {
            "silent"
        }

        fn is_available(&self, _: Platform) -> bool {
            false
        }

        async fn search_tweets(&self, _: &str, _: usize) -> Option<TwitterReport> {
            None
        }

        async fn search_videos(&self, _: &str, _: usize) -> Option<TikTokReport> {
            None
        }

        async fn search_posts(&self, _: &str, _: usize) -> Option<RedditReport> {
            None
        }

        async fn get_trends(&self, _: &str, _: &str) -> Option<TrendsReport> {
            None
        }

        async fn web_search(&self, _: &str, _: usize) -> Option<WebSearchReport> {
            None
        }
    }

    fn stage_reply(request: &ChatRequest) -> String {
        if request.last_text().starts_with("Create a comprehensive") {
            "FINAL REPORT".to_string()
        } else {
            "KEY INSIGHTS".to_string()
        }
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1000), "1,000");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[tokio::test]
    async fn test_run_with_mock_sources() {
        let requests = Arc::new(Mutex::new(Vec::<ChatRequest>::new()));
        let seen = requests.clone();
        let client = FnChat::new(move |request: ChatRequest| {
            let reply = stage_reply(&request);
            seen.lock().unwrap().push(request);
            Ok(ChatResponse::from_text(reply))
        });
        let pipeline = ResearchPipeline::new(Arc::new(client), Arc::new(MockSources::new()));
        let question = ResearchQuestion::by_key("mpesa_competition").unwrap();

        let outcome = pipeline.run(&question).await.unwrap();
        assert_eq!(outcome.search_query, "M-Pesa dominance East Africa");
        assert_eq!(outcome.insights, "KEY INSIGHTS");
        assert_eq!(outcome.report, "FINAL REPORT");
        assert!(outcome.failed_apis.is_empty());
        assert_eq!(outcome.data_sources.collected_platforms().len(), 5);

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].max_tokens, Some(1500));
        assert_eq!(requests[0].temperature, Some(0.7));
        assert!(requests[0].last_text().contains("TWITTER/X DATA"));
        assert!(requests[0].last_text().contains("GOOGLE TRENDS"));
        assert_eq!(requests[1].max_tokens, Some(2500));
        assert!(requests[1].last_text().contains("KEY INSIGHTS"));

        let points = outcome.total_data_points();
        let expected = outcome.data_sources.twitter.as_ref().unwrap().total_results
            + outcome.data_sources.tiktok.as_ref().unwrap().total_results
            + outcome.data_sources.reddit.as_ref().unwrap().total_results
            + outcome.data_sources.web.as_ref().unwrap().total_results;
        assert_eq!(points, expected);
    }

    #[test]
    fn test_summary_lists_region_counts() {
        let data = CollectedData {
            twitter: Some(MockSources::twitter("mpesa", 5)),
            ..Default::default()
        };
        let summary = data.summary("q");
        assert!(summary.contains("- Geographic distribution: Ghana: 25, Kenya: 15, Nigeria: 45"));
    }

    #[tokio::test]
    async fn test_missing_platforms_are_recorded() {
        let client = FnChat::new(|request: ChatRequest| {
            Ok(ChatResponse::from_text(stage_reply(&request)))
        });
        let pipeline = ResearchPipeline::new(Arc::new(client), Arc::new(WebOnly));
        let question = ResearchQuestion::custom("How do Kenyans pay?", "Kenya payments").unwrap();

        let outcome = pipeline.run(&question).await.unwrap();
        assert_eq!(
            outcome.failed_apis,
            vec!["Twitter/X", "TikTok", "Reddit", "Google Trends"]
        );
        let summary = outcome.data_sources.summary("q");
        assert!(!summary.contains("TWITTER/X DATA"));
        assert!(summary.contains("WEB INTELLIGENCE"));

        let text = outcome.to_text_report();
        assert!(text.starts_with("MARKETING RESEARCH REPORT\n"));
        assert!(text.contains("SEARCH QUERY:\nKenya payments"));
        assert!(text.contains("Data Sources: Web Search\n"));
        assert!(text.contains("Failed APIs: Twitter/X, TikTok, Reddit, Google Trends\n"));
        assert!(outcome.file_stem().starts_with("research_report_custom_"));
    }

    #[tokio::test]
    async fn test_no_data_skips_the_model() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let client = FnChat::new(move |_request: ChatRequest| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(ChatResponse::from_text("unused"))
        });
        let pipeline = ResearchPipeline::new(Arc::new(client), Arc::new(Silent));
        let question = ResearchQuestion::by_key("gen_z_nigeria").unwrap();

        let err = pipeline.run(&question).await.unwrap_err();
        assert!(matches!(err, ResearchError::NoData));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_analysis_halts_before_report() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let client = FnChat::new(move |_request: ChatRequest| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(LlmError::EmptyResponse)
        });
        let pipeline = ResearchPipeline::new(Arc::new(client), Arc::new(MockSources::new()));
        let question = ResearchQuestion::by_key("creator_economy").unwrap();

        let err = pipeline.run(&question).await.unwrap_err();
        match err {
            ResearchError::Stage { stage, message } => {
                assert_eq!(stage, "analysis");
                assert!(message.starts_with("Error: "));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_json_export_shape() {
        let client = FnChat::new(|request: ChatRequest| {
            Ok(ChatResponse::from_text(stage_reply(&request)))
        });
        let pipeline = ResearchPipeline::new(Arc::new(client), Arc::new(WebOnly));
        let question = ResearchQuestion::by_key("detty_december").unwrap();
        let outcome = pipeline.run(&question).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&outcome.to_json_pretty().unwrap()).unwrap();
        assert!(value["data_sources"]["web_search"].is_object());
        assert!(value["data_sources"]["google_trends"].is_null());
        assert_eq!(value["report"], "FINAL REPORT");
        assert!(value["execution_time_seconds"].as_f64().unwrap() >= 0.0);

        let dir = std::env::temp_dir().join(format!("agentflow-research-{}", std::process::id()));
        let (json_path, text_path) = outcome.export(&dir).await.unwrap();
        assert!(json_path.exists());
        assert!(text_path.to_string_lossy().ends_with(".txt"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
