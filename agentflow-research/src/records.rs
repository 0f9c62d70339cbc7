//! Per-platform result records.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A data source the pipeline collects from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Twitter,
    TikTok,
    Reddit,
    GoogleTrends,
    WebSearch,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Twitter,
        Platform::TikTok,
        Platform::Reddit,
        Platform::GoogleTrends,
        Platform::WebSearch,
    ];

    /// Display name used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Twitter => "Twitter/X",
            Platform::TikTok => "TikTok",
            Platform::Reddit => "Reddit",
            Platform::GoogleTrends => "Google Trends",
            Platform::WebSearch => "Web Search",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// Percentage of records per sentiment, one decimal place.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

impl SentimentBreakdown {
    pub fn total(&self) -> f64 {
        self.positive + self.neutral + self.negative
    }
}

impl fmt::Display for SentimentBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "positive {:.1}%, neutral {:.1}%, negative {:.1}%",
            self.positive, self.neutral, self.negative
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tweet {
    pub id: String,
    pub text: String,
    pub author: String,
    pub created_at: Option<DateTime<Utc>>,
    pub engagement: u64,
    pub likes: u64,
    pub retweets: u64,
    pub replies: u64,
    pub sentiment: Sentiment,
}

/// Tweet count for a region, or a note when the API does not expose it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegionShare {
    Count(u64),
    Note(String),
}

impl fmt::Display for RegionShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(count) => write!(f, "{count}"),
            Self::Note(note) => f.write_str(note),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwitterMetrics {
    pub total_engagement: u64,
    pub avg_engagement: f64,
    pub sentiment_breakdown: SentimentBreakdown,
    pub top_hashtags: Vec<String>,
    pub peak_hours: Vec<String>,
    pub geographic_distribution: BTreeMap<String, RegionShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwitterReport {
    pub platform: String,
    pub query: String,
    pub total_results: usize,
    pub tweets: Vec<Tweet>,
    pub metrics: TwitterMetrics,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TikTokVideo {
    pub id: String,
    pub description: String,
    pub creator: String,
    pub created_at: DateTime<Utc>,
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    pub shares: u64,
    pub engagement_rate: f64,
    pub duration_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TikTokMetrics {
    pub total_views: u64,
    pub avg_views: f64,
    pub total_engagement_rate: f64,
    pub trending_sounds: Vec<String>,
    pub top_creators: Vec<String>,
    pub age_demographics: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TikTokReport {
    pub platform: String,
    pub query: String,
    pub total_results: usize,
    pub videos: Vec<TikTokVideo>,
    pub metrics: TikTokMetrics,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedditPost {
    pub id: String,
    pub title: String,
    pub subreddit: String,
    pub author: String,
    pub created_at: Option<DateTime<Utc>>,
    pub upvotes: i64,
    pub upvote_ratio: f64,
    pub comments: u64,
    pub awards: u64,
    pub text_preview: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedditMetrics {
    pub total_upvotes: i64,
    pub avg_upvotes: f64,
    pub total_comments: u64,
    pub top_subreddits: Vec<String>,
    pub discussion_intensity: String,
    pub sentiment_trend: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedditReport {
    pub platform: String,
    pub query: String,
    pub total_results: usize,
    pub posts: Vec<RedditPost>,
    pub metrics: RedditMetrics,
    pub timestamp: DateTime<Utc>,
}

/// Search interest for one month, `0..=100`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// `YYYY-MM`
    pub date: String,
    pub value: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendsReport {
    pub platform: String,
    pub query: String,
    pub geography: String,
    pub interest_over_time: Vec<TrendPoint>,
    pub related_queries: Vec<String>,
    pub related_topics: Vec<String>,
    pub regional_interest: BTreeMap<String, u32>,
    pub trending_status: String,
    pub search_volume_index: u32,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebResult {
    pub id: String,
    pub title: String,
    pub url: String,
    pub source: String,
    pub published_date: Option<String>,
    pub snippet: String,
    pub relevance_score: f64,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebMetrics {
    pub news_articles: u32,
    pub blog_posts: u32,
    pub academic_papers: u32,
    pub social_mentions: u32,
    pub top_domains: Vec<String>,
    pub content_freshness: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchReport {
    pub platform: String,
    pub query: String,
    pub total_results: usize,
    pub results: Vec<WebResult>,
    pub metrics: WebMetrics,
    pub timestamp: DateTime<Utc>,
}
