//! Connectors for the public platform APIs.
//!
//! Twitter/X, Reddit and Bing web search are called over HTTP when their
//! credentials are configured. TikTok and Google Trends have no public API
//! usable here and always report unavailable. Any failure is logged and
//! surfaces as `None`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::USER_AGENT;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    aggregate::{average, keyword_sentiment, most_common, sentiment_breakdown, top_hashtags},
    error::{ResearchError, Result},
    records::{
        Platform, RedditMetrics, RedditPost, RedditReport, RegionShare, TikTokReport,
        TrendsReport, Tweet, TwitterMetrics, TwitterReport, WebMetrics, WebResult,
        WebSearchReport,
    },
    sources::TrendSources,
};

pub const TWITTER_TOKEN_VAR: &str = "TWITTER_BEARER_TOKEN";
pub const REDDIT_CLIENT_ID_VAR: &str = "REDDIT_CLIENT_ID";
pub const REDDIT_CLIENT_SECRET_VAR: &str = "REDDIT_CLIENT_SECRET";
pub const REDDIT_USER_AGENT_VAR: &str = "REDDIT_USER_AGENT";
pub const BING_KEY_VAR: &str = "BING_SEARCH_API_KEY";

pub const DEFAULT_USER_AGENT: &str = "TrendResearchBot/1.0";

const TWITTER_SEARCH_URL: &str = "https://api.twitter.com/2/tweets/search/recent";
const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const REDDIT_SEARCH_URL: &str = "https://oauth.reddit.com/r/all/search";
const BING_SEARCH_URL: &str = "https://api.bing.microsoft.com/v7.0/search";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const NOT_IN_BASIC_API: &str = "Not available in basic API";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

/// Credentials for the live connectors. Missing values disable a platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveSettings {
    pub twitter_token: Option<String>,
    pub reddit: Option<RedditCredentials>,
    pub bing_key: Option<String>,
}

impl LiveSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let present = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let reddit = match (present(REDDIT_CLIENT_ID_VAR), present(REDDIT_CLIENT_SECRET_VAR)) {
            (Some(client_id), Some(client_secret)) => Some(RedditCredentials {
                client_id,
                client_secret,
                user_agent: present(REDDIT_USER_AGENT_VAR)
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            }),
            _ => None,
        };
        Self {
            twitter_token: present(TWITTER_TOKEN_VAR),
            reddit,
            bing_key: present(BING_KEY_VAR),
        }
    }
}

/// HTTP-backed [`TrendSources`].
#[derive(Debug, Clone)]
pub struct LiveSources {
    http: reqwest::Client,
    settings: LiveSettings,
}

impl LiveSources {
    pub fn new(settings: LiveSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, settings })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(LiveSettings::from_env())
    }

    pub fn settings(&self) -> &LiveSettings {
        &self.settings
    }

    async fn fetch_tweets(&self, token: &str, query: &str, max_results: usize) -> Result<TwitterReport> {
        let max_results = max_results.clamp(10, 100).to_string();
        let response = self
            .http
            .get(TWITTER_SEARCH_URL)
            .bearer_auth(token)
            .query(&[
                ("query", query),
                ("max_results", max_results.as_str()),
                ("tweet.fields", "created_at,public_metrics,author_id,lang"),
            ])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResearchError::status(Platform::Twitter.label(), status.as_u16()));
        }
        let body: TwitterSearchBody = response.json().await?;
        twitter_report(query, body).ok_or_else(|| ResearchError::empty(Platform::Twitter.label()))
    }

    async fn fetch_posts(
        &self,
        credentials: &RedditCredentials,
        query: &str,
        max_results: usize,
    ) -> Result<RedditReport> {
        let response = self
            .http
            .post(REDDIT_TOKEN_URL)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .header(USER_AGENT, &credentials.user_agent)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResearchError::status(Platform::Reddit.label(), status.as_u16()));
        }
        let token: RedditToken = response.json().await?;
        debug!("obtained Reddit application token");

        let limit = max_results.min(100).to_string();
        let response = self
            .http
            .get(REDDIT_SEARCH_URL)
            .bearer_auth(&token.access_token)
            .header(USER_AGENT, &credentials.user_agent)
            .query(&[("q", query), ("limit", limit.as_str())])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResearchError::status(Platform::Reddit.label(), status.as_u16()));
        }
        let listing: RedditListing = response.json().await?;
        Ok(reddit_report(query, listing))
    }

    async fn fetch_web(&self, key: &str, query: &str, max_results: usize) -> Result<WebSearchReport> {
        let count = max_results.min(50).to_string();
        let response = self
            .http
            .get(BING_SEARCH_URL)
            .header("Ocp-Apim-Subscription-Key", key)
            .query(&[("q", query), ("count", count.as_str()), ("mkt", "en-US")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ResearchError::status(Platform::WebSearch.label(), status.as_u16()));
        }
        let body: BingSearchBody = response.json().await?;
        web_report(query, body).ok_or_else(|| ResearchError::empty(Platform::WebSearch.label()))
    }
}

fn settled<T>(platform: Platform, result: Result<T>) -> Option<T> {
    match result {
        Ok(report) => Some(report),
        Err(err) => {
            warn!("{platform} search failed: {err}");
            None
        }
    }
}

#[async_trait]
impl TrendSources for LiveSources {
    fn name(&self) -> &str {
        "live"
    }

    fn is_available(&self, platform: Platform) -> bool {
        match platform {
            Platform::Twitter => self.settings.twitter_token.is_some(),
            Platform::Reddit => self.settings.reddit.is_some(),
            Platform::WebSearch => self.settings.bing_key.is_some(),
            Platform::TikTok | Platform::GoogleTrends => false,
        }
    }

    async fn search_tweets(&self, query: &str, max_results: usize) -> Option<TwitterReport> {
        let token = self.settings.twitter_token.as_deref()?;
        settled(Platform::Twitter, self.fetch_tweets(token, query, max_results).await)
    }

    async fn search_videos(&self, _query: &str, _max_results: usize) -> Option<TikTokReport> {
        None
    }

    async fn search_posts(&self, query: &str, max_results: usize) -> Option<RedditReport> {
        let credentials = self.settings.reddit.as_ref()?;
        settled(Platform::Reddit, self.fetch_posts(credentials, query, max_results).await)
    }

    async fn get_trends(&self, _query: &str, _geo: &str) -> Option<TrendsReport> {
        None
    }

    async fn web_search(&self, query: &str, max_results: usize) -> Option<WebSearchReport> {
        let key = self.settings.bing_key.as_deref()?;
        settled(Platform::WebSearch, self.fetch_web(key, query, max_results).await)
    }
}

#[derive(Debug, Deserialize)]
struct TwitterSearchBody {
    #[serde(default)]
    data: Vec<RawTweet>,
}

#[derive(Debug, Deserialize)]
struct RawTweet {
    id: String,
    text: String,
    #[serde(default)]
    author_id: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    public_metrics: PublicMetrics,
}

#[derive(Debug, Default, Deserialize)]
struct PublicMetrics {
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    retweet_count: u64,
    #[serde(default)]
    reply_count: u64,
}

fn twitter_report(query: &str, body: TwitterSearchBody) -> Option<TwitterReport> {
    if body.data.is_empty() {
        return None;
    }
    let tweets: Vec<Tweet> = body
        .data
        .into_iter()
        .map(|raw| {
            let metrics = raw.public_metrics;
            Tweet {
                sentiment: keyword_sentiment(&raw.text),
                id: raw.id,
                author: format!("@{}", raw.author_id.unwrap_or_default()),
                text: raw.text,
                created_at: raw.created_at,
                engagement: metrics.like_count + metrics.retweet_count + metrics.reply_count,
                likes: metrics.like_count,
                retweets: metrics.retweet_count,
                replies: metrics.reply_count,
            }
        })
        .collect();

    let total_engagement: u64 = tweets.iter().map(|tweet| tweet.engagement).sum();
    let sentiments: Vec<_> = tweets.iter().map(|tweet| tweet.sentiment).collect();
    let metrics = TwitterMetrics {
        total_engagement,
        avg_engagement: average(total_engagement as f64, tweets.len()),
        sentiment_breakdown: sentiment_breakdown(&sentiments),
        top_hashtags: top_hashtags(tweets.iter().map(|tweet| tweet.text.as_str()), 5),
        peak_hours: vec!["Data not available in basic API".to_string()],
        geographic_distribution: [(
            "Data".to_string(),
            RegionShare::Note(NOT_IN_BASIC_API.to_string()),
        )]
            .into_iter()
            .collect(),
    };
    Some(TwitterReport {
        platform: Platform::Twitter.label().to_string(),
        query: query.to_string(),
        total_results: tweets.len(),
        tweets,
        metrics,
        timestamp: Utc::now(),
    })
}

#[derive(Debug, Deserialize)]
struct RedditToken {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct RedditListing {
    data: RedditListingData,
}

#[derive(Debug, Deserialize)]
struct RedditListingData {
    #[serde(default)]
    children: Vec<RedditChild>,
}

#[derive(Debug, Deserialize)]
struct RedditChild {
    data: RawSubmission,
}

#[derive(Debug, Deserialize)]
struct RawSubmission {
    id: String,
    title: String,
    subreddit: String,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    created_utc: f64,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    upvote_ratio: f64,
    #[serde(default)]
    num_comments: u64,
    #[serde(default)]
    total_awards_received: u64,
    #[serde(default)]
    selftext: String,
}

fn reddit_report(query: &str, listing: RedditListing) -> RedditReport {
    let submissions: Vec<RawSubmission> = listing
        .data
        .children
        .into_iter()
        .map(|child| child.data)
        .collect();
    let top_subreddits = most_common(submissions.iter().map(|post| post.subreddit.clone()), 5)
        .into_iter()
        .map(|name| format!("r/{name}"))
        .collect();

    let posts: Vec<RedditPost> = submissions
        .into_iter()
        .map(|raw| RedditPost {
            author: match raw.author.as_deref() {
                Some(name) if name != "[deleted]" => format!("u/{name}"),
                _ => "[deleted]".to_string(),
            },
            created_at: DateTime::from_timestamp(raw.created_utc as i64, 0),
            text_preview: if raw.selftext.is_empty() {
                "[Link post]".to_string()
            } else {
                raw.selftext.chars().take(200).collect()
            },
            subreddit: format!("r/{}", raw.subreddit),
            id: raw.id,
            title: raw.title,
            upvotes: raw.score,
            upvote_ratio: raw.upvote_ratio,
            comments: raw.num_comments,
            awards: raw.total_awards_received,
        })
        .collect();

    let total_upvotes: i64 = posts.iter().map(|post| post.upvotes).sum();
    let metrics = RedditMetrics {
        total_upvotes,
        avg_upvotes: average(total_upvotes as f64, posts.len()),
        total_comments: posts.iter().map(|post| post.comments).sum(),
        top_subreddits,
        discussion_intensity: if posts.len() > 50 { "High" } else { "Medium" }.to_string(),
        sentiment_trend: "Mixed".to_string(),
    };
    RedditReport {
        platform: Platform::Reddit.label().to_string(),
        query: query.to_string(),
        total_results: posts.len(),
        posts,
        metrics,
        timestamp: Utc::now(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingSearchBody {
    #[serde(default)]
    web_pages: Option<BingWebPages>,
}

#[derive(Debug, Deserialize)]
struct BingWebPages {
    #[serde(default)]
    value: Vec<BingPage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BingPage {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    display_url: String,
    #[serde(default)]
    date_last_crawled: Option<String>,
    #[serde(default)]
    snippet: String,
}

/// Coarse content type from URL keywords.
fn content_type(url: &str) -> &'static str {
    let url = url.to_lowercase();
    if ["news", "article", "press"].iter().any(|word| url.contains(word)) {
        "News"
    } else if ["blog", "post", "medium"].iter().any(|word| url.contains(word)) {
        "Blog Post"
    } else {
        "Article"
    }
}

fn web_report(query: &str, body: BingSearchBody) -> Option<WebSearchReport> {
    let pages = body.web_pages?.value;
    let results: Vec<WebResult> = pages
        .into_iter()
        .map(|page| WebResult {
            content_type: content_type(&page.url).to_string(),
            source: page.display_url.split('/').next().unwrap_or_default().to_string(),
            published_date: page
                .date_last_crawled
                .or_else(|| Some(Utc::now().to_rfc3339())),
            id: page.id,
            title: page.name,
            url: page.url,
            snippet: page.snippet,
            relevance_score: 1.0,
        })
        .collect();

    let count = |kind: &str| results.iter().filter(|r| r.content_type == kind).count() as u32;
    let mut top_domains: Vec<String> = Vec::new();
    for result in results.iter().take(5) {
        if !top_domains.contains(&result.source) {
            top_domains.push(result.source.clone());
        }
    }
    let metrics = WebMetrics {
        news_articles: count("News"),
        blog_posts: count("Blog Post"),
        academic_papers: 0,
        social_mentions: 0,
        top_domains,
        content_freshness: "Recent".to_string(),
    };
    Some(WebSearchReport {
        platform: Platform::WebSearch.label().to_string(),
        query: query.to_string(),
        total_results: results.len(),
        results,
        metrics,
        timestamp: Utc::now(),
    })
}
