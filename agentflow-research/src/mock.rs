//! Simulated platform connectors.
//!
//! Output is random and unseeded; only its shape is stable.

use std::{collections::BTreeMap, time::Duration};

use async_trait::async_trait;
use chrono::{Duration as TimeSpan, Utc};

use crate::{
    aggregate::{FALLBACK_HASHTAGS, average, sentiment_breakdown, top_hashtags},
    records::{
        Platform, RedditMetrics, RedditPost, RedditReport, RegionShare, Sentiment, TikTokMetrics,
        TikTokReport, TikTokVideo, TrendPoint, TrendsReport, Tweet, TwitterMetrics, TwitterReport,
        WebMetrics, WebResult, WebSearchReport,
    },
    sources::TrendSources,
};

const TWEET_TEMPLATES: [(&str, [&str; 5]); 4] = [
    (
        "gen z nigeria facebook",
        [
            "Facebook groups in Nigeria are where the real community vibes are 🇳🇬 #GenZ",
            "Why do we use Facebook for everything except what it was made for? 😂 #NigerianGenZ",
            "Google is for homework, Facebook is for life updates. That's the rule. #Nigeria",
            "Facebook marketplace > Google shopping in Nigeria. Change my mind 💯",
            "The way Nigerian Gen Z has repurposed Facebook is actually genius 🧠",
        ],
    ),
    (
        "detty december",
        [
            "Detty December 2024 was insane! Already planning for next year 🎉 #DettyDecember",
            "The diaspora energy during Detty December hits different 🔥 #Ghana #Nigeria",
            "Spent my entire savings on Detty December. Worth it? Absolutely 💸 #Lagos",
            "Detty December is not just parties, it's reconnecting with home ❤️ #Diaspora",
            "Hotels are already booked for next Detty December 😅 #AccraToLagos",
        ],
    ),
    (
        "african creators",
        [
            "Being a creator in Africa is tough but we're making it work 💪 #AfricanCreators",
            "Payment platforms need to support African creators better! #CreatorEconomy",
            "The talent is here, the infrastructure isn't 😔 #AfricanGamers",
            "Shoutout to all African creators grinding despite the challenges 🙌",
            "We need more monetization options for African content creators #Support",
        ],
    ),
    (
        "mpesa",
        [
            "M-Pesa changed the game for East Africa 🚀 #MobileMoney",
            "Why is M-Pesa so dominant? Because it just works 💯 #Kenya",
            "Every competitor tries but M-Pesa stays winning #EastAfrica",
            "M-Pesa fees are high but convenience is unmatched 🤷‍♂️",
            "The trust factor with M-Pesa is real #DigitalPayments",
        ],
    ),
];

const TWEET_SENTIMENTS: [Sentiment; 4] = [
    Sentiment::Positive,
    Sentiment::Positive,
    Sentiment::Neutral,
    Sentiment::Negative,
];

const TRENDING_SOUNDS: [&str; 5] = [
    "Original Sound - Trending",
    "Afrobeats Mix 2024",
    "Viral Dance Challenge",
    "Comedy Skit Audio",
    "Motivational Speech",
];

const SUBREDDITS: [&str; 6] = [
    "r/Africa",
    "r/Nigeria",
    "r/Kenya",
    "r/Ghana",
    "r/technology",
    "r/marketing",
];

const TOPICS: [&str; 8] = [
    "Technology",
    "Business",
    "Culture",
    "Entertainment",
    "Finance",
    "Social Media",
    "Innovation",
    "Lifestyle",
];

const NEWS_SOURCES: [&str; 8] = [
    "TechCabal",
    "Disrupt Africa",
    "Ventures Africa",
    "The Guardian Nigeria",
    "Punch Newspapers",
    "Premium Times",
    "Nairametrics",
    "Business Day",
];

fn pick<T: Copy>(items: &[T]) -> T {
    items[fastrand::usize(..items.len())]
}

fn sample(items: &[&str], count: usize) -> Vec<String> {
    let mut items = items.to_vec();
    fastrand::shuffle(&mut items);
    items.into_iter().take(count).map(str::to_string).collect()
}

fn uniform(low: f64, high: f64) -> f64 {
    low + fastrand::f64() * (high - low)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn owned_map<V: Copy>(entries: &[(&str, V)]) -> BTreeMap<String, V> {
    entries
        .iter()
        .map(|(key, value)| (key.to_string(), *value))
        .collect()
}

/// Tweet texts for a query: every template group sharing a word with it, or
/// generic lines naming the query.
fn tweet_templates(query: &str) -> Vec<String> {
    let query_lower = query.to_lowercase();
    let selected: Vec<String> = TWEET_TEMPLATES
        .iter()
        .filter(|(key, _)| key.split_whitespace().any(|word| query_lower.contains(word)))
        .flat_map(|(_, tweets)| tweets.iter().map(|tweet| tweet.to_string()))
        .collect();

    if selected.is_empty() {
        vec![
            format!("Interesting insights about {query} 🤔"),
            format!("The {query} conversation is heating up 🔥"),
            format!("Everyone's talking about {query} lately 💬"),
        ]
    } else {
        selected
    }
}

/// Twelve monthly points ending this month, each within `0..=100`.
pub fn interest_timeline() -> Vec<TrendPoint> {
    let base = fastrand::i32(40..=80);
    (0..12)
        .map(|i| {
            let date = Utc::now() - TimeSpan::days(30 * (11 - i));
            let value = (base + fastrand::i32(-20..=20)).clamp(0, 100);
            TrendPoint {
                date: date.format("%Y-%m").to_string(),
                value: value as u8,
            }
        })
        .collect()
}

/// Connectors that fabricate plausible data.
#[derive(Debug, Clone, Default)]
pub struct MockSources {
    simulate_latency: bool,
}

impl MockSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for one to two and a half seconds per call, like a real API.
    pub fn with_simulated_latency(mut self, enabled: bool) -> Self {
        self.simulate_latency = enabled;
        self
    }

    async fn pause(&self, low: f64, high: f64) {
        if self.simulate_latency {
            tokio::time::sleep(Duration::from_secs_f64(uniform(low, high))).await;
        }
    }

    pub fn twitter(query: &str, max_results: usize) -> TwitterReport {
        let templates = tweet_templates(query);
        let count = max_results.min(templates.len() * 3);
        let now = Utc::now();

        let tweets: Vec<Tweet> = (0..count)
            .map(|i| Tweet {
                id: format!("tweet_{}", i + 1),
                text: templates[fastrand::usize(..templates.len())].clone(),
                author: format!("@user{}", fastrand::u32(1000..=9999)),
                created_at: Some(now - TimeSpan::hours(fastrand::i64(1..=72))),
                engagement: fastrand::u64(50..=5000),
                likes: fastrand::u64(20..=2000),
                retweets: fastrand::u64(5..=500),
                replies: fastrand::u64(2..=200),
                sentiment: pick(&TWEET_SENTIMENTS),
            })
            .collect();

        let total_engagement: u64 = tweets.iter().map(|tweet| tweet.engagement).sum();
        let sentiments: Vec<Sentiment> = tweets.iter().map(|tweet| tweet.sentiment).collect();
        let mut hashtags = top_hashtags(tweets.iter().map(|tweet| tweet.text.as_str()), 5);
        if hashtags.is_empty() {
            hashtags = FALLBACK_HASHTAGS.iter().map(|tag| tag.to_string()).collect();
        }

        TwitterReport {
            platform: Platform::Twitter.label().to_string(),
            query: query.to_string(),
            total_results: tweets.len(),
            metrics: TwitterMetrics {
                total_engagement,
                avg_engagement: average(total_engagement as f64, tweets.len()),
                sentiment_breakdown: sentiment_breakdown(&sentiments),
                top_hashtags: hashtags,
                peak_hours: vec!["9AM-11AM".to_string(), "6PM-9PM".to_string()],
                geographic_distribution: [
                    ("Nigeria", 45),
                    ("Ghana", 25),
                    ("Kenya", 15),
                    ("South Africa", 10),
                    ("Other", 5),
                ]
                .into_iter()
                .map(|(country, count)| (country.to_string(), RegionShare::Count(count)))
                .collect(),
            },
            tweets,
            timestamp: now,
        }
    }

    pub fn tiktok(query: &str, max_results: usize) -> TikTokReport {
        let now = Utc::now();
        let tag = query.replace(' ', "");
        let videos: Vec<TikTokVideo> = (0..max_results)
            .map(|i| TikTokVideo {
                id: format!("video_{}", i + 1),
                description: format!("#{tag} content that's going viral 🔥"),
                creator: format!("@creator{}", fastrand::u32(100..=999)),
                created_at: now - TimeSpan::days(fastrand::i64(1..=30)),
                views: fastrand::u64(10_000..=1_000_000),
                likes: fastrand::u64(500..=50_000),
                comments: fastrand::u64(50..=5000),
                shares: fastrand::u64(20..=2000),
                engagement_rate: round2(uniform(3.0, 12.0)),
                duration_seconds: fastrand::u32(15..=60),
            })
            .collect();

        let total_views: u64 = videos.iter().map(|video| video.views).sum();
        TikTokReport {
            platform: Platform::TikTok.label().to_string(),
            query: query.to_string(),
            total_results: videos.len(),
            metrics: TikTokMetrics {
                total_views,
                avg_views: average(total_views as f64, videos.len()),
                total_engagement_rate: round2(uniform(5.0, 15.0)),
                trending_sounds: sample(&TRENDING_SOUNDS, 3),
                top_creators: (1..=5).map(|i| format!("@creator{i}")).collect(),
                age_demographics: owned_map(&[
                    ("13-17", 15),
                    ("18-24", 45),
                    ("25-34", 30),
                    ("35+", 10),
                ]),
            },
            videos,
            timestamp: now,
        }
    }

    pub fn reddit(query: &str, max_results: usize) -> RedditReport {
        let now = Utc::now();
        let posts: Vec<RedditPost> = (0..max_results)
            .map(|i| RedditPost {
                id: format!("post_{}", i + 1),
                title: format!("Discussion: {query} - What are your thoughts?"),
                subreddit: pick(&SUBREDDITS).to_string(),
                author: format!("u/user{}", fastrand::u32(1000..=9999)),
                created_at: Some(now - TimeSpan::days(fastrand::i64(1..=60))),
                upvotes: fastrand::i64(10..=5000),
                upvote_ratio: round2(uniform(0.7, 0.98)),
                comments: fastrand::u64(5..=500),
                awards: fastrand::u64(0..=10),
                text_preview: format!("Interesting perspective on {query}..."),
            })
            .collect();

        let total_upvotes: i64 = posts.iter().map(|post| post.upvotes).sum();
        RedditReport {
            platform: Platform::Reddit.label().to_string(),
            query: query.to_string(),
            total_results: posts.len(),
            metrics: RedditMetrics {
                total_upvotes,
                avg_upvotes: average(total_upvotes as f64, posts.len()),
                total_comments: posts.iter().map(|post| post.comments).sum(),
                top_subreddits: ["r/Africa", "r/Nigeria", "r/technology", "r/marketing", "r/business"]
                    .iter()
                    .map(|name| name.to_string())
                    .collect(),
                discussion_intensity: (if posts.len() > 50 { "High" } else { "Medium" }).to_string(),
                sentiment_trend: (if fastrand::bool() { "Positive" } else { "Mixed" }).to_string(),
            },
            posts,
            timestamp: now,
        }
    }

    pub fn trends(query: &str, geo: &str) -> TrendsReport {
        TrendsReport {
            platform: Platform::GoogleTrends.label().to_string(),
            query: query.to_string(),
            geography: geo.to_string(),
            interest_over_time: interest_timeline(),
            related_queries: {
                let related = [
                    format!("{query} 2024"),
                    format!("best {query}"),
                    format!("{query} near me"),
                    format!("how to {query}"),
                    format!("{query} price"),
                ];
                sample(&related.iter().map(String::as_str).collect::<Vec<_>>(), 3)
            },
            related_topics: sample(&TOPICS, 4),
            regional_interest: owned_map(&[
                ("Lagos", 100),
                ("Abuja", 75),
                ("Port Harcourt", 60),
                ("Kano", 45),
                ("Ibadan", 55),
            ]),
            trending_status: pick(&["Rising", "Steady", "Declining"]).to_string(),
            search_volume_index: fastrand::u32(40..=100),
            timestamp: Utc::now(),
        }
    }

    pub fn web(query: &str, max_results: usize) -> WebSearchReport {
        let now = Utc::now();
        let results: Vec<WebResult> = (0..max_results)
            .map(|i| WebResult {
                id: format!("result_{}", i + 1),
                title: format!("{query}: Latest Insights and Analysis"),
                url: format!("https://example.com/article-{}", i + 1),
                source: pick(&NEWS_SOURCES).to_string(),
                published_date: Some((now - TimeSpan::days(fastrand::i64(1..=90))).to_rfc3339()),
                snippet: format!("Comprehensive analysis of {query} trends in African markets..."),
                relevance_score: round2(uniform(0.7, 1.0)),
                content_type: pick(&["Article", "Blog Post", "News", "Report"]).to_string(),
            })
            .collect();

        WebSearchReport {
            platform: Platform::WebSearch.label().to_string(),
            query: query.to_string(),
            total_results: results.len(),
            results,
            metrics: WebMetrics {
                news_articles: fastrand::u32(5..=15),
                blog_posts: fastrand::u32(10..=30),
                academic_papers: fastrand::u32(2..=8),
                social_mentions: fastrand::u32(50..=200),
                top_domains: ["techcabal.com", "disrupt-africa.com", "venturesafrica.com"]
                    .iter()
                    .map(|domain| domain.to_string())
                    .collect(),
                content_freshness: (if fastrand::bool() { "Recent" } else { "Mixed" }).to_string(),
            },
            timestamp: now,
        }
    }
}

#[async_trait]
impl TrendSources for MockSources {
    fn name(&self) -> &str {
        "mock"
    }

    fn is_available(&self, _platform: Platform) -> bool {
        true
    }

    async fn search_tweets(&self, query: &str, max_results: usize) -> Option<TwitterReport> {
        self.pause(1.5, 2.5).await;
        Some(Self::twitter(query, max_results))
    }

    async fn search_videos(&self, query: &str, max_results: usize) -> Option<TikTokReport> {
        self.pause(1.5, 2.5).await;
        Some(Self::tiktok(query, max_results))
    }

    async fn search_posts(&self, query: &str, max_results: usize) -> Option<RedditReport> {
        self.pause(1.5, 2.5).await;
        Some(Self::reddit(query, max_results))
    }

    async fn get_trends(&self, query: &str, geo: &str) -> Option<TrendsReport> {
        self.pause(1.0, 2.0).await;
        Some(Self::trends(query, geo))
    }

    async fn web_search(&self, query: &str, max_results: usize) -> Option<WebSearchReport> {
        self.pause(1.0, 2.0).await;
        Some(Self::web(query, max_results))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_timeline_shape() {
        for _ in 0..50 {
            let timeline = interest_timeline();
            assert_eq!(timeline.len(), 12);
            assert!(timeline.iter().all(|point| point.value <= 100));
            assert!(timeline.iter().all(|point| point.date.len() == 7 && point.date.as_bytes()[4] == b'-'));
        }
    }

    #[test]
    fn test_tweet_count_capped_by_templates() {
        let report = MockSources::twitter("Detty December", 50);
        assert_eq!(report.total_results, 15);
        assert!(report.tweets.iter().all(|tweet| tweet.text.contains("Detty December")));

        let generic = MockSources::twitter("quantum", 50);
        assert_eq!(generic.total_results, 9);
        assert!(generic.tweets[0].text.contains("quantum"));

        assert_eq!(MockSources::twitter("M-Pesa mpesa", 4).total_results, 4);
    }

    #[test]
    fn test_twitter_metrics_consistent() {
        let report = MockSources::twitter("mpesa", 15);
        let total: u64 = report.tweets.iter().map(|tweet| tweet.engagement).sum();
        assert_eq!(report.metrics.total_engagement, total);
        assert!((report.metrics.sentiment_breakdown.total() - 100.0).abs() <= 0.15);
        assert!(!report.metrics.top_hashtags.is_empty());
    }

    #[test]
    fn test_geographic_distribution_is_counts() {
        let report = MockSources::twitter("mpesa", 5);
        let value = serde_json::to_value(&report.metrics).unwrap();
        assert_eq!(value["geographic_distribution"]["Nigeria"], serde_json::json!(45));
        assert_eq!(value["geographic_distribution"]["Other"], serde_json::json!(5));
    }

    #[test]
    fn test_generic_tweets_fall_back_to_default_hashtags() {
        let report = MockSources::twitter("quantum", 9);
        assert_eq!(report.metrics.top_hashtags, FALLBACK_HASHTAGS.to_vec());
    }

    #[test]
    fn test_sizes_follow_request() {
        assert_eq!(MockSources::tiktok("Gen Z", 30).videos.len(), 30);
        assert_eq!(MockSources::reddit("Gen Z", 50).metrics.discussion_intensity, "Medium");
        assert_eq!(MockSources::reddit("Gen Z", 51).metrics.discussion_intensity, "High");
        assert_eq!(MockSources::web("Gen Z", 20).total_results, 20);
        assert_eq!(MockSources::trends("Gen Z", "NG").related_queries.len(), 3);
    }

    #[tokio::test]
    async fn test_mock_sources_always_answer() {
        let sources = MockSources::new();
        assert!(sources.search_tweets("x", 3).await.is_some());
        assert!(sources.get_trends("x", "NG").await.is_some());
        assert!(sources.availability().iter().all(|(_, available)| *available));
    }
}
