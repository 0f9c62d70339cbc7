//! Aggregations shared by the simulated and live connectors.

use crate::records::{Sentiment, SentimentBreakdown};

/// Hashtags reported when the collected texts carry none.
pub const FALLBACK_HASHTAGS: [&str; 5] = ["#Trending", "#Africa", "#Tech", "#Culture", "#Business"];

const POSITIVE_WORDS: [&str; 10] = [
    "great", "good", "love", "amazing", "excellent", "best", "awesome", "🔥", "❤️", "💯",
];
const NEGATIVE_WORDS: [&str; 9] = [
    "bad", "hate", "worst", "terrible", "awful", "poor", "disappointed", "😔", "😡",
];

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Share of each sentiment in percent. Empty input gives all zeros.
pub fn sentiment_breakdown(labels: &[Sentiment]) -> SentimentBreakdown {
    if labels.is_empty() {
        return SentimentBreakdown::default();
    }
    let total = labels.len() as f64;
    let share = |wanted: Sentiment| {
        let count = labels.iter().filter(|label| **label == wanted).count() as f64;
        round1(count / total * 100.0)
    };
    SentimentBreakdown {
        positive: share(Sentiment::Positive),
        neutral: share(Sentiment::Neutral),
        negative: share(Sentiment::Negative),
    }
}

/// The `limit` most frequent items; ties keep the order first seen.
pub fn most_common<I>(items: I, limit: usize) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut counts: Vec<(String, usize)> = Vec::new();
    for item in items {
        let item = item.into();
        match counts.iter_mut().find(|(seen, _)| *seen == item) {
            Some((_, count)) => *count += 1,
            None => counts.push((item, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(limit).map(|(item, _)| item).collect()
}

/// The `limit` most frequent `#` words across `texts`.
pub fn top_hashtags<'a, I>(texts: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    most_common(
        texts
            .into_iter()
            .flat_map(str::split_whitespace)
            .filter(|word| word.starts_with('#')),
        limit,
    )
}

/// Word-list sentiment for free text.
pub fn keyword_sentiment(text: &str) -> Sentiment {
    let lower = text.to_lowercase();
    let positive = POSITIVE_WORDS.iter().filter(|word| lower.contains(*word)).count();
    let negative = NEGATIVE_WORDS.iter().filter(|word| lower.contains(*word)).count();
    match positive.cmp(&negative) {
        std::cmp::Ordering::Greater => Sentiment::Positive,
        std::cmp::Ordering::Less => Sentiment::Negative,
        std::cmp::Ordering::Equal => Sentiment::Neutral,
    }
}

/// Mean of `total` over `count` items, zero when there are none.
pub fn average(total: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { total / count as f64 }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_sentiment_breakdown_rounds_each_share() {
        use Sentiment::*;
        let labels = [Positive, Positive, Neutral];
        let breakdown = sentiment_breakdown(&labels);
        assert_eq!(breakdown.positive, 66.7);
        assert_eq!(breakdown.neutral, 33.3);
        assert_eq!(breakdown.negative, 0.0);
        assert!((breakdown.total() - 100.0).abs() <= 0.1);
    }

    #[test]
    fn test_sentiment_breakdown_sums_to_hundred() {
        use Sentiment::*;
        let labels = [Positive, Negative, Neutral, Positive, Positive, Negative, Neutral];
        let breakdown = sentiment_breakdown(&labels);
        assert!((breakdown.total() - 100.0).abs() <= 0.15);
    }

    #[test]
    fn test_sentiment_breakdown_empty() {
        assert_eq!(sentiment_breakdown(&[]), SentimentBreakdown::default());
    }

    #[test]
    fn test_top_hashtags_ties_keep_first_sighting() {
        let texts = ["#b #a", "#a #c", "#c #d"];
        assert_eq!(top_hashtags(texts, 3), vec!["#a", "#c", "#b"]);
        assert!(top_hashtags(["no tags"], 5).is_empty());
    }

    #[test]
    fn test_most_common() {
        let subreddits = ["Kenya", "Africa", "Kenya", "Ghana", "Africa", "Kenya"];
        assert_eq!(most_common(subreddits, 2), vec!["Kenya", "Africa"]);
    }

    #[test]
    fn test_keyword_sentiment() {
        assert_eq!(keyword_sentiment("This is AMAZING 🔥"), Sentiment::Positive);
        assert_eq!(keyword_sentiment("worst fees, awful"), Sentiment::Negative);
        assert_eq!(keyword_sentiment("good but bad"), Sentiment::Neutral);
    }

    #[test]
    fn test_average() {
        assert_eq!(average(10.0, 4), 2.5);
        assert_eq!(average(10.0, 0), 0.0);
    }
}
