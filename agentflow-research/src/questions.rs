//! Research questions, preset and custom.

use serde::{Deserialize, Serialize};

use crate::error::{ResearchError, Result};

/// A marketing research question and the terms searched for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchQuestion {
    pub key: String,
    pub title: String,
    pub question: String,
    pub focus: String,
    /// The first term drives every platform search.
    pub search_terms: Vec<String>,
}

impl ResearchQuestion {
    fn preset(key: &str, title: &str, question: &str, focus: &str, terms: [&str; 3]) -> Self {
        Self {
            key: key.to_string(),
            title: title.to_string(),
            question: question.to_string(),
            focus: focus.to_string(),
            search_terms: terms.iter().map(|term| term.to_string()).collect(),
        }
    }

    /// A free-form question searched with `search_query`.
    pub fn custom(question: impl Into<String>, search_query: impl Into<String>) -> Result<Self> {
        let question = question.into();
        let search_query = search_query.into();
        if question.trim().is_empty() {
            return Err(ResearchError::Question("question is empty".to_string()));
        }
        if search_query.trim().is_empty() {
            return Err(ResearchError::Question("search query is empty".to_string()));
        }
        Ok(Self {
            key: "custom".to_string(),
            title: "Custom Research".to_string(),
            question,
            focus: "General market research".to_string(),
            search_terms: vec![search_query],
        })
    }

    /// Look up a preset by key.
    pub fn by_key(key: &str) -> Option<Self> {
        presets().into_iter().find(|question| question.key == key)
    }

    pub fn search_query(&self) -> &str {
        self.search_terms.first().map(String::as_str).unwrap_or(&self.question)
    }
}

/// The built-in questions, in display order.
pub fn presets() -> Vec<ResearchQuestion> {
    vec![
        ResearchQuestion::preset(
            "gen_z_nigeria",
            "Gen Z Nigeria: Facebook vs Google Usage",
            "Why does Gen Z in Nigeria appear to use Facebook for community and content discovery, while using Google primarily for functional, task-based searches?",
            "Social behavior patterns, platform preferences, user motivations",
            [
                "Gen Z Nigeria Facebook",
                "Nigeria Google usage",
                "Nigerian social media behavior",
            ],
        ),
        ResearchQuestion::preset(
            "detty_december",
            "Detty December Tourism Analysis",
            "Beyond the parties, what are the core drivers and frustrations for the diaspora and domestic tourists participating in 'Detty December' in Nigeria and Ghana?",
            "Tourism motivations, pain points, diaspora engagement",
            [
                "Detty December Nigeria Ghana",
                "Diaspora tourism Africa",
                "December tourism West Africa",
            ],
        ),
        ResearchQuestion::preset(
            "creator_economy",
            "African Creator Economy Challenges",
            "What are the primary financial challenges and unmet needs of emerging creators and gamers in key African markets?",
            "Monetization barriers, infrastructure gaps, creator pain points",
            [
                "African creators challenges",
                "African gamers monetization",
                "Creator economy Africa",
            ],
        ),
        ResearchQuestion::preset(
            "mpesa_competition",
            "M-Pesa Market Dominance Analysis",
            "What are the primary drivers of M-Pesa's dominance in East Africa, and what specific user frustrations or unmet needs could a competitor leverage to capture market share among the digital-native population?",
            "Competitive analysis, user pain points, market opportunities",
            [
                "M-Pesa dominance East Africa",
                "Mobile money Kenya",
                "M-Pesa competition",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_presets() {
        let keys: Vec<String> = presets().into_iter().map(|q| q.key).collect();
        assert_eq!(
            keys,
            vec!["gen_z_nigeria", "detty_december", "creator_economy", "mpesa_competition"]
        );
        let detty = ResearchQuestion::by_key("detty_december").unwrap();
        assert_eq!(detty.search_query(), "Detty December Nigeria Ghana");
        assert!(ResearchQuestion::by_key("unknown").is_none());
    }

    #[test]
    fn test_custom_question() {
        let question = ResearchQuestion::custom("How do Kenyans pay online?", "Kenya payments").unwrap();
        assert_eq!(question.key, "custom");
        assert_eq!(question.search_query(), "Kenya payments");
        assert!(ResearchQuestion::custom("", "q").is_err());
        assert!(ResearchQuestion::custom("q", "  ").is_err());
    }
}
