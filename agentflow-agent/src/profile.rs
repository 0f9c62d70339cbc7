//! Agent profiles and the rosters they are grouped into.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};

/// A named persona backed by a system prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Stable identifier used in workflows and results.
    pub key: String,
    /// Display name.
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    /// Functional role, e.g. `data_collector`.
    #[serde(default)]
    pub role: String,
    pub system_prompt: String,
}

impl AgentProfile {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            icon: String::new(),
            color: String::new(),
            role: String::new(),
            system_prompt: system_prompt.into(),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Icon and name, as shown in listings.
    pub fn label(&self) -> String {
        if self.icon.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.icon, self.name)
        }
    }
}

/// Ordered, immutable set of agent profiles keyed by `key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(into = "Vec<AgentProfile>", try_from = "Vec<AgentProfile>")]
pub struct Roster {
    agents: Vec<AgentProfile>,
}

impl TryFrom<Vec<AgentProfile>> for Roster {
    type Error = AgentError;

    fn try_from(agents: Vec<AgentProfile>) -> Result<Self> {
        Self::new(agents)
    }
}

impl From<Roster> for Vec<AgentProfile> {
    fn from(roster: Roster) -> Self {
        roster.agents
    }
}

impl Roster {
    /// Build a roster, rejecting duplicate or empty keys.
    pub fn new(agents: Vec<AgentProfile>) -> Result<Self> {
        for (index, agent) in agents.iter().enumerate() {
            if agent.key.trim().is_empty() {
                return Err(AgentError::configuration("agent key must not be empty"));
            }
            if agents[..index].iter().any(|other| other.key == agent.key) {
                return Err(AgentError::configuration(format!(
                    "duplicate agent key: {}",
                    agent.key
                )));
            }
        }
        Ok(Self { agents })
    }

    /// Load a roster from a YAML list of profiles.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let agents: Vec<AgentProfile> = serde_yaml::from_str(yaml)?;
        Self::new(agents)
    }

    pub fn get(&self, key: &str) -> Option<&AgentProfile> {
        self.agents.iter().find(|agent| agent.key == key)
    }

    /// Look up a profile, failing with `NotFound` when absent.
    pub fn require(&self, key: &str) -> Result<&AgentProfile> {
        self.get(key)
            .ok_or_else(|| AgentError::not_found(format!("agent '{key}'")))
    }

    pub fn keys(&self) -> Vec<&str> {
        self.agents.iter().map(|agent| agent.key.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentProfile> {
        self.agents.iter()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Built-in rosters.
pub mod rosters {
    use super::*;

    static ASSISTANTS: Lazy<Roster> = Lazy::new(|| Roster {
        agents: vec![
            AgentProfile::new(
                "Agent 1",
                "Research Assistant",
                "You are a helpful research assistant. You provide detailed, well-researched answers with citations and explanations.",
            )
            .with_icon("📚")
            .with_color("#FF6B6B"),
            AgentProfile::new(
                "Agent 2",
                "Code Helper",
                "You are an expert programming assistant. You help with code review, debugging, and writing clean, efficient code.",
            )
            .with_icon("💻")
            .with_color("#4ECDC4"),
            AgentProfile::new(
                "Agent 3",
                "Creative Writer",
                "You are a creative writing assistant. You help with storytelling, content creation, and creative ideation.",
            )
            .with_icon("✍️")
            .with_color("#95E1D3"),
        ],
    });

    static ADVANCED: Lazy<Roster> = Lazy::new(|| Roster {
        agents: vec![
            AgentProfile::new(
                "Analyst",
                "Data Analyst Agent",
                "You are a data analyst AI. You excel at:
- Analyzing data patterns and trends
- Creating insights from information
- Providing statistical perspectives
- Suggesting data-driven decisions
Always structure your responses with clear findings and recommendations.",
            )
            .with_icon("📊")
            .with_color("#FF6B6B"),
            AgentProfile::new(
                "Strategist",
                "Strategic Planning Agent",
                "You are a strategic planning AI. You specialize in:
- Long-term planning and goal setting
- Risk assessment and mitigation
- Resource allocation strategies
- Competitive analysis
Provide structured strategic recommendations with pros and cons.",
            )
            .with_icon("🎯")
            .with_color("#4ECDC4"),
            AgentProfile::new(
                "Innovator",
                "Innovation Agent",
                "You are an innovation-focused AI. Your strengths include:
- Creative problem-solving
- Identifying emerging trends
- Proposing novel solutions
- Thinking outside the box
Offer innovative ideas with practical implementation paths.",
            )
            .with_icon("💡")
            .with_color("#95E1D3"),
            AgentProfile::new(
                "Critic",
                "Critical Reviewer Agent",
                "You are a critical analysis AI. You focus on:
- Identifying potential flaws and weaknesses
- Challenging assumptions
- Providing constructive criticism
- Ensuring quality and rigor
Give balanced critiques with specific improvement suggestions.",
            )
            .with_icon("🔍")
            .with_color("#F38181"),
        ],
    });

    static LAUNCH_TEAM: Lazy<Roster> = Lazy::new(|| Roster {
        agents: vec![
            AgentProfile::new(
                "researcher",
                "Market Researcher",
                "You are a Market Research Analyst specializing in tech products.

Your responsibilities:
- Analyze market trends and opportunities
- Identify target audiences and competitors
- Provide data-driven insights
- Assess market readiness

Keep your analysis concise (3-4 key points) and actionable.",
            )
            .with_icon("📊")
            .with_color("#FF6B6B")
            .with_role("market_analysis"),
            AgentProfile::new(
                "strategist",
                "Launch Strategist",
                "You are a Product Launch Strategist with expertise in go-to-market planning.

Your responsibilities:
- Develop launch strategies based on research
- Define positioning and messaging
- Create timeline and milestones
- Identify key success metrics

Keep your strategy focused (3-4 main initiatives) and realistic.",
            )
            .with_icon("🎯")
            .with_color("#4ECDC4")
            .with_role("strategy_planning"),
            AgentProfile::new(
                "writer",
                "Content Creator",
                "You are a Creative Content Writer specializing in tech marketing.

Your responsibilities:
- Create compelling marketing copy
- Write engaging product descriptions
- Craft social media content
- Ensure brand voice consistency

Keep your content punchy and memorable (2-3 key messages).",
            )
            .with_icon("✍️")
            .with_color("#95E1D3")
            .with_role("content_creation"),
            AgentProfile::new(
                "reviewer",
                "Quality Reviewer",
                "You are a Quality Assurance Reviewer for marketing campaigns.

Your responsibilities:
- Review all previous agent outputs
- Identify gaps or inconsistencies
- Provide constructive feedback
- Suggest improvements

Keep your review balanced (2-3 strengths, 2-3 improvements).",
            )
            .with_icon("🔍")
            .with_color("#F38181")
            .with_role("quality_assurance"),
        ],
    });

    static RESEARCH_TEAM: Lazy<Roster> = Lazy::new(|| Roster {
        agents: vec![
            AgentProfile::new(
                "orchestrator",
                "Research Orchestrator",
                "You are a Research Orchestrator for a marketing agency.
Your role is to coordinate multi-source research projects and ensure comprehensive data collection.
Break down research questions into specific data collection tasks for specialized agents.",
            )
            .with_icon("🎯")
            .with_color("#FF6B6B")
            .with_role("coordinator"),
            AgentProfile::new(
                "social_media",
                "Social Media Intelligence Agent",
                "You are a Social Media Intelligence Agent specializing in Twitter/X, TikTok, and Reddit analysis.
Analyze social media data for trends, sentiment, engagement patterns, and audience insights.
Focus on actionable insights for marketing strategies.",
            )
            .with_icon("📱")
            .with_color("#4ECDC4")
            .with_role("data_collector"),
            AgentProfile::new(
                "trends",
                "Trends Analysis Agent",
                "You are a Trends Analysis Agent specializing in Google Trends data.
Analyze search trends, regional interest, related queries, and temporal patterns.
Identify rising trends and seasonal patterns relevant to marketing campaigns.",
            )
            .with_icon("📈")
            .with_color("#45B7D1")
            .with_role("data_collector"),
            AgentProfile::new(
                "web_intelligence",
                "Web Intelligence Agent",
                "You are a Web Intelligence Agent specializing in web search and content analysis.
Analyze news articles, blog posts, reports, and online discussions.
Extract key themes, expert opinions, and market signals.",
            )
            .with_icon("🌐")
            .with_color("#96CEB4")
            .with_role("data_collector"),
            AgentProfile::new(
                "insight_analyst",
                "Insight Analyst Agent",
                "You are an Insight Analyst Agent for a marketing agency.
Synthesize data from multiple sources to identify patterns, trends, and actionable insights.
Focus on: audience behavior, market opportunities, competitive dynamics, and strategic recommendations.",
            )
            .with_icon("🔍")
            .with_color("#FFEAA7")
            .with_role("analyst"),
            AgentProfile::new(
                "report_generator",
                "Report Generator Agent",
                "You are a Report Generator Agent for a marketing agency.
Create comprehensive, client-ready research reports with:
- Executive Summary
- Key Findings
- Platform-specific Insights
- Audience Demographics
- Sentiment Analysis
- Actionable Recommendations
- Data Sources

Use clear, professional language suitable for marketing executives.",
            )
            .with_icon("📄")
            .with_color("#DFE6E9")
            .with_role("synthesizer"),
        ],
    });

    /// General-purpose chat assistants.
    pub fn assistants() -> Roster {
        ASSISTANTS.clone()
    }

    /// Analyst, Strategist, Innovator and Critic.
    pub fn advanced() -> Roster {
        ADVANCED.clone()
    }

    /// Product launch team: researcher, strategist, writer, reviewer.
    pub fn launch_team() -> Roster {
        LAUNCH_TEAM.clone()
    }

    /// Agents behind the trend research pipeline.
    pub fn research_team() -> Roster {
        RESEARCH_TEAM.clone()
    }

    /// Look up a built-in roster by name.
    pub fn by_name(name: &str) -> Option<Roster> {
        match name {
            "assistants" => Some(assistants()),
            "advanced" => Some(advanced()),
            "launch" | "launch_team" => Some(launch_team()),
            "research" | "research_team" => Some(research_team()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_builtin_rosters_are_ordered() {
        assert_eq!(
            rosters::advanced().keys(),
            vec!["Analyst", "Strategist", "Innovator", "Critic"]
        );
        assert_eq!(
            rosters::launch_team().keys(),
            vec!["researcher", "strategist", "writer", "reviewer"]
        );
        assert_eq!(rosters::research_team().len(), 6);
        assert_eq!(
            rosters::assistants().get("Agent 2").map(AgentProfile::label),
            Some("💻 Code Helper".to_string())
        );
    }

    #[test]
    fn test_roster_from_yaml() {
        let yaml = r#"
- key: scout
  name: Scout
  icon: "🔭"
  system_prompt: Look ahead.
- key: judge
  name: Judge
  system_prompt: Decide.
"#;
        let roster = Roster::from_yaml_str(yaml).unwrap();
        assert_eq!(roster.keys(), vec!["scout", "judge"]);
        assert_eq!(roster.require("judge").unwrap().icon, "");
        assert!(roster.require("missing").is_err());
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let err = Roster::new(vec![
            AgentProfile::new("a", "A", "x"),
            AgentProfile::new("a", "A2", "y"),
        ])
        .unwrap_err();
        assert_eq!(err.category(), "configuration");
    }

    #[test]
    fn test_deserialized_roster_rejects_duplicate_keys() {
        let yaml = r#"
- key: scout
  name: Scout
  system_prompt: Look ahead.
- key: scout
  name: Other Scout
  system_prompt: Look back.
"#;
        assert!(Roster::from_yaml_str(yaml).is_err());
        assert!(serde_yaml::from_str::<Roster>(yaml).is_err());

        let roster: Roster = serde_json::from_str(
            r#"[{"key": "a", "name": "A", "system_prompt": "x"}]"#,
        )
        .unwrap();
        assert_eq!(roster.keys(), vec!["a"]);
    }

    #[test]
    fn test_by_name() {
        assert!(rosters::by_name("launch").is_some());
        assert!(rosters::by_name("nope").is_none());
    }
}
