//! Marketing trend research across social platforms.

use std::{path::PathBuf, sync::Arc};

use agentflow_research::{
    LiveSources, MockSources, ResearchPipeline, ResearchQuestion, TrendSources, pipeline::DEFAULT_GEO,
    presets,
};
use clap::Args;
use eyre::{Result, bail, eyre};
use tracing::{info, warn};

use super::Models;

#[derive(Args, Debug)]
pub struct Research {
    /// List the preset questions and exit.
    #[arg(long)]
    pub list: bool,

    /// Preset question key.
    #[arg(long, default_value = "gen_z_nigeria", conflicts_with = "custom")]
    pub question: String,

    /// Your own research question; needs --query.
    #[arg(long, requires = "query")]
    pub custom: Option<String>,

    /// Search query for a custom question.
    #[arg(long)]
    pub query: Option<String>,

    /// Call the real platform APIs instead of simulated data.
    #[arg(long)]
    pub live: bool,

    /// Pause like a real API when using simulated data.
    #[arg(long)]
    pub latency: bool,

    /// Region for search trends.
    #[arg(long, default_value = DEFAULT_GEO)]
    pub geo: String,

    /// Directory to save the JSON and text reports in.
    #[arg(long)]
    pub export: Option<PathBuf>,
}

impl Research {
    fn research_question(&self) -> Result<ResearchQuestion> {
        match (&self.custom, &self.query) {
            (Some(question), Some(query)) => Ok(ResearchQuestion::custom(question, query)?),
            (Some(_), None) => bail!("a custom question needs --query"),
            _ => ResearchQuestion::by_key(&self.question)
                .ok_or_else(|| eyre!("unknown research question `{}`", self.question)),
        }
    }

    fn sources(&self) -> Result<Arc<dyn TrendSources>> {
        if !self.live {
            return Ok(Arc::new(MockSources::new().with_simulated_latency(self.latency)));
        }
        let sources = LiveSources::from_env()?;
        for (platform, available) in sources.availability() {
            if available {
                info!("{platform} configured");
            } else {
                warn!("{platform} not configured");
            }
        }
        Ok(Arc::new(sources))
    }

    pub async fn run(self, models: &Models) -> Result<()> {
        if self.list {
            for question in presets() {
                println!("{:<20} {}", question.key, question.title);
                println!("{:<20} {}\n", "", question.question);
            }
            return Ok(());
        }

        let question = self.research_question()?;
        let pipeline = ResearchPipeline::new(models.client()?, self.sources()?).with_geo(&self.geo);
        println!("Researching: {}", question.question);

        let outcome = pipeline.run(&question).await?;
        if !outcome.failed_apis.is_empty() {
            warn!("no data from {}", outcome.failed_apis.join(", "));
        }
        println!("{}", outcome.to_text_report());

        if let Some(dir) = &self.export {
            let (json_path, text_path) = outcome.export(dir).await?;
            println!("Saved {}\nSaved {}", json_path.display(), text_path.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::cmd::{Cli, Command};

    fn parse(args: &[&str]) -> Result<Research> {
        let argv = ["agentflow", "research"].iter().chain(args.iter());
        match Cli::try_parse_from(argv)?.command {
            Command::Research(cmd) => Ok(cmd),
            other => Err(eyre!("unexpected command: {other:?}")),
        }
    }

    #[test]
    fn test_preset_question() {
        let cmd = parse(&["--question", "mpesa_competition"]).unwrap();
        assert_eq!(
            cmd.research_question().unwrap().search_query(),
            "M-Pesa dominance East Africa"
        );
        assert_eq!(cmd.geo, "NG");
    }

    #[test]
    fn test_custom_question_needs_query() {
        assert!(parse(&["--custom", "Why?"]).is_err());
        let cmd = parse(&["--custom", "Why?", "--query", "ghana fintech"]).unwrap();
        assert_eq!(cmd.research_question().unwrap().key, "custom");
    }

    #[tokio::test]
    async fn test_offline_research_runs() {
        let cmd = parse(&["--question", "creator_economy"]).unwrap();
        let models = Models {
            offline: true,
            endpoint: Default::default(),
        };
        let pipeline = ResearchPipeline::new(models.client().unwrap(), cmd.sources().unwrap());
        let outcome = pipeline.run(&cmd.research_question().unwrap()).await.unwrap();
        assert!(outcome.report.starts_with("echo:Create a comprehensive"));
        assert!(outcome.to_text_report().contains("Total Data Points:"));
    }
}
