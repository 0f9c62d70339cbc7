//! Side-by-side answers from two agents.

use std::path::PathBuf;

use agentflow_agent::compare;
use clap::Args;
use eyre::Result;

use super::{Models, file_timestamp, joined, load_roster, write_export};

#[derive(Args, Debug)]
pub struct Compare {
    /// Built-in roster both agents come from.
    #[arg(long, default_value = "advanced")]
    pub roster: String,

    /// YAML roster file, used instead of a built-in roster.
    #[arg(long)]
    pub roster_file: Option<PathBuf>,

    /// Directory to save the comparison in as JSON.
    #[arg(long)]
    pub export: Option<PathBuf>,

    pub first: String,

    pub second: String,

    #[arg(required = true)]
    pub query: Vec<String>,
}

impl Compare {
    pub async fn run(self, models: &Models) -> Result<()> {
        let roster = load_roster(&self.roster, self.roster_file.as_deref())?;
        let query = joined(&self.query);
        let comparison = compare(models.client()?, &roster, &self.first, &self.second, &query).await?;

        for output in [&comparison.first, &comparison.second] {
            println!("{} {}\n{}\n", output.icon, output.name, output.text);
        }
        if let Some(dir) = &self.export {
            let file_name = format!("comparison_{}.json", file_timestamp());
            write_export(dir, &file_name, &serde_json::to_string_pretty(&comparison)?).await?;
        }
        Ok(())
    }
}
