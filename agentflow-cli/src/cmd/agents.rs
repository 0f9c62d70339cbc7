//! Roster listings.

use clap::Args;
use eyre::Result;

use super::load_roster;

const BUILT_IN: [&str; 4] = ["assistants", "advanced", "launch", "research"];

#[derive(Args, Debug)]
pub struct Agents {
    /// Roster to show; all built-in rosters when omitted.
    pub roster: Option<String>,

    /// Include each agent's system prompt.
    #[arg(long)]
    pub prompts: bool,
}

impl Agents {
    pub fn run(self) -> Result<()> {
        let names: Vec<&str> = match &self.roster {
            Some(name) => vec![name.as_str()],
            None => BUILT_IN.to_vec(),
        };
        for name in names {
            let roster = load_roster(name, None)?;
            println!("{name}:");
            for profile in roster.iter() {
                if profile.role.is_empty() {
                    println!("  {:<20} {}", profile.key, profile.label());
                } else {
                    println!("  {:<20} {} ({})", profile.key, profile.label(), profile.role);
                }
                if self.prompts {
                    for line in profile.system_prompt.lines() {
                        println!("      {line}");
                    }
                }
            }
            println!();
        }
        Ok(())
    }
}
