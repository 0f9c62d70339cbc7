//! Plan, execute and reflect on a task.

use std::path::PathBuf;

use agentflow_cognitive::{PlanMode, Planner, PlanningReport, planning::SAMPLE_TASKS};
use clap::{Args, ValueEnum};
use eyre::{Result, bail, eyre};

use super::{Models, file_timestamp, joined, write_export};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlanModeArg {
    PlanOnly,
    PlanAndExecute,
    PlanExecuteReflect,
}

impl From<PlanModeArg> for PlanMode {
    fn from(mode: PlanModeArg) -> Self {
        match mode {
            PlanModeArg::PlanOnly => PlanMode::PlanOnly,
            PlanModeArg::PlanAndExecute => PlanMode::PlanAndExecute,
            PlanModeArg::PlanExecuteReflect => PlanMode::PlanExecuteReflect,
        }
    }
}

#[derive(Args, Debug)]
pub struct Plan {
    #[arg(long, value_enum, default_value_t = PlanModeArg::PlanExecuteReflect)]
    pub mode: PlanModeArg,

    /// Use a sample task: launch_campaign, market_research or build_mvp.
    #[arg(long, conflicts_with = "task")]
    pub sample: Option<String>,

    /// Directory to save the report in as JSON.
    #[arg(long)]
    pub export: Option<PathBuf>,

    pub task: Vec<String>,
}

impl Plan {
    fn task(&self) -> Result<String> {
        if let Some(key) = &self.sample {
            return SAMPLE_TASKS
                .iter()
                .find(|(sample, _)| sample == key)
                .map(|(_, task)| task.to_string())
                .ok_or_else(|| eyre!("unknown sample task `{key}`"));
        }
        let task = joined(&self.task);
        if task.is_empty() {
            bail!("give a task or pick one with --sample");
        }
        Ok(task)
    }

    pub async fn run(self, models: &Models) -> Result<()> {
        let task = self.task()?;
        let report = Planner::new(models.client()?)
            .run(&task, self.mode.into())
            .await?;
        print_report(&report);
        if let Some(dir) = &self.export {
            let file_name = format!("plan_{}.json", file_timestamp());
            write_export(dir, &file_name, &report.to_json_pretty()?).await?;
        }
        Ok(())
    }
}

fn print_report(report: &PlanningReport) {
    let plan = &report.plan;
    if let Some(error) = &plan.error {
        println!("Planning failed: {error}");
        return;
    }
    println!("Analysis\n{}\n", plan.analysis);
    for step in &plan.steps {
        println!("{}. {}\n   {}", step.step_number, step.title, step.description);
    }
    if !plan.success_criteria.is_empty() {
        println!("\nSuccess criteria: {}", plan.success_criteria);
    }
    for result in &report.execution_results {
        println!("\nStep {}: {}\n{}", result.step_number, result.title, result.result);
    }
    if let Some(reflection) = &report.reflection {
        println!("\nReflection\n{reflection}");
    }
}
