use super::context::AppContext;
use anyhow::Result;
use colored::Colorize;
use launchpad_core::generation::{FinalReportsRepository, GenerationStateRepository};

pub async fn run(ctx: &AppContext, all: bool) -> Result<()> {
    ctx.state_repository().clear().await?;
    println!("{}", "Discarded the in-progress session.".green());

    if all {
        ctx.reports_repository().clear().await?;
        println!("{}", "Deleted the last completed reports.".green());
    }
    Ok(())
}
