use super::context::AppContext;
use super::render;
use anyhow::Result;
use chrono::Utc;
use launchpad_application::GenerationProgress;
use launchpad_core::generation::{FinalReportsRepository, GenerationStateRepository};

pub async fn run(ctx: &AppContext, json: bool) -> Result<()> {
    let catalog = ctx.catalog();
    let Some(mut state) = ctx.state_repository().load().await? else {
        match ctx.reports_repository().load().await? {
            Some(reports) => println!(
                "No session in progress. Last reports were generated at {} (`launchpad reports`).",
                reports.generated_at.format("%Y-%m-%d %H:%M UTC")
            ),
            None => println!("No session in progress. Start one with `launchpad generate`."),
        }
        return Ok(());
    };

    state.reconcile(&catalog);
    let progress = GenerationProgress::from_state(
        &state,
        &catalog,
        Utc::now(),
        ctx.config.generation.stuck_threshold(),
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&progress)?);
    } else {
        render::print_progress(&progress);
    }
    Ok(())
}
