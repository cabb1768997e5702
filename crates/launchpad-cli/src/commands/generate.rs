use super::context::AppContext;
use super::render;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use launchpad_application::ChannelNotifier;
use launchpad_core::analysis::AnalysisService;
use launchpad_core::generation::GenerationState;
use launchpad_core::report::{ReportCatalog, ReportStatus, ReportType};
use launchpad_core::startup::StartupInput;
use launchpad_execution::{GenerationSession, RunOutcome, SessionDependencies};
use launchpad_interaction::{ClaudeAnalysisService, FallbackAnalysisService};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// JSON file describing the startup (`idea` is required)
    #[arg(long, short)]
    pub input: PathBuf,

    /// Discard the current session and start from scratch
    #[arg(long)]
    pub restart: bool,

    /// Use offline fallback copy instead of the Claude API
    #[arg(long)]
    pub offline: bool,
}

/// Reads and validates a startup description.
pub fn load_input(path: &Path) -> Result<StartupInput> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let input: StartupInput = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} as startup input", path.display()))?;
    input.validate()?;
    Ok(input)
}

fn analysis_service(ctx: &AppContext, offline: bool) -> Result<Arc<dyn AnalysisService>> {
    if offline {
        return Ok(Arc::new(FallbackAnalysisService::new()));
    }
    let service = ClaudeAnalysisService::try_from_env(ctx.config.analysis.clone())
        .context("No Claude API key configured. Pass --offline to generate fallback copy")?;
    Ok(Arc::new(service))
}

fn spawn_progress_printer(
    mut rx: watch::Receiver<GenerationState>,
    catalog: ReportCatalog,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last: BTreeMap<ReportType, ReportStatus> = rx.borrow_and_update().status.clone();
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            for definition in catalog.entries() {
                let status = state.status_of(definition.report_type);
                if last.get(&definition.report_type) != Some(&status) {
                    render::print_transition(definition, status);
                }
            }
            last = state.status;
        }
    })
}

pub async fn run(ctx: &AppContext, args: GenerateArgs) -> Result<()> {
    let input = load_input(&args.input)?;
    let analysis = analysis_service(ctx, args.offline)?;
    let (notifier, mut notifications) = ChannelNotifier::new();

    let session = GenerationSession::mount(
        ctx.catalog(),
        ctx.config.generation.clone(),
        SessionDependencies {
            state_repository: ctx.state_repository(),
            reports_repository: ctx.reports_repository(),
            analysis,
            notifier: Arc::new(notifier),
        },
    )
    .await;

    let progress = session.progress();
    if progress.completed > 0 && !args.restart {
        println!(
            "Resuming session {} ({}/{} complete)",
            progress.session_id, progress.completed, progress.total
        );
    }
    println!(
        "{}",
        format!(
            "Generating {} reports for {} (estimated {})",
            progress.total,
            input.display_name(),
            render::format_duration(progress.estimated_remaining())
        )
        .bold()
    );

    let printer = tokio::spawn(async move {
        while let Some(notification) = notifications.recv().await {
            render::print_notification(&notification);
        }
    });
    let progress_printer = spawn_progress_printer(session.store().subscribe(), ctx.catalog());

    let orchestrator = session.orchestrator().clone();
    let restart = args.restart;
    let run_input = input.clone();
    let mut run = tokio::spawn(async move {
        if restart {
            orchestrator.force_restart(&run_input).await
        } else {
            orchestrator.resume(&run_input).await
        }
    });

    let outcome = tokio::select! {
        joined = &mut run => joined??,
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            println!("{}", "Pausing...".yellow());
            session.orchestrator().pause().await;
            run.await??
        }
    };

    match outcome {
        RunOutcome::Finished if session.progress().failed == 0 => {
            let reports = session.wait_for_results().await?;
            println!(
                "{}",
                format!("{} reports ready. View them with `launchpad reports`.", reports.reports.len())
                    .green()
                    .bold()
            );
        }
        RunOutcome::Finished => {
            render::print_progress(&session.progress());
        }
        RunOutcome::Paused => {
            println!(
                "{}",
                "Paused. Run `launchpad generate` again to resume.".yellow()
            );
        }
        RunOutcome::Superseded => {
            println!("{}", "Session was replaced by a restart.".yellow());
        }
        RunOutcome::AlreadyRunning => {
            println!("Generation is already running.");
        }
    }

    progress_printer.abort();
    drop(session);
    printer.abort();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_input_reads_camel_case_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("input.json");
        fs::write(
            &path,
            r#"{"idea":"Tool library","companyName":"Lendy","targetAudience":"Renters"}"#,
        )
        .unwrap();

        let input = load_input(&path).unwrap();

        assert_eq!(input.company_name, "Lendy");
        assert_eq!(input.target_audience, "Renters");
        assert!(input.problem.is_empty());
    }

    #[test]
    fn test_load_input_rejects_blank_idea() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("input.json");
        fs::write(&path, r#"{"idea":"  "}"#).unwrap();

        let err = load_input(&path).unwrap_err();

        assert!(err.to_string().contains("idea"));
    }

    #[test]
    fn test_load_input_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(load_input(&dir.path().join("missing.json")).is_err());
    }
}
