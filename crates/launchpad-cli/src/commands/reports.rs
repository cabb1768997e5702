use super::context::AppContext;
use anyhow::{Context, Result, bail};
use clap::Args;
use colored::Colorize;
use launchpad_core::generation::{FinalReports, FinalReportsRepository};
use launchpad_core::report::{ReportCatalog, ReportType};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Args, Debug)]
pub struct ReportsArgs {
    /// Only this report (e.g. `business-plan`, `landing-page`)
    #[arg(long, short, value_parser = parse_report_type)]
    pub report: Option<ReportType>,

    /// Write each report to `<dir>/<report>.md` instead of printing
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

fn parse_report_type(value: &str) -> Result<ReportType, String> {
    ReportType::from_str(value).map_err(|_| {
        let known: Vec<String> = ReportCatalog::standard()
            .report_types()
            .map(|t| t.to_string())
            .collect();
        format!("unknown report '{}', expected one of: {}", value, known.join(", "))
    })
}

fn selected<'a>(
    reports: &'a FinalReports,
    only: Option<ReportType>,
) -> Result<Vec<(ReportType, &'a str)>> {
    match only {
        Some(report_type) => {
            let content = reports
                .get(report_type)
                .with_context(|| format!("Report '{}' was not generated", report_type))?;
            Ok(vec![(report_type, content)])
        }
        None => Ok(reports
            .reports
            .iter()
            .map(|(report_type, content)| (*report_type, content.as_str()))
            .collect()),
    }
}

fn export(dir: &Path, reports: &[(ReportType, &str)]) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    for (report_type, content) in reports {
        let path = dir.join(format!("{}.md", report_type));
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("  ✓ Wrote {}", path.display());
    }
    Ok(())
}

pub async fn run(ctx: &AppContext, args: ReportsArgs) -> Result<()> {
    let Some(reports) = ctx.reports_repository().load().await? else {
        bail!("No generated reports found. Run `launchpad generate` first.");
    };
    let selection = selected(&reports, args.report)?;

    if let Some(dir) = &args.output {
        return export(dir, &selection);
    }

    for (report_type, content) in selection {
        println!("{}", format!("=== {} ===", report_type.display_name()).bold());
        println!("{}\n", content);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn reports() -> FinalReports {
        FinalReports {
            session_id: "s-1".into(),
            generated_at: Utc::now(),
            reports: BTreeMap::from([
                (ReportType::BusinessPlan, "# Plan".to_string()),
                (ReportType::LandingPage, "# Landing".to_string()),
            ]),
        }
    }

    #[test]
    fn test_parse_report_type() {
        assert_eq!(parse_report_type("ux-design"), Ok(ReportType::UxDesign));
        let err = parse_report_type("pitch-deck").unwrap_err();
        assert!(err.contains("business-plan"));
    }

    #[test]
    fn test_selected_single_report() {
        let reports = reports();

        let selection = selected(&reports, Some(ReportType::LandingPage)).unwrap();

        assert_eq!(selection, vec![(ReportType::LandingPage, "# Landing")]);
        assert!(selected(&reports, Some(ReportType::Financial)).is_err());
        assert_eq!(selected(&reports, None).unwrap().len(), 2);
    }

    #[test]
    fn test_export_writes_markdown_files() {
        let dir = TempDir::new().unwrap();
        let reports = reports();
        let selection = selected(&reports, None).unwrap();

        export(&dir.path().join("out"), &selection).unwrap();

        let plan = fs::read_to_string(dir.path().join("out/business-plan.md")).unwrap();
        assert_eq!(plan, "# Plan");
    }
}
