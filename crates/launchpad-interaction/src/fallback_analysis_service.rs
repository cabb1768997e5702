//! Offline analysis service producing deterministic fallback copy.

use async_trait::async_trait;
use launchpad_core::analysis::{AnalysisError, AnalysisService};
use launchpad_core::report::ReportType;
use launchpad_core::startup::StartupInput;

/// Builds report skeletons straight from the startup input.
///
/// Used when no provider is configured (`--offline`); the output is a
/// structured starting point, not analysis.
#[derive(Debug, Default, Clone, Copy)]
pub struct FallbackAnalysisService;

impl FallbackAnalysisService {
    pub fn new() -> Self {
        Self
    }
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() { placeholder } else { trimmed }
}

fn sections(report_type: ReportType) -> &'static [&'static str] {
    match report_type {
        ReportType::BusinessPlan => &[
            "Executive Summary",
            "Business Model",
            "Go-to-Market",
            "Milestones",
        ],
        ReportType::Marketing => &["Positioning", "Customer Segments", "Channels", "Launch Plan"],
        ReportType::Competitive => &["Competitor Landscape", "Differentiators", "Risks"],
        ReportType::Technical => &["Architecture", "Technology Stack", "MVP Scope"],
        ReportType::UxDesign => &["Personas", "Core Journeys", "Key Screens"],
        ReportType::Financial => &["Startup Costs", "Pricing", "Projections", "Break-even"],
        ReportType::LandingPage => &["Headline", "Features", "Call to Action"],
    }
}

#[async_trait]
impl AnalysisService for FallbackAnalysisService {
    async fn analyze(
        &self,
        report_type: ReportType,
        input: &StartupInput,
    ) -> Result<String, AnalysisError> {
        let audience = or_placeholder(&input.target_audience, "early adopters");
        let problem = or_placeholder(&input.problem, "an unmet need");
        let solution = or_placeholder(&input.solution, input.idea.trim());
        let value = or_placeholder(&input.unique_value, "a simpler experience");

        let mut report = format!(
            "# {} for {}\n\n{} helps {} with {}: {}. What sets it apart is {}.\n",
            report_type.display_name(),
            input.display_name(),
            input.display_name(),
            audience,
            problem,
            solution,
            value,
        );
        for section in sections(report_type) {
            report.push_str(&format!(
                "\n## {}\n\nOutline the {} for {} here.\n",
                section,
                section.to_lowercase(),
                input.display_name()
            ));
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fallback_copy_uses_input() {
        let input = StartupInput::new("Tool library for apartments").with_company_name("Lendy");

        let report = FallbackAnalysisService::new()
            .analyze(ReportType::LandingPage, &input)
            .await
            .unwrap();

        assert!(report.starts_with("# Landing Page Copy for Lendy"));
        assert!(report.contains("Tool library for apartments"));
        assert!(report.contains("## Call to Action"));
    }
}
