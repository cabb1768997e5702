//! Prompt rendering for report generation.
//!
//! One short template per report type, rendered with minijinja against the
//! startup input.

use launchpad_core::report::ReportType;
use launchpad_core::startup::StartupInput;
use minijinja::{Environment, context};

const STARTUP_CONTEXT: &str = r#"Startup idea: {{ idea }}
{% if company_name %}Company name: {{ company_name }}
{% endif %}{% if target_audience %}Target audience: {{ target_audience }}
{% endif %}{% if problem %}Problem: {{ problem }}
{% endif %}{% if solution %}Solution: {{ solution }}
{% endif %}{% if unique_value %}Unique value: {{ unique_value }}
{% endif %}"#;

const REPORT_PROMPT: &str = r#"{% include "startup_context" %}
Write a {{ report_name }} for {{ display_name }}.
{{ instructions }}
Answer in Markdown with clear section headings."#;

/// System prompt shared by every report request.
pub const SYSTEM_PROMPT: &str = "You are a senior startup analyst. \
Produce practical, specific and honest analysis grounded in the information provided.";

fn instructions(report_type: ReportType) -> &'static str {
    match report_type {
        ReportType::BusinessPlan => {
            "Cover the executive summary, business model, revenue streams, go-to-market and key milestones."
        }
        ReportType::Marketing => {
            "Cover positioning, customer segments, channels, messaging and a 90-day launch plan."
        }
        ReportType::Competitive => {
            "Identify direct and indirect competitors, compare strengths and weaknesses, and name defensible advantages."
        }
        ReportType::Technical => {
            "Propose an architecture, technology stack, MVP scope, build phases and main technical risks."
        }
        ReportType::UxDesign => {
            "Describe user personas, core journeys, key screens and usability priorities."
        }
        ReportType::Financial => {
            "Estimate startup costs, pricing, a three-year revenue projection, burn rate and break-even point."
        }
        ReportType::LandingPage => {
            "Write landing page copy: headline, subheadline, three feature blocks, social proof and a call to action."
        }
    }
}

/// Renders prompts for report generation.
pub struct PromptRenderer {
    env: Environment<'static>,
}

impl PromptRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        // Templates are compile-time constants
        env.add_template("startup_context", STARTUP_CONTEXT)
            .expect("startup context template is valid");
        env.add_template("report", REPORT_PROMPT)
            .expect("report template is valid");
        Self { env }
    }

    /// Renders the user prompt for one report.
    pub fn render(
        &self,
        report_type: ReportType,
        input: &StartupInput,
    ) -> Result<String, minijinja::Error> {
        let template = self.env.get_template("report")?;
        template.render(context! {
            idea => input.idea.trim(),
            company_name => input.company_name.trim(),
            target_audience => input.target_audience.trim(),
            problem => input.problem.trim(),
            solution => input.solution.trim(),
            unique_value => input.unique_value.trim(),
            display_name => input.display_name(),
            report_name => report_type.display_name().to_lowercase(),
            instructions => instructions(report_type),
        })
    }
}

impl Default for PromptRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_input_and_instructions() {
        let input = StartupInput::new("Drone delivery for pharmacies")
            .with_company_name("SkyRx")
            .with_target_audience("Rural clinics");

        let prompt = PromptRenderer::new()
            .render(ReportType::Financial, &input)
            .unwrap();

        assert!(prompt.contains("Startup idea: Drone delivery for pharmacies"));
        assert!(prompt.contains("Target audience: Rural clinics"));
        assert!(prompt.contains("financial projections for SkyRx"));
        assert!(prompt.contains("break-even"));
    }

    #[test]
    fn test_blank_fields_are_omitted() {
        let prompt = PromptRenderer::new()
            .render(ReportType::Marketing, &StartupInput::new("Plant swap app"))
            .unwrap();

        assert!(!prompt.contains("Company name:"));
        assert!(!prompt.contains("Problem:"));
        assert!(prompt.contains("Your Startup"));
    }
}
