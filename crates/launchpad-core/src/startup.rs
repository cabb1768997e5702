//! Startup input collected from the user.

use crate::error::{LaunchpadError, Result};
use serde::{Deserialize, Serialize};

/// Read-only description of a startup idea, passed to every analysis call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupInput {
    pub idea: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub solution: String,
    #[serde(default)]
    pub unique_value: String,
}

impl StartupInput {
    pub fn new(idea: impl Into<String>) -> Self {
        Self {
            idea: idea.into(),
            ..Self::default()
        }
    }

    pub fn with_company_name(mut self, company_name: impl Into<String>) -> Self {
        self.company_name = company_name.into();
        self
    }

    pub fn with_target_audience(mut self, target_audience: impl Into<String>) -> Self {
        self.target_audience = target_audience.into();
        self
    }

    /// Checks the only hard precondition of a run: non-empty idea text.
    pub fn validate(&self) -> Result<()> {
        if self.idea.trim().is_empty() {
            return Err(LaunchpadError::missing_input(
                "startup idea text is required to generate reports",
            ));
        }
        Ok(())
    }

    /// Company name, or a neutral placeholder when the user left it blank.
    pub fn display_name(&self) -> &str {
        let name = self.company_name.trim();
        if name.is_empty() { "Your Startup" } else { name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_idea_is_rejected() {
        let err = StartupInput::new("   ").validate().unwrap_err();
        assert!(err.is_missing_input());
    }

    #[test]
    fn test_idea_is_enough() {
        assert!(StartupInput::new("Meal kits for campers").validate().is_ok());
    }

    #[test]
    fn test_partial_json_input() {
        let input: StartupInput =
            serde_json::from_str(r#"{"idea":"Bike repair app","companyName":"Spoke"}"#).unwrap();
        assert_eq!(input.display_name(), "Spoke");
        assert!(input.target_audience.is_empty());
    }
}
