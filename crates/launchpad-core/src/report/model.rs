//! Report catalog domain models.
//!
//! The catalog is the ordered list of report types the pipeline produces.
//! Catalog order is generation order.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// A category of AI-generated content produced by the pipeline.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ReportType {
    BusinessPlan,
    Marketing,
    Competitive,
    Technical,
    UxDesign,
    Financial,
    LandingPage,
}

impl ReportType {
    /// Human readable name shown next to the report's progress row.
    pub fn display_name(&self) -> &'static str {
        match self {
            ReportType::BusinessPlan => "Business Plan",
            ReportType::Marketing => "Marketing Strategy",
            ReportType::Competitive => "Competitive Analysis",
            ReportType::Technical => "Technical Architecture",
            ReportType::UxDesign => "UX Design",
            ReportType::Financial => "Financial Projections",
            ReportType::LandingPage => "Landing Page Copy",
        }
    }

    /// Rough wall-clock estimate for one generation of this report.
    pub fn estimated_duration(&self) -> Duration {
        let secs = match self {
            ReportType::BusinessPlan => 45,
            ReportType::Marketing => 35,
            ReportType::Competitive => 30,
            ReportType::Technical => 40,
            ReportType::UxDesign => 30,
            ReportType::Financial => 40,
            ReportType::LandingPage => 25,
        };
        Duration::from_secs(secs)
    }
}

/// Per-report generation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, Default)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Pending,
    Loading,
    Complete,
    Error,
}

impl ReportStatus {
    /// Whether a run may claim a report in this status.
    ///
    /// `Complete` is terminal within a session.
    pub fn is_claimable(&self) -> bool {
        !matches!(self, ReportStatus::Complete)
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSpec {
    pub report_type: ReportType,
    pub name: &'static str,
    pub estimated_duration: Duration,
}

impl From<ReportType> for ReportSpec {
    fn from(report_type: ReportType) -> Self {
        Self {
            report_type,
            name: report_type.display_name(),
            estimated_duration: report_type.estimated_duration(),
        }
    }
}

/// Ordered, immutable list of report types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportCatalog {
    entries: Vec<ReportSpec>,
}

impl ReportCatalog {
    /// Creates a catalog from an ordered list of report types.
    ///
    /// Duplicates are dropped, keeping the first occurrence.
    pub fn new(report_types: impl IntoIterator<Item = ReportType>) -> Self {
        let mut entries: Vec<ReportSpec> = Vec::new();
        for report_type in report_types {
            if !entries.iter().any(|e| e.report_type == report_type) {
                entries.push(report_type.into());
            }
        }
        Self { entries }
    }

    /// The full catalog in canonical generation order.
    pub fn standard() -> Self {
        Self::new(ReportType::iter())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ReportSpec> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[ReportSpec] {
        &self.entries
    }

    pub fn report_types(&self) -> impl Iterator<Item = ReportType> + '_ {
        self.entries.iter().map(|e| e.report_type)
    }

    pub fn contains(&self, report_type: ReportType) -> bool {
        self.entries.iter().any(|e| e.report_type == report_type)
    }

    pub fn position(&self, report_type: ReportType) -> Option<usize> {
        self.entries.iter().position(|e| e.report_type == report_type)
    }

    /// Sum of the estimated durations of every entry.
    pub fn estimated_total(&self) -> Duration {
        self.entries.iter().map(|e| e.estimated_duration).sum()
    }
}

impl Default for ReportCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_standard_catalog_order() {
        let catalog = ReportCatalog::standard();
        let keys: Vec<String> = catalog.report_types().map(|t| t.to_string()).collect();
        assert_eq!(
            keys,
            vec![
                "business-plan",
                "marketing",
                "competitive",
                "technical",
                "ux-design",
                "financial",
                "landing-page",
            ]
        );
    }

    #[test]
    fn test_catalog_drops_duplicates() {
        let catalog = ReportCatalog::new([
            ReportType::Marketing,
            ReportType::BusinessPlan,
            ReportType::Marketing,
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.position(ReportType::BusinessPlan), Some(1));
    }

    #[test]
    fn test_report_type_wire_format() {
        let json = serde_json::to_string(&ReportType::UxDesign).unwrap();
        assert_eq!(json, "\"ux-design\"");
        assert_eq!(
            ReportType::from_str("landing-page").unwrap(),
            ReportType::LandingPage
        );
    }

    #[test]
    fn test_complete_is_not_claimable() {
        assert!(ReportStatus::Pending.is_claimable());
        assert!(ReportStatus::Error.is_claimable());
        assert!(!ReportStatus::Complete.is_claimable());
    }
}
