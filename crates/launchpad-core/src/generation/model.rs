//! Generation pipeline domain models.
//!
//! Contains the persisted progress record of one generation session and the
//! final reports snapshot handed to the rest of the application.

use crate::report::{ReportCatalog, ReportStatus, ReportType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use uuid::Uuid;

/// Progress of one generation attempt.
///
/// Mutated only through copy-modify-save in the state store, so readers always
/// observe a consistent snapshot.
///
/// # Invariants
///
/// - `status` holds exactly one entry per catalog report type.
/// - `generated_content` only holds entries whose status is `Complete`.
/// - `current_index` never decreases within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationState {
    /// Opaque token identifying one generation attempt.
    #[serde(default)]
    pub session_id: String,
    pub status: BTreeMap<ReportType, ReportStatus>,
    #[serde(default)]
    pub generated_content: BTreeMap<ReportType, String>,
    /// High-water cursor into the catalog.
    #[serde(default)]
    pub current_index: usize,
    #[serde(default)]
    pub is_generating: bool,
    #[serde(default)]
    pub is_paused: bool,
    pub start_time: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl GenerationState {
    /// Creates a brand-new session with every report pending.
    pub fn fresh(catalog: &ReportCatalog, now: DateTime<Utc>) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            status: catalog
                .report_types()
                .map(|t| (t, ReportStatus::Pending))
                .collect(),
            generated_content: BTreeMap::new(),
            current_index: 0,
            is_generating: false,
            is_paused: false,
            start_time: now,
            last_activity: now,
        }
    }

    pub fn status_of(&self, report_type: ReportType) -> ReportStatus {
        self.status.get(&report_type).copied().unwrap_or_default()
    }

    pub fn content_of(&self, report_type: ReportType) -> Option<&str> {
        self.generated_content.get(&report_type).map(String::as_str)
    }

    pub fn completed_count(&self) -> usize {
        self.status
            .values()
            .filter(|s| **s == ReportStatus::Complete)
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.status
            .values()
            .filter(|s| **s == ReportStatus::Error)
            .count()
    }

    /// True when every catalog entry is complete (and there is at least one).
    pub fn is_complete(&self, catalog_len: usize) -> bool {
        let completed = self.completed_count();
        completed > 0 && completed == catalog_len
    }

    /// Index of the first catalog entry that is not complete.
    pub fn first_incomplete_index(&self, catalog: &ReportCatalog) -> Option<usize> {
        catalog
            .report_types()
            .position(|t| self.status_of(t) != ReportStatus::Complete)
    }

    /// Claims a report for generation.
    ///
    /// Returns `false` (and changes nothing) when the report is already complete.
    pub fn mark_loading(&mut self, report_type: ReportType) -> bool {
        if !self.status_of(report_type).is_claimable() {
            return false;
        }
        self.status.insert(report_type, ReportStatus::Loading);
        true
    }

    /// Records a successful generation.
    pub fn mark_complete(&mut self, report_type: ReportType, content: String) -> bool {
        if self.status_of(report_type) == ReportStatus::Complete {
            return false;
        }
        self.status.insert(report_type, ReportStatus::Complete);
        self.generated_content.insert(report_type, content);
        true
    }

    /// Records a failed generation.
    pub fn mark_error(&mut self, report_type: ReportType) -> bool {
        if self.status_of(report_type) == ReportStatus::Complete {
            return false;
        }
        self.status.insert(report_type, ReportStatus::Error);
        self.generated_content.remove(&report_type);
        true
    }

    /// Returns in-flight claims to `Pending`.
    ///
    /// Used when a pause or a process restart releases the run that held them.
    pub fn release_loading(&mut self) {
        for status in self.status.values_mut() {
            if *status == ReportStatus::Loading {
                *status = ReportStatus::Pending;
            }
        }
    }

    /// Moves the cursor forward; never backwards.
    pub fn advance_cursor(&mut self, index: usize) {
        self.current_index = self.current_index.max(index);
    }

    /// Derived "stuck" predicate.
    ///
    /// A session is stuck when nothing runs, nothing is paused, nothing has
    /// completed and there has been no activity for longer than `threshold`.
    pub fn is_stuck(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        if self.is_generating || self.is_paused || self.completed_count() > 0 {
            return false;
        }
        match (now - self.last_activity).to_std() {
            Ok(idle) => idle > threshold,
            // last_activity in the future
            Err(_) => false,
        }
    }

    /// Whether a persisted record may be resumed.
    pub fn is_restorable(&self, now: DateTime<Utc>, staleness_window: Duration) -> bool {
        if self.session_id.trim().is_empty() {
            return false;
        }
        match (now - self.last_activity).to_std() {
            Ok(age) => age <= staleness_window,
            Err(_) => true,
        }
    }

    /// Aligns a restored record with the catalog.
    ///
    /// Missing report types become `Pending`, unknown ones are dropped together
    /// with their content, and content without a `Complete` status is removed.
    pub fn reconcile(&mut self, catalog: &ReportCatalog) {
        self.status.retain(|t, _| catalog.contains(*t));
        for report_type in catalog.report_types() {
            self.status.entry(report_type).or_default();
        }
        let status = &self.status;
        self.generated_content
            .retain(|t, _| status.get(t) == Some(&ReportStatus::Complete));
        self.current_index = self.current_index.min(catalog.len());
    }
}

/// Final content of a completed session, consumed outside the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalReports {
    pub session_id: String,
    pub generated_at: DateTime<Utc>,
    pub reports: BTreeMap<ReportType, String>,
}

impl FinalReports {
    /// Snapshots the generated content of a finished session.
    pub fn from_state(state: &GenerationState, now: DateTime<Utc>) -> Self {
        Self {
            session_id: state.session_id.clone(),
            generated_at: now,
            reports: state.generated_content.clone(),
        }
    }

    pub fn get(&self, report_type: ReportType) -> Option<&str> {
        self.reports.get(&report_type).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn two_report_catalog() -> ReportCatalog {
        ReportCatalog::new([ReportType::BusinessPlan, ReportType::Marketing])
    }

    #[test]
    fn test_fresh_state_has_every_report_pending() {
        let catalog = ReportCatalog::standard();
        let state = GenerationState::fresh(&catalog, Utc::now());

        assert_eq!(state.status.len(), catalog.len());
        assert!(state.status.values().all(|s| *s == ReportStatus::Pending));
        assert!(state.generated_content.is_empty());
        assert_eq!(state.current_index, 0);
        assert!(!state.session_id.is_empty());
    }

    #[test]
    fn test_fresh_states_get_distinct_sessions() {
        let catalog = two_report_catalog();
        let a = GenerationState::fresh(&catalog, Utc::now());
        let b = GenerationState::fresh(&catalog, Utc::now());
        assert_ne!(a.session_id, b.session_id);
    }

    #[test]
    fn test_complete_is_terminal() {
        let mut state = GenerationState::fresh(&two_report_catalog(), Utc::now());
        assert!(state.mark_loading(ReportType::BusinessPlan));
        assert!(state.mark_complete(ReportType::BusinessPlan, "plan".into()));

        assert!(!state.mark_loading(ReportType::BusinessPlan));
        assert!(!state.mark_error(ReportType::BusinessPlan));
        assert!(!state.mark_complete(ReportType::BusinessPlan, "other".into()));
        assert_eq!(state.content_of(ReportType::BusinessPlan), Some("plan"));
    }

    #[test]
    fn test_error_has_no_content() {
        let mut state = GenerationState::fresh(&two_report_catalog(), Utc::now());
        state.mark_loading(ReportType::Marketing);
        state.mark_error(ReportType::Marketing);

        assert_eq!(state.status_of(ReportType::Marketing), ReportStatus::Error);
        assert!(state.content_of(ReportType::Marketing).is_none());
        assert!(state.status_of(ReportType::Marketing).is_claimable());
    }

    #[test]
    fn test_cursor_is_monotonic() {
        let mut state = GenerationState::fresh(&two_report_catalog(), Utc::now());
        state.advance_cursor(2);
        state.advance_cursor(1);
        assert_eq!(state.current_index, 2);
    }

    #[test]
    fn test_is_complete_requires_every_entry() {
        let catalog = two_report_catalog();
        let mut state = GenerationState::fresh(&catalog, Utc::now());
        assert!(!state.is_complete(catalog.len()));

        state.mark_complete(ReportType::BusinessPlan, "a".into());
        assert!(!state.is_complete(catalog.len()));

        state.mark_complete(ReportType::Marketing, "b".into());
        assert!(state.is_complete(catalog.len()));
        assert!(!GenerationState::fresh(&ReportCatalog::new([]), Utc::now()).is_complete(0));
    }

    #[test]
    fn test_stuck_predicate_flips_after_threshold() {
        let start = Utc::now();
        let mut state = GenerationState::fresh(&two_report_catalog(), start);
        let threshold = Duration::from_secs(10);

        assert!(!state.is_stuck(start + TimeDelta::seconds(5), threshold));
        assert!(state.is_stuck(start + TimeDelta::seconds(11), threshold));

        // Fresh activity resets the predicate
        state.last_activity = start + TimeDelta::seconds(11);
        assert!(!state.is_stuck(start + TimeDelta::seconds(12), threshold));
    }

    #[test]
    fn test_stuck_predicate_ignores_active_paused_or_progressed_sessions() {
        let start = Utc::now();
        let later = start + TimeDelta::seconds(60);
        let threshold = Duration::from_secs(10);
        let catalog = two_report_catalog();

        let mut generating = GenerationState::fresh(&catalog, start);
        generating.is_generating = true;
        assert!(!generating.is_stuck(later, threshold));

        let mut paused = GenerationState::fresh(&catalog, start);
        paused.is_paused = true;
        assert!(!paused.is_stuck(later, threshold));

        let mut progressed = GenerationState::fresh(&catalog, start);
        progressed.mark_complete(ReportType::BusinessPlan, "done".into());
        assert!(!progressed.is_stuck(later, threshold));
    }

    #[test]
    fn test_restorable_respects_staleness_window() {
        let start = Utc::now();
        let state = GenerationState::fresh(&two_report_catalog(), start);
        let window = Duration::from_secs(3600);

        assert!(state.is_restorable(start + TimeDelta::minutes(59), window));
        assert!(!state.is_restorable(start + TimeDelta::minutes(61), window));

        let mut anonymous = state.clone();
        anonymous.session_id = String::new();
        assert!(!anonymous.is_restorable(start, window));
    }

    #[test]
    fn test_reconcile_aligns_with_catalog() {
        let catalog = two_report_catalog();
        let mut state = GenerationState::fresh(&ReportCatalog::standard(), Utc::now());
        state.mark_complete(ReportType::Financial, "numbers".into());
        state.status.remove(&ReportType::Marketing);
        state
            .generated_content
            .insert(ReportType::BusinessPlan, "orphan".into());
        state.current_index = 7;

        state.reconcile(&catalog);

        assert_eq!(state.status.len(), 2);
        assert_eq!(state.status_of(ReportType::Marketing), ReportStatus::Pending);
        assert!(state.generated_content.is_empty());
        assert_eq!(state.current_index, 2);
    }

    #[test]
    fn test_release_loading_returns_claims() {
        let mut state = GenerationState::fresh(&two_report_catalog(), Utc::now());
        state.mark_complete(ReportType::BusinessPlan, "done".into());
        state.mark_loading(ReportType::Marketing);

        state.release_loading();

        assert_eq!(state.status_of(ReportType::BusinessPlan), ReportStatus::Complete);
        assert_eq!(state.status_of(ReportType::Marketing), ReportStatus::Pending);
    }

    #[test]
    fn test_persisted_shape_is_camel_case() {
        let mut state = GenerationState::fresh(&two_report_catalog(), Utc::now());
        state.mark_complete(ReportType::BusinessPlan, "plan".into());

        let value = serde_json::to_value(&state).unwrap();
        assert!(value.get("sessionId").is_some());
        assert!(value.get("currentIndex").is_some());
        assert_eq!(value["status"]["business-plan"], "complete");
        assert_eq!(value["generatedContent"]["business-plan"], "plan");
    }
}
