use chrono::{DateTime, Utc};
use launchpad_core::generation::GenerationState;
use launchpad_core::report::{ReportCatalog, ReportStatus, ReportType};
use serde::Serialize;
use std::time::Duration;

/// Coarse phase of a session, derived from its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationPhase {
    Idle,
    Running,
    Paused,
    Stuck,
    Complete,
}

/// One catalog entry as shown in a progress listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRow {
    pub report_type: ReportType,
    pub name: &'static str,
    pub status: ReportStatus,
    pub estimated_duration: Duration,
    pub has_content: bool,
}

/// Read-only progress view over a state snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationProgress {
    pub session_id: String,
    pub rows: Vec<ProgressRow>,
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
    pub is_stuck: bool,
    pub phase: GenerationPhase,
    pub last_activity: DateTime<Utc>,
}

impl GenerationProgress {
    pub fn from_state(
        state: &GenerationState,
        catalog: &ReportCatalog,
        now: DateTime<Utc>,
        stuck_threshold: Duration,
    ) -> Self {
        let rows = catalog
            .entries()
            .iter()
            .map(|definition| ProgressRow {
                report_type: definition.report_type,
                name: definition.name,
                status: state.status_of(definition.report_type),
                estimated_duration: definition.estimated_duration,
                has_content: state.content_of(definition.report_type).is_some(),
            })
            .collect();

        let total = catalog.len();
        let is_stuck = state.is_stuck(now, stuck_threshold);
        let phase = if total > 0 && state.is_complete(total) {
            GenerationPhase::Complete
        } else if state.is_generating {
            GenerationPhase::Running
        } else if state.is_paused {
            GenerationPhase::Paused
        } else if is_stuck {
            GenerationPhase::Stuck
        } else {
            GenerationPhase::Idle
        };

        Self {
            session_id: state.session_id.clone(),
            rows,
            completed: state.completed_count(),
            failed: state.error_count(),
            total,
            is_stuck,
            phase,
            last_activity: state.last_activity,
        }
    }

    /// Completion percentage, rounded down.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        (self.completed * 100 / self.total) as u8
    }

    /// Estimated time for the reports that are not complete yet.
    pub fn estimated_remaining(&self) -> Duration {
        self.rows
            .iter()
            .filter(|row| row.status != ReportStatus::Complete)
            .map(|row| row.estimated_duration)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    const THRESHOLD: Duration = Duration::from_secs(10);

    #[test]
    fn test_rows_follow_catalog_order() {
        let catalog = ReportCatalog::standard();
        let now = Utc::now();
        let mut state = GenerationState::fresh(&catalog, now);
        state.mark_complete(ReportType::Marketing, "m".into());
        state.mark_error(ReportType::Technical);

        let progress = GenerationProgress::from_state(&state, &catalog, now, THRESHOLD);

        assert_eq!(progress.rows.len(), catalog.len());
        assert_eq!(progress.rows[0].report_type, ReportType::BusinessPlan);
        assert!(progress.rows[1].has_content);
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.failed, 1);
        assert_eq!(progress.percent(), 14);
        assert_eq!(progress.phase, GenerationPhase::Idle);
        assert_eq!(
            progress.estimated_remaining(),
            catalog.estimated_total() - ReportType::Marketing.estimated_duration()
        );
    }

    #[test]
    fn test_idle_session_without_progress_is_stuck() {
        let catalog = ReportCatalog::new([ReportType::BusinessPlan]);
        let now = Utc::now();
        let mut state = GenerationState::fresh(&catalog, now);
        state.last_activity = now - TimeDelta::seconds(11);

        let progress = GenerationProgress::from_state(&state, &catalog, now, THRESHOLD);

        assert!(progress.is_stuck);
        assert_eq!(progress.phase, GenerationPhase::Stuck);
    }

    #[test]
    fn test_complete_phase() {
        let catalog = ReportCatalog::new([ReportType::BusinessPlan]);
        let now = Utc::now();
        let mut state = GenerationState::fresh(&catalog, now);
        state.mark_complete(ReportType::BusinessPlan, "plan".into());

        let progress = GenerationProgress::from_state(&state, &catalog, now, THRESHOLD);

        assert_eq!(progress.phase, GenerationPhase::Complete);
        assert_eq!(progress.percent(), 100);
    }
}
