//! Sequential report generation.
//!
//! `GenerationOrchestrator` walks the report catalog in order and drives one
//! analysis call per report. At most one run is active per orchestrator; the
//! active run is identified by a lease (run id, session id, cancellation token)
//! and every write it makes is committed only while that lease is current.

use crate::retry::RetryPolicy;
use launchpad_application::GenerationStore;
use launchpad_core::analysis::{AnalysisError, AnalysisService};
use launchpad_core::config::GenerationConfig;
use launchpad_core::error::Result;
use launchpad_core::generation::GenerationState;
use launchpad_core::notification::{Notification, Notifier};
use launchpad_core::report::{ReportStatus, ReportType};
use launchpad_core::startup::StartupInput;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// How a call to [`GenerationOrchestrator::start`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every remaining catalog entry was attempted.
    Finished,
    Paused,
    /// A restart or reset replaced the session mid-run.
    Superseded,
    /// Another run holds the lock; nothing was done.
    AlreadyRunning,
}

/// Ownership of the single active run.
#[derive(Debug, Clone)]
struct RunLease {
    run_id: u64,
    session_id: String,
    cancel: CancellationToken,
    stop_reason: Arc<OnceLock<RunOutcome>>,
}

impl RunLease {
    fn stop(&self, reason: RunOutcome) {
        let _ = self.stop_reason.set(reason);
        self.cancel.cancel();
    }

    fn stopped(&self) -> Option<RunOutcome> {
        self.cancel.is_cancelled().then(|| {
            self.stop_reason
                .get()
                .copied()
                .unwrap_or(RunOutcome::Superseded)
        })
    }
}

/// Drives report generation against the state store.
pub struct GenerationOrchestrator {
    store: Arc<GenerationStore>,
    analysis: Arc<dyn AnalysisService>,
    notifier: Arc<dyn Notifier>,
    config: GenerationConfig,
    retry: RetryPolicy,
    active: Mutex<Option<RunLease>>,
    next_run_id: AtomicU64,
}

impl GenerationOrchestrator {
    pub fn new(
        store: Arc<GenerationStore>,
        analysis: Arc<dyn AnalysisService>,
        notifier: Arc<dyn Notifier>,
        config: GenerationConfig,
    ) -> Self {
        let retry = RetryPolicy::from(config.retry);
        Self {
            store,
            analysis,
            notifier,
            config,
            retry,
            active: Mutex::new(None),
            next_run_id: AtomicU64::new(1),
        }
    }

    pub fn store(&self) -> &Arc<GenerationStore> {
        &self.store
    }

    /// Whether a run currently holds the lock.
    pub fn is_running(&self) -> bool {
        self.slot().is_some()
    }

    /// Generates every report that is not complete yet, in catalog order.
    ///
    /// The lock is taken before the first await, so concurrent calls resolve
    /// to exactly one run; the others return [`RunOutcome::AlreadyRunning`].
    /// A failing report is recorded as `error` and the run moves on.
    ///
    /// # Arguments
    ///
    /// * `input` - Startup description the reports are generated from
    ///
    /// # Returns
    ///
    /// * `Ok(RunOutcome)` describing how the run ended
    /// * `Err(LaunchpadError::MissingInput)` when the idea is blank; state is untouched
    pub async fn start(&self, input: &StartupInput) -> Result<RunOutcome> {
        input.validate()?;

        let Some(lease) = self.acquire() else {
            tracing::info!("[Orchestrator] Generation already running, ignoring start");
            return Ok(RunOutcome::AlreadyRunning);
        };
        tracing::info!(
            "[Orchestrator] Run {} started for session {}",
            lease.run_id,
            lease.session_id
        );

        let claimed = self
            .commit_if_current(&lease, |state| {
                state.is_generating = true;
                state.is_paused = false;
                true
            })
            .await;

        let outcome = if claimed {
            self.run(&lease, input).await
        } else {
            self.interrupted(&lease).unwrap_or(RunOutcome::Superseded)
        };

        self.end_run(&lease).await;
        tracing::info!("[Orchestrator] Run {} ended: {:?}", lease.run_id, outcome);
        Ok(outcome)
    }

    /// Stops the active run and marks the session paused.
    ///
    /// The in-flight analysis call is cancelled and its `loading` claim goes
    /// back to `pending`. Completed reports are kept.
    ///
    /// # Returns
    ///
    /// `true` if a run was interrupted.
    pub async fn pause(&self) -> bool {
        let interrupted = self.revoke(RunOutcome::Paused);
        self.store
            .update(|state| {
                state.is_paused = true;
                state.is_generating = false;
                state.release_loading();
            })
            .await;
        tracing::info!(
            "[Orchestrator] Paused (active run interrupted: {})",
            interrupted
        );
        interrupted
    }

    /// Continues a paused session. Complete reports are never regenerated.
    pub async fn resume(&self, input: &StartupInput) -> Result<RunOutcome> {
        input.validate()?;
        tracing::info!("[Orchestrator] Resuming session {}", self.store.session_id());
        self.start(input).await
    }

    /// Abandons the current session and generates everything from scratch.
    ///
    /// Results of the abandoned run that arrive later are discarded.
    pub async fn force_restart(&self, input: &StartupInput) -> Result<RunOutcome> {
        input.validate()?;

        if self.revoke(RunOutcome::Superseded) {
            tracing::info!("[Orchestrator] Cancelled active run for restart");
        }
        let fresh = self.store.reset().await;
        // A start that slipped in before the reset belongs to the old session
        self.revoke(RunOutcome::Superseded);
        tracing::info!("[Orchestrator] Restarting with session {}", fresh.session_id);

        tokio::time::sleep(self.config.restart_delay()).await;
        let current = self.store.get();
        if current.is_paused && current.session_id == fresh.session_id {
            tracing::info!("[Orchestrator] Paused during restart, not starting");
            return Ok(RunOutcome::Paused);
        }
        self.start(input).await
    }

    async fn run(&self, lease: &RunLease, input: &StartupInput) -> RunOutcome {
        let catalog = self.store.catalog();
        let Some(mut index) = self.store.get().first_incomplete_index(catalog) else {
            tracing::info!("[Orchestrator] All reports already complete");
            return RunOutcome::Finished;
        };
        let mut processed = 0usize;

        while let Some(definition) = catalog.get(index) {
            if let Some(reason) = self.interrupted(lease) {
                return reason;
            }

            let report_type = definition.report_type;
            if self.store.get().status_of(report_type) == ReportStatus::Complete {
                index += 1;
                continue;
            }

            let marked = self
                .commit_if_current(lease, |state| {
                    state.advance_cursor(index);
                    state.mark_loading(report_type)
                })
                .await;
            if !marked {
                if let Some(reason) = self.interrupted(lease) {
                    return reason;
                }
            }

            if processed > 0 {
                tokio::select! {
                    biased;
                    _ = lease.cancel.cancelled() => {
                        return lease.stopped().unwrap_or(RunOutcome::Superseded);
                    }
                    _ = tokio::time::sleep(self.config.inter_step_delay()) => {}
                }
            }
            processed += 1;

            let succeeded = self.generate_one(lease, report_type, input).await;
            tracing::debug!(
                "[Orchestrator] Step {}/{} ({}) succeeded: {}",
                index + 1,
                catalog.len(),
                report_type,
                succeeded
            );

            self.commit_if_current(lease, |state| {
                let before = state.current_index;
                state.advance_cursor(index + 1);
                state.current_index != before
            })
            .await;
            index += 1;
        }

        RunOutcome::Finished
    }

    /// Generates one report under `lease`.
    ///
    /// The retrying call is bounded by the step timeout and raced against the
    /// lease's cancellation token. A cancelled call changes nothing.
    ///
    /// # Returns
    ///
    /// `true` when the report was committed as complete.
    async fn generate_one(
        &self,
        lease: &RunLease,
        report_type: ReportType,
        input: &StartupInput,
    ) -> bool {
        let claimed = match self.store.get().status_of(report_type) {
            ReportStatus::Loading => self.is_current(lease),
            ReportStatus::Complete => false,
            ReportStatus::Pending | ReportStatus::Error => {
                self.commit_if_current(lease, |state| state.mark_loading(report_type))
                    .await
            }
        };
        if !claimed {
            tracing::debug!("[Orchestrator] Skipping {}: lease no longer current", report_type);
            return false;
        }

        let step_timeout = self.config.step_timeout();
        let started = Instant::now();
        let attempt = self
            .retry
            .execute(|| self.analysis.analyze(report_type, input));

        let result = tokio::select! {
            biased;
            _ = lease.cancel.cancelled() => {
                tracing::debug!("[Orchestrator] {} cancelled in flight", report_type);
                return false;
            }
            result = tokio::time::timeout(step_timeout, attempt) => {
                result.unwrap_or(Err(AnalysisError::Timeout(step_timeout)))
            }
        };

        match result {
            Ok(content) => {
                let committed = self
                    .commit_if_current(lease, |state| state.mark_complete(report_type, content))
                    .await;
                if committed {
                    tracing::info!(
                        "[Orchestrator] {} complete in {:?}",
                        report_type,
                        started.elapsed()
                    );
                } else {
                    tracing::debug!("[Orchestrator] Discarding stale result for {}", report_type);
                }
                committed
            }
            Err(error) => {
                let recorded = self
                    .commit_if_current(lease, |state| state.mark_error(report_type))
                    .await;
                if !recorded {
                    tracing::debug!("[Orchestrator] Discarding stale failure for {}", report_type);
                    return false;
                }
                tracing::warn!("[Orchestrator] {} failed: {}", report_type, error);
                self.notifier
                    .notify(failure_notification(report_type, &error));
                false
            }
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<RunLease>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn acquire(&self) -> Option<RunLease> {
        let mut slot = self.slot();
        if slot.is_some() {
            return None;
        }
        let lease = RunLease {
            run_id: self.next_run_id.fetch_add(1, Ordering::SeqCst),
            session_id: self.store.session_id(),
            cancel: CancellationToken::new(),
            stop_reason: Arc::default(),
        };
        *slot = Some(lease.clone());
        Some(lease)
    }

    fn holds(&self, lease: &RunLease) -> bool {
        !lease.cancel.is_cancelled()
            && self
                .slot()
                .as_ref()
                .is_some_and(|active| active.run_id == lease.run_id)
    }

    fn is_current(&self, lease: &RunLease) -> bool {
        self.holds(lease) && self.store.session_id() == lease.session_id
    }

    fn release(&self, lease: &RunLease) -> bool {
        let mut slot = self.slot();
        if slot
            .as_ref()
            .is_some_and(|active| active.run_id == lease.run_id)
        {
            *slot = None;
            true
        } else {
            false
        }
    }

    /// Takes the lock away from the active run and cancels it.
    fn revoke(&self, reason: RunOutcome) -> bool {
        let lease = self.slot().take();
        match lease {
            Some(lease) => {
                lease.stop(reason);
                true
            }
            None => false,
        }
    }

    fn interrupted(&self, lease: &RunLease) -> Option<RunOutcome> {
        if let Some(reason) = lease.stopped() {
            return Some(reason);
        }
        let state = self.store.get();
        if state.session_id != lease.session_id {
            return Some(RunOutcome::Superseded);
        }
        if state.is_paused {
            return Some(RunOutcome::Paused);
        }
        if !self.holds(lease) {
            return Some(RunOutcome::Superseded);
        }
        None
    }

    /// Commits `f` only while `lease` owns the lock and its session is current.
    ///
    /// `f` returns whether it changed anything; unchanged states are not written.
    async fn commit_if_current<F>(&self, lease: &RunLease, f: F) -> bool
    where
        F: FnOnce(&mut GenerationState) -> bool,
    {
        self.store
            .try_update(|state| {
                state.session_id == lease.session_id && self.holds(lease) && f(state)
            })
            .await
            .is_some()
    }

    async fn end_run(&self, lease: &RunLease) {
        // Released inside the commit: a newer run claims only after this write
        self.store
            .try_update(|state| {
                if !self.release(lease) || state.session_id != lease.session_id {
                    return false;
                }
                let was_generating = state.is_generating;
                state.is_generating = false;
                was_generating
            })
            .await;
    }
}

fn failure_notification(report_type: ReportType, error: &AnalysisError) -> Notification {
    if error.is_rate_limited() {
        Notification::error(
            "Rate limited",
            format!(
                "{} hit the provider's rate limit. Please try again in a few minutes.",
                report_type.display_name()
            ),
        )
    } else {
        Notification::error(
            "Generation failed",
            format!(
                "{} failed: {}. Retry to continue.",
                report_type.display_name(),
                error
            ),
        )
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
