//! Completion handling for a generation session.
//!
//! Watches the store and, once every catalog report is complete, hands the
//! final content off exactly once: persisted as `FinalReports`, the in-progress
//! record retired, a success notification sent and, after a short pause, the
//! navigation signal emitted.

use crate::store::GenerationStore;
use chrono::Utc;
use launchpad_core::generation::{FinalReports, FinalReportsRepository, GenerationState};
use launchpad_core::notification::{Notification, Notifier};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{oneshot, watch};

pub struct CompletionHandler {
    store: Arc<GenerationStore>,
    reports: Arc<dyn FinalReportsRepository>,
    notifier: Arc<dyn Notifier>,
    redirect_delay: Duration,
    /// Taken on first completion; `None` afterwards.
    navigation: Mutex<Option<oneshot::Sender<FinalReports>>>,
    /// Set once the final reports have been handed to the navigation signal.
    delivered: AtomicBool,
}

impl CompletionHandler {
    /// Creates a handler together with the receiving end of its navigation signal.
    pub fn new(
        store: Arc<GenerationStore>,
        reports: Arc<dyn FinalReportsRepository>,
        notifier: Arc<dyn Notifier>,
        redirect_delay: Duration,
    ) -> (Self, oneshot::Receiver<FinalReports>) {
        let (sender, receiver) = oneshot::channel();
        let handler = Self {
            store,
            reports,
            notifier,
            redirect_delay,
            navigation: Mutex::new(Some(sender)),
            delivered: AtomicBool::new(false),
        };
        (handler, receiver)
    }

    pub fn has_fired(&self) -> bool {
        self.navigation
            .lock()
            .map(|guard| guard.is_none())
            .unwrap_or(true)
    }

    /// Whether the hand-off has finished: reports saved and signal sent.
    pub fn is_delivered(&self) -> bool {
        self.delivered.load(Ordering::Acquire)
    }

    /// Reacts to one state snapshot.
    ///
    /// # Returns
    ///
    /// `true` when this call performed the hand-off. A snapshot from a
    /// session that has since been replaced is ignored.
    pub async fn on_state_change(&self, state: &GenerationState) -> bool {
        let total = self.store.catalog().len();
        if total == 0 || !state.is_complete(total) {
            return false;
        }
        if state.session_id != self.store.session_id() {
            tracing::debug!(
                "[CompletionHandler] Ignoring completion of replaced session {}",
                state.session_id
            );
            return false;
        }

        let sender = match self.navigation.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let Some(sender) = sender else {
            return false;
        };

        let final_reports = FinalReports::from_state(state, Utc::now());
        tracing::info!(
            "[CompletionHandler] All {} reports complete for session {}",
            total,
            state.session_id
        );

        match self.reports.save(&final_reports).await {
            Ok(()) => {
                self.store.finish(&state.session_id).await;
            }
            Err(e) => {
                // Keep the in-progress record so the content is not lost
                tracing::warn!("[CompletionHandler] Failed to save final reports: {}", e);
            }
        }

        self.notifier.notify(Notification::success(
            "Reports ready",
            format!("All {} reports have been generated", total),
        ));

        tokio::time::sleep(self.redirect_delay).await;

        if sender.send(final_reports).is_err() {
            tracing::debug!("[CompletionHandler] Navigation receiver dropped");
        }
        self.delivered.store(true, Ordering::Release);
        true
    }

    /// Follows the store until the hand-off happens or the store goes away.
    pub async fn watch(self: Arc<Self>, mut rx: watch::Receiver<GenerationState>) {
        loop {
            let state = rx.borrow_and_update().clone();
            if self.on_state_change(&state).await {
                break;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}
