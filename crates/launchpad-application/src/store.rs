//! Observable generation state store.
//!
//! `GenerationStore` is the single source of truth for pipeline progress.
//! Every mutation is a full copy-modify-publish: the new snapshot is persisted
//! through the repository and then broadcast to subscribers, so readers never
//! see a half-applied change.

use chrono::Utc;
use launchpad_core::generation::{GenerationState, GenerationStateRepository};
use launchpad_core::report::ReportCatalog;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard, watch};

/// Persistence bookkeeping, guarded by the writer mutex.
#[derive(Default)]
struct Persistence {
    /// Session whose record was handed off and must not be written again.
    retired_session: Option<String>,
}

/// Durable, restorable and observable generation state.
pub struct GenerationStore {
    catalog: ReportCatalog,
    repository: Arc<dyn GenerationStateRepository>,
    staleness_window: Duration,
    sender: watch::Sender<GenerationState>,
    /// Serializes writers so copy-modify-save never loses an update.
    writer: Mutex<Persistence>,
}

impl GenerationStore {
    /// Creates a store holding `initial` without touching persistence.
    pub fn new(
        catalog: ReportCatalog,
        repository: Arc<dyn GenerationStateRepository>,
        staleness_window: Duration,
        initial: GenerationState,
    ) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            catalog,
            repository,
            staleness_window,
            sender,
            writer: Mutex::new(Persistence::default()),
        }
    }

    /// Restores the persisted session or starts a fresh one.
    ///
    /// A fresh state is persisted immediately so a reload finds it.
    pub async fn restore_or_init(
        catalog: ReportCatalog,
        repository: Arc<dyn GenerationStateRepository>,
        staleness_window: Duration,
    ) -> Self {
        let placeholder = GenerationState::fresh(&catalog, Utc::now());
        let store = Self::new(catalog, repository, staleness_window, placeholder);

        match store.load().await {
            Some(restored) => {
                tracing::info!(
                    "[GenerationStore] Restored session {} ({} complete)",
                    restored.session_id,
                    restored.completed_count()
                );
                store.sender.send_replace(restored);
            }
            None => {
                let fresh = store.get();
                tracing::info!("[GenerationStore] Starting fresh session {}", fresh.session_id);
                store.save(fresh).await;
            }
        }
        store
    }

    /// Reads the persisted record.
    ///
    /// # Returns
    ///
    /// `None` when the record is absent, unreadable, stale or has no session id.
    /// A restored record is aligned with the catalog, and because no run in
    /// this process holds its lock, `is_generating` is cleared and in-flight
    /// claims go back to pending.
    pub async fn load(&self) -> Option<GenerationState> {
        let mut state = match self.repository.load().await {
            Ok(Some(state)) => state,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("[GenerationStore] Failed to read persisted state: {}", e);
                return None;
            }
        };

        if !state.is_restorable(Utc::now(), self.staleness_window) {
            tracing::info!(
                "[GenerationStore] Discarding stale or anonymous session '{}'",
                state.session_id
            );
            return None;
        }

        state.reconcile(&self.catalog);
        state.is_generating = false;
        state.release_loading();
        Some(state)
    }

    pub fn catalog(&self) -> &ReportCatalog {
        &self.catalog
    }

    /// Current snapshot.
    pub fn get(&self) -> GenerationState {
        self.sender.borrow().clone()
    }

    pub fn session_id(&self) -> String {
        self.sender.borrow().session_id.clone()
    }

    /// Stream of snapshots; the receiver starts at the current value.
    pub fn subscribe(&self) -> watch::Receiver<GenerationState> {
        self.sender.subscribe()
    }

    /// Replaces the whole state.
    pub async fn save(&self, state: GenerationState) -> GenerationState {
        let guard = self.writer.lock().await;
        self.commit(&guard, state).await
    }

    /// Applies `f` to a copy of the current state and commits it.
    pub async fn update<F>(&self, f: F) -> GenerationState
    where
        F: FnOnce(&mut GenerationState),
    {
        let guard = self.writer.lock().await;
        let mut next = self.get();
        f(&mut next);
        self.commit(&guard, next).await
    }

    /// Conditional commit: `f` decides whether its change is kept.
    ///
    /// Returns the committed state, or `None` when `f` returned `false`, in
    /// which case nothing is persisted or published.
    pub async fn try_update<F>(&self, f: F) -> Option<GenerationState>
    where
        F: FnOnce(&mut GenerationState) -> bool,
    {
        let guard = self.writer.lock().await;
        let mut next = self.get();
        if !f(&mut next) {
            return None;
        }
        Some(self.commit(&guard, next).await)
    }

    /// Like [`update`](Self::update), but only while `session_id` is current.
    ///
    /// Returns `None` (and changes nothing) when the session was replaced.
    pub async fn update_if_session<F>(&self, session_id: &str, f: F) -> Option<GenerationState>
    where
        F: FnOnce(&mut GenerationState),
    {
        self.try_update(|state| {
            if state.session_id != session_id {
                return false;
            }
            f(state);
            true
        })
        .await
    }

    /// Starts a brand-new session and clears the previous record.
    pub async fn reset(&self) -> GenerationState {
        let mut guard = self.writer.lock().await;
        if let Err(e) = self.repository.clear().await {
            tracing::warn!("[GenerationStore] Failed to clear previous session: {}", e);
        }
        guard.retired_session = None;

        let fresh = GenerationState::fresh(&self.catalog, Utc::now());
        tracing::info!("[GenerationStore] Reset to new session {}", fresh.session_id);
        self.commit(&guard, fresh).await
    }

    /// Clears the persisted record of `session_id` for good.
    ///
    /// Later commits for this session stay in memory only; a `reset` starts
    /// persisting again. Does nothing when `session_id` is no longer current,
    /// so a newer session's record is never touched.
    ///
    /// # Returns
    ///
    /// `true` when the session was retired.
    pub async fn finish(&self, session_id: &str) -> bool {
        let mut guard = self.writer.lock().await;
        if self.sender.borrow().session_id != session_id {
            tracing::debug!(
                "[GenerationStore] Not finishing replaced session {}",
                session_id
            );
            return false;
        }
        if let Err(e) = self.repository.clear().await {
            tracing::warn!("[GenerationStore] Failed to clear finished session: {}", e);
        }
        guard.retired_session = Some(session_id.to_string());
        true
    }

    /// Derived stuck predicate evaluated against the wall clock.
    pub fn is_stuck(&self, threshold: Duration) -> bool {
        self.sender.borrow().is_stuck(Utc::now(), threshold)
    }

    async fn commit(
        &self,
        persistence: &MutexGuard<'_, Persistence>,
        mut next: GenerationState,
    ) -> GenerationState {
        next.last_activity = Utc::now();

        let retired = persistence.retired_session.as_deref() == Some(next.session_id.as_str());
        if !retired {
            if let Err(e) = self.repository.save(&next).await {
                // Best-effort durability: the in-memory run keeps going
                tracing::warn!("[GenerationStore] Failed to persist state: {}", e);
            }
        }

        self.sender.send_replace(next.clone());
        next
    }
}
