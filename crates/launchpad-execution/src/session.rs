//! Session lifecycle: wiring store, orchestrator and completion handling together.

use crate::orchestrator::GenerationOrchestrator;
use chrono::Utc;
use launchpad_application::{CompletionHandler, GenerationProgress, GenerationStore};
use launchpad_core::analysis::AnalysisService;
use launchpad_core::config::GenerationConfig;
use launchpad_core::error::{LaunchpadError, Result};
use launchpad_core::generation::{FinalReports, FinalReportsRepository, GenerationStateRepository};
use launchpad_core::notification::Notifier;
use launchpad_core::report::ReportCatalog;
use launchpad_core::startup::StartupInput;
use std::sync::Arc;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;

/// Collaborators a session is mounted with.
#[derive(Clone)]
pub struct SessionDependencies {
    pub state_repository: Arc<dyn GenerationStateRepository>,
    pub reports_repository: Arc<dyn FinalReportsRepository>,
    pub analysis: Arc<dyn AnalysisService>,
    pub notifier: Arc<dyn Notifier>,
}

/// A mounted generation session.
///
/// Mounting restores (or starts) the persisted session and spawns the
/// completion watcher; dropping the session stops the watcher.
pub struct GenerationSession {
    store: Arc<GenerationStore>,
    orchestrator: Arc<GenerationOrchestrator>,
    completion: Arc<CompletionHandler>,
    results: Mutex<Option<oneshot::Receiver<FinalReports>>>,
    watcher: JoinHandle<()>,
    config: GenerationConfig,
}

impl GenerationSession {
    /// Restores or initializes the store and starts watching for completion.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn mount(
        catalog: ReportCatalog,
        config: GenerationConfig,
        deps: SessionDependencies,
    ) -> Self {
        let store = Arc::new(
            GenerationStore::restore_or_init(
                catalog,
                deps.state_repository,
                config.staleness_window(),
            )
            .await,
        );

        let orchestrator = Arc::new(GenerationOrchestrator::new(
            store.clone(),
            deps.analysis,
            deps.notifier.clone(),
            config.clone(),
        ));

        let (completion, results) = CompletionHandler::new(
            store.clone(),
            deps.reports_repository,
            deps.notifier,
            config.redirect_delay(),
        );
        let completion = Arc::new(completion);
        let watcher = tokio::spawn(completion.clone().watch(store.subscribe()));

        tracing::info!(
            "[GenerationSession] Mounted session {} ({} reports)",
            store.session_id(),
            store.catalog().len()
        );

        Self {
            store,
            orchestrator,
            completion,
            results: Mutex::new(Some(results)),
            watcher,
            config,
        }
    }

    pub fn store(&self) -> &Arc<GenerationStore> {
        &self.store
    }

    pub fn orchestrator(&self) -> &Arc<GenerationOrchestrator> {
        &self.orchestrator
    }

    /// Whether mounting with `input` should kick off generation on its own.
    ///
    /// True when the input is usable and the session is neither paused,
    /// finished nor already running.
    pub fn should_auto_start(&self, input: Option<&StartupInput>) -> bool {
        let Some(input) = input else {
            return false;
        };
        if input.validate().is_err() || self.orchestrator.is_running() {
            return false;
        }
        let state = self.store.get();
        !state.is_paused && !state.is_complete(self.store.catalog().len())
    }

    pub fn progress(&self) -> GenerationProgress {
        GenerationProgress::from_state(
            &self.store.get(),
            self.store.catalog(),
            Utc::now(),
            self.config.stuck_threshold(),
        )
    }

    /// Whether the final reports have been saved and handed off.
    pub fn is_complete(&self) -> bool {
        self.completion.is_delivered()
    }

    /// Waits for the completion hand-off.
    ///
    /// # Returns
    ///
    /// * `Ok(FinalReports)` once every report is complete
    /// * `Err(LaunchpadError::Internal)` if the results were already taken or
    ///   the watcher stopped before completion
    pub async fn wait_for_results(&self) -> Result<FinalReports> {
        let receiver = self
            .results
            .lock()
            .await
            .take()
            .ok_or_else(|| LaunchpadError::internal("Final reports were already taken"))?;
        receiver
            .await
            .map_err(|_| LaunchpadError::internal("Completion watcher stopped before completion"))
    }
}

impl Drop for GenerationSession {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use launchpad_application::GenerationPhase;
    use launchpad_core::analysis::AnalysisError;
    use launchpad_core::notification::TracingNotifier;
    use launchpad_core::report::ReportType;
    use launchpad_infrastructure::{
        InMemoryKeyValueStore, KvFinalReportsRepository, KvGenerationStateRepository,
    };

    struct EchoAnalysis;

    #[async_trait]
    impl AnalysisService for EchoAnalysis {
        async fn analyze(
            &self,
            report_type: ReportType,
            input: &StartupInput,
        ) -> std::result::Result<String, AnalysisError> {
            Ok(format!("{} for {}", report_type, input.idea))
        }
    }

    fn deps(kv: Arc<InMemoryKeyValueStore>) -> SessionDependencies {
        SessionDependencies {
            state_repository: Arc::new(KvGenerationStateRepository::new(kv.clone())),
            reports_repository: Arc::new(KvFinalReportsRepository::new(kv)),
            analysis: Arc::new(EchoAnalysis),
            notifier: Arc::new(TracingNotifier),
        }
    }

    async fn mount(kv: Arc<InMemoryKeyValueStore>) -> GenerationSession {
        GenerationSession::mount(
            ReportCatalog::new([ReportType::BusinessPlan, ReportType::Marketing]),
            GenerationConfig::default(),
            deps(kv),
        )
        .await
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_start_requires_input() {
        let session = mount(Arc::new(InMemoryKeyValueStore::new())).await;

        assert!(!session.should_auto_start(None));
        assert!(!session.should_auto_start(Some(&StartupInput::new(""))));
        assert!(session.should_auto_start(Some(&StartupInput::new("Bike repair van"))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_paused_session_does_not_auto_start() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let session = mount(kv.clone()).await;
        session.orchestrator().pause().await;
        let session_id = session.store().session_id();
        drop(session);

        let remounted = mount(kv).await;

        assert_eq!(remounted.store().session_id(), session_id);
        assert!(!remounted.should_auto_start(Some(&StartupInput::new("Bike repair van"))));
        assert_eq!(remounted.progress().phase, GenerationPhase::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_run_delivers_results() {
        let session = mount(Arc::new(InMemoryKeyValueStore::new())).await;
        let input = StartupInput::new("Bike repair van");

        session.orchestrator().start(&input).await.unwrap();
        let reports = session.wait_for_results().await.unwrap();

        assert_eq!(
            reports.get(ReportType::Marketing),
            Some("marketing for Bike repair van")
        );
        assert!(session.is_complete());
        assert_eq!(session.progress().percent(), 100);
        assert!(session.wait_for_results().await.is_err());
    }
}
