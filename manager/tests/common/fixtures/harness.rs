//! Engine wired to recording collaborators, a temp state file and a clock that
//! follows tokio's (usually paused) time.

use super::fakes::{FakeGateway, RecordingNotifier};
use super::test_data::anchor;
use chrono::{DateTime, Duration, Utc};
use maintenance_manager::clock::{Clock, TokioClock};
use maintenance_manager::engine::{EngineSettings, MaintenanceEngine};
use maintenance_manager::gateway::{ExemptionPolicy, ExemptionProvider};
use maintenance_manager::state::StateStore;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub struct TestHarness {
    pub engine: Arc<MaintenanceEngine>,
    pub notifier: Arc<RecordingNotifier>,
    pub gateway: Arc<FakeGateway>,
    pub clock: Arc<TokioClock>,
    settings: EngineSettings,
    exemptions: ExemptionPolicy,
    state_file: PathBuf,
    state_dir: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_settings(EngineSettings::default())
    }

    pub fn with_settings(settings: EngineSettings) -> Self {
        Self::build(settings, ExemptionPolicy::Unavailable, RecordingNotifier::new())
    }

    pub fn with_exemptions(provider: Arc<dyn ExemptionProvider>) -> Self {
        Self::build(
            EngineSettings::default(),
            ExemptionPolicy::Provider(provider),
            RecordingNotifier::new(),
        )
    }

    /// Harness whose notifier records every notification but fails delivery.
    pub fn with_failing_notifier() -> Self {
        Self::build(
            EngineSettings::default(),
            ExemptionPolicy::Unavailable,
            RecordingNotifier::failing(),
        )
    }

    /// Harness whose state file sits below a regular file, so every write
    /// fails until [`TestHarness::unblock_state_path`] is called.
    pub fn with_unwritable_state() -> Self {
        let state_dir = TempDir::new().expect("Failed to create temp dir");
        let blocker = state_dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").expect("Failed to create blocker file");
        Self::build_in(
            state_dir,
            blocker.join("state.json"),
            EngineSettings::default(),
            ExemptionPolicy::Unavailable,
            RecordingNotifier::new(),
        )
    }

    fn build(settings: EngineSettings, exemptions: ExemptionPolicy, notifier: RecordingNotifier) -> Self {
        let state_dir = TempDir::new().expect("Failed to create temp dir");
        let state_file = state_dir.path().join("state.json");
        Self::build_in(state_dir, state_file, settings, exemptions, notifier)
    }

    fn build_in(
        state_dir: TempDir,
        state_file: PathBuf,
        settings: EngineSettings,
        exemptions: ExemptionPolicy,
        notifier: RecordingNotifier,
    ) -> Self {
        let clock = Arc::new(TokioClock::starting_at(anchor()));
        let notifier = Arc::new(notifier);
        let gateway = Arc::new(FakeGateway::new());

        let engine = MaintenanceEngine::new(
            settings.clone(),
            StateStore::new(state_file.clone()),
            notifier.clone(),
            gateway.clone(),
            exemptions.clone(),
            clock.clone(),
        );

        Self {
            engine,
            notifier,
            gateway,
            clock,
            settings,
            exemptions,
            state_file,
            state_dir,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn state_path(&self) -> PathBuf {
        self.state_file.clone()
    }

    /// Remove the file blocking the state directory of an unwritable harness.
    pub fn unblock_state_path(&self) {
        if let Some(blocker) = self.state_file.parent() {
            std::fs::remove_file(blocker).expect("Failed to remove blocker file");
        }
    }

    pub fn store(&self) -> StateStore {
        StateStore::new(self.state_path())
    }

    /// Stop the engine and start a fresh one on the same state file, as a
    /// process restart would.
    pub async fn restart(self) -> Self {
        self.restart_after(Duration::zero()).await
    }

    /// Restart with `downtime` of wall-clock time passing while stopped.
    pub async fn restart_after(self, downtime: Duration) -> Self {
        self.engine.shutdown(std::time::Duration::from_secs(1)).await;

        let clock = Arc::new(TokioClock::starting_at(self.clock.now() + downtime));
        let notifier = Arc::new(RecordingNotifier::new());

        let engine = MaintenanceEngine::new(
            self.settings.clone(),
            StateStore::new(self.state_path()),
            notifier.clone(),
            self.gateway.clone(),
            self.exemptions.clone(),
            clock.clone(),
        );

        Self {
            engine,
            notifier,
            gateway: self.gateway,
            clock,
            settings: self.settings,
            exemptions: self.exemptions,
            state_file: self.state_file,
            state_dir: self.state_dir,
        }
    }
}

/// Let paused time run forward by `span`, firing every timer due on the way.
pub async fn advance(span: Duration) {
    tokio::time::sleep(span.to_std().expect("span must be positive")).await;
    settle().await;
}

/// Give spawned timer tasks a chance to finish their callbacks.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

impl TestHarness {
    /// Like [`advance`], but also waits for callbacks that are still writing
    /// state or delivering notifications.
    pub async fn advance(&self, span: Duration) {
        advance(span).await;
        self.engine.wait_for_callbacks().await;
        settle().await;
    }
}
