//! Maintenance scheduling and reconciliation engine.
//!
//! One [`MaintenanceEngine`] owns the schedule, the notification ledger, the
//! processed-id set and the mode. All of them live behind a single mutex so a
//! reconciliation pass and a firing timer can never interleave on the same
//! event. Work that leaves the process (webhooks, disconnects) is collected as
//! [`Effect`]s while the lock is held and dispatched after it is released.
//!
//! The mode is mirrored into a `watch` channel so admission checks can read it
//! without touching the lock.

pub mod admission;
mod arming;
mod reconcile;
mod recovery;
pub mod schedule;
pub mod timers;
mod transitions;

pub use admission::{Admission, MaintenanceStatusReply, ScheduleEntry, SchedulePhase};
pub use arming::ArmOutcome;
pub use reconcile::ReconcileReport;
pub use recovery::RecoveryReport;
pub use schedule::Schedule;
pub use timers::{NotificationLedger, TimerKey, TimerPool};

use crate::clock::Clock;
use crate::config::Config;
use crate::event::MaintenanceEvent;
use crate::gateway::{ExemptionPolicy, PlayerGateway};
use crate::notifications::{Notification, Notifier};
use crate::state::{PersistedState, StateStore};
use anyhow::Result;
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Normal,
    Maintenance { current: MaintenanceEvent },
}

impl Mode {
    #[inline]
    pub fn is_maintenance(&self) -> bool {
        matches!(self, Mode::Maintenance { .. })
    }

    pub fn current(&self) -> Option<&MaintenanceEvent> {
        match self {
            Mode::Maintenance { current } => Some(current),
            Mode::Normal => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Maintenance { .. } => "maintenance",
        }
    }
}

/// Engine knobs resolved from [`Config`].
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub notification_offsets_minutes: Vec<u32>,
    pub thirty_second_notice: bool,
    pub kick_message: String,
    pub login_notification: bool,
    pub timezone: Tz,
    pub motd: String,
    pub version_label: String,
}

impl EngineSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            notification_offsets_minutes: config.notifications.notification_offsets_minutes.clone(),
            thirty_second_notice: config.notifications.thirty_seconds_before,
            kick_message: config.maintenance.kick_message.clone(),
            login_notification: config.notifications.login_notification,
            timezone: config.timezone()?,
            motd: config.maintenance.motd().to_string(),
            version_label: config.maintenance.version_label().to_string(),
        })
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        let config = Config::default();
        Self {
            notification_offsets_minutes: config.notifications.notification_offsets_minutes.clone(),
            thirty_second_notice: config.notifications.thirty_seconds_before,
            kick_message: config.maintenance.kick_message.clone(),
            login_notification: config.notifications.login_notification,
            timezone: chrono_tz::UTC,
            motd: config.maintenance.motd().to_string(),
            version_label: config.maintenance.version_label().to_string(),
        }
    }
}

/// Everything guarded by the engine lock.
#[derive(Debug, Default)]
pub(crate) struct EngineState {
    pub(crate) schedule: Schedule,
    pub(crate) processed: HashSet<String>,
    pub(crate) ledger: NotificationLedger,
    pub(crate) mode: Mode,
}

impl EngineState {
    /// Drop an event from every structure, cancelling its timers.
    pub(crate) fn forget(&mut self, event_id: &str) -> Option<MaintenanceEvent> {
        self.processed.remove(event_id);
        self.ledger.remove(event_id);
        self.schedule.remove(event_id)
    }
}

/// Side effect produced under the lock and run after it is released.
#[derive(Debug)]
pub(crate) enum Effect {
    Notify(Notification),
    Enforce(MaintenanceEvent),
}

pub struct MaintenanceEngine {
    state: Mutex<EngineState>,
    mode_tx: watch::Sender<Mode>,
    settings: EngineSettings,
    store: StateStore,
    notifier: Arc<dyn Notifier>,
    gateway: Arc<dyn PlayerGateway>,
    exemptions: ExemptionPolicy,
    clock: Arc<dyn Clock>,
    timers: TimerPool,
    self_ref: Weak<MaintenanceEngine>,
}

impl MaintenanceEngine {
    pub fn new(
        settings: EngineSettings,
        store: StateStore,
        notifier: Arc<dyn Notifier>,
        gateway: Arc<dyn PlayerGateway>,
        exemptions: ExemptionPolicy,
        clock: Arc<dyn Clock>,
    ) -> Arc<Self> {
        let (mode_tx, _) = watch::channel(Mode::Normal);

        if !exemptions.is_available() {
            warn!("No exemption provider configured: every principal will be disconnected during maintenance");
        }

        Arc::new_cyclic(|self_ref| Self {
            state: Mutex::new(EngineState::default()),
            mode_tx,
            settings,
            store,
            notifier,
            gateway,
            exemptions,
            clock,
            timers: TimerPool::new(),
            self_ref: self_ref.clone(),
        })
    }

    /// Current mode without taking the engine lock. May lag a transition that
    /// is being applied right now.
    pub fn mode(&self) -> Mode {
        self.mode_tx.borrow().clone()
    }

    #[inline]
    pub fn is_maintenance_mode(&self) -> bool {
        self.mode_tx.borrow().is_maintenance()
    }

    pub fn subscribe_mode(&self) -> watch::Receiver<Mode> {
        self.mode_tx.subscribe()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub async fn scheduled_events(&self) -> Vec<MaintenanceEvent> {
        self.state.lock().await.schedule.iter().cloned().collect()
    }

    pub async fn is_announced(&self, event_id: &str) -> bool {
        self.state.lock().await.ledger.is_announced(event_id)
    }

    pub async fn armed_timers(&self, event_id: &str) -> Vec<TimerKey> {
        self.state.lock().await.ledger.armed_keys(event_id)
    }

    /// Cancel the timers of one event. The event stays scheduled.
    pub async fn disarm_event(&self, event_id: &str) {
        let cancelled = self.state.lock().await.ledger.disarm(event_id);
        debug!("Disarmed {} timers for {}", cancelled, event_id);
    }

    pub async fn disarm_all(&self) {
        let cancelled = self.state.lock().await.ledger.disarm_all();
        info!("Disarmed {} timers", cancelled);
    }

    /// Wait until every timer callback that already fired has returned.
    pub async fn wait_for_callbacks(&self) {
        self.timers.wait_idle().await;
    }

    /// Stop accepting timers, cancel the armed ones and give callbacks that
    /// already started `grace` to finish. Stragglers are left to run.
    pub async fn shutdown(&self, grace: Duration) {
        info!("Shutting down maintenance engine");
        self.timers.close();
        self.disarm_all().await;

        match timeout(grace, self.timers.wait_idle()).await {
            Ok(()) => info!("All timer callbacks finished"),
            Err(_) => warn!(
                "Abandoning {} timer tasks still running after {:?}",
                self.timers.in_flight(),
                grace
            ),
        }
    }

    fn publish_mode(&self, mode: &Mode) {
        self.mode_tx.send_replace(mode.clone());
    }

    /// Write the snapshot, or delete it once nothing is left to remember.
    async fn persist_locked(&self, state: &EngineState) {
        if state.schedule.is_empty() && !state.mode.is_maintenance() {
            if let Err(e) = self.store.clear().await {
                error!("{}", e);
            }
            return;
        }

        let snapshot = PersistedState::new(
            state.mode.is_maintenance(),
            state.schedule.iter(),
            state.ledger.announced_map(),
        );

        if let Err(e) = self.store.save(&snapshot).await {
            error!("{} - in-memory state stays authoritative", e);
        }
    }

    async fn dispatch(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Notify(notification) => {
                    if let Err(e) = self.notifier.notify(&notification).await {
                        warn!(
                            "Notification '{}' for {} not delivered: {}",
                            notification.kind(),
                            notification.event().id,
                            e
                        );
                    }
                }
                Effect::Enforce(event) => self.enforce(&event).await,
            }
        }
    }
}
