use super::{Effect, MaintenanceEngine};
use crate::event::MaintenanceEvent;
use crate::notifications::Notification;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecoveryReport {
    pub restored: usize,
    /// Event whose maintenance was resumed
    pub resumed: Option<String>,
    pub rearmed: Vec<String>,
    pub pruned: Vec<String>,
}

impl MaintenanceEngine {
    /// Rebuild the engine from the persisted snapshot.
    ///
    /// Runs in two phases. The first restores every event and its announcement
    /// marker with no side effects; the second derives the mode and the timers
    /// from what was restored. Resuming maintenance is silent, but connected
    /// principals are still enforced against.
    pub async fn recover(&self) -> RecoveryReport {
        let Some(snapshot) = self.store.load().await else {
            info!("No persisted maintenance state, starting clean");
            return RecoveryReport::default();
        };

        let mut report = RecoveryReport::default();
        let mut effects = Vec::new();

        {
            let mut state = self.state.lock().await;
            let now = self.clock.now();
            let was_active = snapshot.maintenance_mode_active;

            for persisted in snapshot.events.iter().cloned() {
                let event = MaintenanceEvent::from(persisted);
                if snapshot.was_announced(&event.id) {
                    state.ledger.mark_announced(&event.id);
                }
                state.processed.insert(event.id.clone());
                state.schedule.upsert(event);
            }
            report.restored = state.schedule.len();

            if was_active {
                let started = state.schedule.iter().find(|event| event.has_started(now)).cloned();
                match started {
                    Some(event) => {
                        info!("Resuming maintenance {} ({})", event.id, event.title);
                        report.resumed = Some(event.id.clone());
                        self.enter_maintenance_locked(&mut state, event, false, &mut effects);
                    }
                    None => warn!("Persisted state was in maintenance, but no restored event has started"),
                }
            }

            let events: Vec<MaintenanceEvent> = state.schedule.iter().cloned().collect();
            for event in events {
                if report.resumed.as_deref() == Some(event.id.as_str()) {
                    continue;
                }

                if event.has_ended(now) {
                    info!("Dropping ended maintenance {} from restored state", event.id);
                    state.forget(&event.id);
                    report.pruned.push(event.id);
                    continue;
                }

                if event.start_time > now {
                    if !state.ledger.is_announced(&event.id) {
                        state.ledger.mark_announced(&event.id);
                        effects.push(Effect::Notify(Notification::Scheduled(event.clone())));
                    }
                    self.arm_timers_locked(&mut state, &event, now, &mut effects);
                    report.rearmed.push(event.id);
                } else {
                    warn!(
                        "Restored maintenance {} ({}) started at {} while the service was down, not starting automatically",
                        event.id, event.title, event.start_time
                    );
                }
            }

            if !report.pruned.is_empty() || was_active != state.mode.is_maintenance() {
                self.persist_locked(&state).await;
            }

            info!(
                "Recovered {} events: {} re-armed, {} pruned, maintenance {}",
                report.restored,
                report.rearmed.len(),
                report.pruned.len(),
                if state.mode.is_maintenance() { "active" } else { "inactive" }
            );
        }

        self.dispatch(effects).await;
        report
    }
}
