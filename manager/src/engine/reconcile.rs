use super::{ArmOutcome, Effect, MaintenanceEngine};
use crate::event::MaintenanceEvent;
use crate::notifications::Notification;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// What one reconciliation pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub added: Vec<String>,
    pub updated: Vec<String>,
    pub cancelled: Vec<String>,
    /// Ended events dropped without a cancellation notice
    pub pruned: Vec<String>,
    /// Fetched events that were already over
    pub rejected: Vec<String>,
    pub unchanged: usize,
}

impl ReconcileReport {
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty()
            || !self.updated.is_empty()
            || !self.cancelled.is_empty()
            || !self.pruned.is_empty()
    }
}

impl MaintenanceEngine {
    /// Diff the full set of currently visible events against the schedule.
    ///
    /// Events missing from `fetched` are cancelled unless they already ended.
    /// Cancelling the active maintenance does not leave maintenance mode; that
    /// still takes [`MaintenanceEngine::end_maintenance`].
    #[instrument(skip_all, fields(fetched = fetched.len()))]
    pub async fn reconcile(&self, fetched: Vec<MaintenanceEvent>) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let mut effects = Vec::new();

        {
            let mut state = self.state.lock().await;
            let now = self.clock.now();

            let mut incoming: HashMap<String, MaintenanceEvent> = HashMap::with_capacity(fetched.len());
            let mut order = Vec::with_capacity(fetched.len());
            for event in fetched {
                if incoming.contains_key(&event.id) {
                    warn!("Duplicate event id {} in feed, keeping the first copy", event.id);
                    continue;
                }
                order.push(event.id.clone());
                incoming.insert(event.id.clone(), event);
            }

            let current_id = state.mode.current().map(|current| current.id.clone());
            let held: Vec<MaintenanceEvent> = state.schedule.iter().cloned().collect();

            for event in held {
                let is_current = current_id.as_deref() == Some(event.id.as_str());

                if event.has_ended(now) {
                    if !is_current {
                        debug!("Pruning ended maintenance {}", event.id);
                        state.forget(&event.id);
                        report.pruned.push(event.id);
                    }
                    continue;
                }

                if !incoming.contains_key(&event.id) {
                    info!("Maintenance {} ({}) cancelled", event.id, event.title);
                    if is_current {
                        info!("Maintenance mode stays on until {} is ended explicitly", event.id);
                    }
                    state.forget(&event.id);
                    report.cancelled.push(event.id.clone());
                    effects.push(Effect::Notify(Notification::Cancelled(event)));
                }
            }

            for id in order {
                let Some(event) = incoming.remove(&id) else {
                    continue;
                };

                match state.schedule.get(&id).cloned() {
                    None => match self.arm_locked(&mut state, event, &mut effects) {
                        ArmOutcome::Armed => report.added.push(id),
                        ArmOutcome::Unchanged => report.unchanged += 1,
                        ArmOutcome::Stale => report.rejected.push(id),
                    },
                    Some(held) if held == event => report.unchanged += 1,
                    Some(held) => {
                        info!(
                            "Maintenance {} updated: {} - {} -> {} - {}",
                            id, held.start_time, held.end_time, event.start_time, event.end_time
                        );
                        let cancelled = state.ledger.disarm(&id);
                        debug!("Cancelled {} timers of the previous version of {}", cancelled, id);

                        effects.push(Effect::Notify(Notification::Updated {
                            old: held,
                            new: event.clone(),
                        }));
                        self.replace_locked(&mut state, event.clone());
                        self.arm_timers_locked(&mut state, &event, now, &mut effects);
                        report.updated.push(id);
                    }
                }
            }

            if report.has_changes() {
                self.persist_locked(&state).await;
            }
        }

        info!(
            "Reconciled calendar: {} added, {} updated, {} cancelled, {} pruned, {} unchanged",
            report.added.len(),
            report.updated.len(),
            report.cancelled.len(),
            report.pruned.len(),
            report.unchanged
        );

        self.dispatch(effects).await;
        report
    }
}
