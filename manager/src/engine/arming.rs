use super::{Effect, EngineState, MaintenanceEngine, Mode, TimerKey};
use crate::constants::{notifications, timing};
use crate::event::MaintenanceEvent;
use crate::notifications::messages::{pre_maintenance_notice, NoticeLead};
use crate::notifications::Notification;
use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmOutcome {
    /// Event was scheduled or superseded and its timers armed
    Armed,
    /// A value-equal copy was already scheduled
    Unchanged,
    /// Both bounds lie in the past
    Stale,
}

impl MaintenanceEngine {
    /// Schedule a single event. Safe to call repeatedly with the same event:
    /// the "scheduled" announcement goes out once per occurrence.
    pub async fn arm_event(&self, event: MaintenanceEvent) -> ArmOutcome {
        let mut effects = Vec::new();

        let outcome = {
            let mut state = self.state.lock().await;
            let outcome = self.arm_locked(&mut state, event, &mut effects);
            if outcome == ArmOutcome::Armed {
                self.persist_locked(&state).await;
            }
            outcome
        };

        self.dispatch(effects).await;
        outcome
    }

    pub(super) fn arm_locked(
        &self,
        state: &mut EngineState,
        event: MaintenanceEvent,
        effects: &mut Vec<Effect>,
    ) -> ArmOutcome {
        let now = self.clock.now();

        if event.is_stale(now) {
            info!("Ignoring maintenance {} ({}): already over", event.id, event.title);
            return ArmOutcome::Stale;
        }

        if state.processed.contains(&event.id) {
            if state.schedule.get(&event.id) == Some(&event) {
                debug!("Maintenance {} unchanged", event.id);
                return ArmOutcome::Unchanged;
            }
            let cancelled = state.ledger.disarm(&event.id);
            info!("Superseding maintenance {} ({} timers cancelled)", event.id, cancelled);
        }

        state.processed.insert(event.id.clone());
        self.replace_locked(state, event.clone());

        if !state.ledger.is_announced(&event.id) {
            state.ledger.mark_announced(&event.id);
            effects.push(Effect::Notify(Notification::Scheduled(event.clone())));
        }

        self.arm_timers_locked(state, &event, now, effects);
        info!(
            "Maintenance {} ({}) armed for {}",
            event.id, event.title, event.start_time
        );
        ArmOutcome::Armed
    }

    /// Put `event` in the schedule and, when it is the active maintenance,
    /// refresh the mode's copy as well.
    pub(super) fn replace_locked(&self, state: &mut EngineState, event: MaintenanceEvent) {
        if let Mode::Maintenance { current } = &mut state.mode {
            if current.id == event.id && *current != event {
                *current = event.clone();
                self.publish_mode(&state.mode);
            }
        }
        state.schedule.upsert(event);
    }

    /// Arm notice and start timers. A start time that passed less than the
    /// grace window ago enters maintenance right away.
    pub(super) fn arm_timers_locked(
        &self,
        state: &mut EngineState,
        event: &MaintenanceEvent,
        now: DateTime<Utc>,
        effects: &mut Vec<Effect>,
    ) {
        for &minutes in &self.settings.notification_offsets_minutes {
            let fire_at = event.start_time - Duration::minutes(i64::from(minutes));
            if fire_at > now {
                self.arm_timer_locked(state, &event.id, TimerKey::Notice { minutes }, fire_at - now);
            }
        }

        if self.settings.thirty_second_notice {
            let fire_at = event.start_time - Duration::seconds(timing::FINAL_NOTICE_SECONDS);
            if fire_at > now {
                self.arm_timer_locked(state, &event.id, TimerKey::FinalNotice, fire_at - now);
            }
        }

        if event.start_time > now {
            self.arm_timer_locked(state, &event.id, TimerKey::Start, event.start_time - now);
        } else if now - event.start_time <= Duration::seconds(timing::START_GRACE_SECONDS) {
            if self.enter_maintenance_locked(state, event.clone(), true, effects) {
                info!("Maintenance {} started within the grace window", event.id);
            }
        } else if !state.mode.current().is_some_and(|current| current.id == event.id) {
            warn!(
                "Start of maintenance {} ({}) was missed at {}, not starting automatically",
                event.id, event.title, event.start_time
            );
        }
    }

    fn arm_timer_locked(&self, state: &mut EngineState, event_id: &str, key: TimerKey, delay: Duration) {
        let engine = self.self_ref.clone();
        let id = event_id.to_string();
        let delay = delay.to_std().unwrap_or_default();

        let scheduled = self.timers.schedule(delay, move |timer_id| async move {
            if let Some(engine) = engine.upgrade() {
                engine.on_timer_fired(&id, key, timer_id).await;
            }
        });

        match scheduled {
            Ok(timer) => {
                debug!("Armed {} timer for {} in {:?}", key, event_id, delay);
                state.ledger.insert_timer(event_id, key, timer);
            }
            Err(e) => debug!("Not arming {} timer for {}: {}", key, event_id, e),
        }
    }

    async fn on_timer_fired(&self, event_id: &str, key: TimerKey, timer_id: u64) {
        let mut effects = Vec::new();
        let mut notice = None;

        {
            let mut state = self.state.lock().await;
            if !state.ledger.take_timer(event_id, key, timer_id) {
                debug!("Ignoring {} timer {} for {}: no longer armed", key, timer_id, event_id);
                return;
            }

            let Some(event) = state.schedule.get(event_id).cloned() else {
                return;
            };

            let tz = self.settings.timezone;
            match key {
                TimerKey::Start => {
                    if self.enter_maintenance_locked(&mut state, event, true, &mut effects) {
                        self.persist_locked(&state).await;
                    }
                }
                TimerKey::Notice { minutes } => {
                    notice = Some(pre_maintenance_notice(&event, NoticeLead::Minutes(minutes), tz));
                }
                TimerKey::FinalNotice => {
                    notice = Some(pre_maintenance_notice(
                        &event,
                        NoticeLead::Seconds(timing::FINAL_NOTICE_SECONDS),
                        tz,
                    ));
                }
            }
        }

        self.dispatch(effects).await;

        if let Some(text) = notice {
            self.broadcast_notice(&text).await;
        }
    }

    /// Message every connected principal that has not opted out of notices.
    async fn broadcast_notice(&self, text: &str) {
        let principals = self.gateway.online_principals().await;

        let delivered = join_all(principals.iter().map(|principal| async move {
            if self
                .gateway
                .has_permission(principal, notifications::NOTICE_OPT_OUT_PERMISSION)
                .await
            {
                return false;
            }
            self.gateway.send_message(principal, text).await;
            true
        }))
        .await;

        let sent = delivered.into_iter().filter(|sent| *sent).count();
        info!("Maintenance notice sent to {} of {} principals", sent, principals.len());
    }
}
