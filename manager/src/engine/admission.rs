//! Read-side helpers for the host: connection admission, the login notice,
//! the server-list rewrite and the schedule overview.

use super::{MaintenanceEngine, Mode};
use crate::constants::notifications;
use crate::event::MaintenanceEvent;
use crate::gateway::Principal;
use crate::notifications::messages::{human_delta, login_notice, render_kick_message};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Admission {
    Allowed,
    Denied { reason: String },
}

/// Server-list reply shown while maintenance is active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaintenanceStatusReply {
    pub motd: String,
    pub version_label: String,
    pub online_players: u32,
    pub max_players: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulePhase {
    Upcoming,
    Active,
    Overrun,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleEntry {
    pub event: MaintenanceEvent,
    pub phase: SchedulePhase,
    /// Time until start, time remaining, or time past the planned end
    pub delta: String,
}

impl MaintenanceEngine {
    /// Decide whether a connecting principal may join. Reads the mode without
    /// the engine lock.
    pub async fn admit(&self, principal: &Principal) -> Admission {
        let Mode::Maintenance { current } = self.mode() else {
            return Admission::Allowed;
        };

        if self.exemptions.is_exempt(principal).await {
            info!("{} joined during maintenance {} (exempt)", principal, current.id);
            return Admission::Allowed;
        }

        info!("Refusing {} during maintenance {}", principal, current.id);
        Admission::Denied {
            reason: render_kick_message(&self.settings.kick_message, Some(&current), self.settings.timezone),
        }
    }

    /// Notice for a principal that just joined, if an event is coming up.
    pub async fn login_notice(&self, principal: &Principal) -> Option<String> {
        if !self.settings.login_notification || self.is_maintenance_mode() {
            return None;
        }

        if self
            .gateway
            .has_permission(principal, notifications::NOTICE_OPT_OUT_PERMISSION)
            .await
        {
            return None;
        }

        let now = self.clock.now();
        let next = self.state.lock().await.schedule.next_upcoming(now).cloned()?;
        Some(login_notice(&next, next.start_time - now, self.settings.timezone))
    }

    /// Replacement server-list reply while maintenance is active.
    pub fn server_status(&self) -> Option<MaintenanceStatusReply> {
        if !self.is_maintenance_mode() {
            return None;
        }

        Some(MaintenanceStatusReply {
            motd: self.settings.motd.clone(),
            version_label: self.settings.version_label.clone(),
            online_players: 0,
            max_players: 0,
        })
    }

    pub async fn schedule_overview(&self, limit: usize) -> Vec<ScheduleEntry> {
        let now = self.clock.now();
        let state = self.state.lock().await;

        state
            .schedule
            .iter()
            .take(limit)
            .map(|event| {
                let (phase, span) = if event.start_time > now {
                    (SchedulePhase::Upcoming, event.start_time - now)
                } else if event.end_time >= now {
                    (SchedulePhase::Active, event.end_time - now)
                } else {
                    (SchedulePhase::Overrun, now - event.end_time)
                };

                ScheduleEntry {
                    event: event.clone(),
                    phase,
                    delta: human_delta(span),
                }
            })
            .collect()
    }
}
