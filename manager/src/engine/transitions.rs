use super::{Effect, EngineState, MaintenanceEngine, Mode};
use crate::event::MaintenanceEvent;
use crate::notifications::messages::render_kick_message;
use crate::notifications::Notification;
use futures::future::join_all;
use tracing::{debug, info};

impl MaintenanceEngine {
    /// Normal -> Maintenance. Returns false when maintenance is already active,
    /// in which case the first event keeps the slot.
    pub(super) fn enter_maintenance_locked(
        &self,
        state: &mut EngineState,
        event: MaintenanceEvent,
        announce: bool,
        effects: &mut Vec<Effect>,
    ) -> bool {
        if let Mode::Maintenance { current } = &state.mode {
            if current.id != event.id {
                info!(
                    "Maintenance {} is already active, ignoring start of {}",
                    current.id, event.id
                );
            }
            return false;
        }

        info!(
            "Entering maintenance mode: {} ({}) until {}",
            event.id, event.title, event.end_time
        );

        state.mode = Mode::Maintenance {
            current: event.clone(),
        };
        self.publish_mode(&state.mode);

        effects.push(Effect::Enforce(event.clone()));
        if announce {
            effects.push(Effect::Notify(Notification::Started(event)));
        }
        true
    }

    /// Maintenance -> Normal, on explicit request only. Returns false when the
    /// engine was not in maintenance.
    pub async fn end_maintenance(&self) -> bool {
        let mut effects = Vec::new();

        {
            let mut state = self.state.lock().await;
            let Mode::Maintenance { current } = std::mem::take(&mut state.mode) else {
                info!("End of maintenance requested, but maintenance is not active");
                return false;
            };

            state.forget(&current.id);
            self.publish_mode(&state.mode);
            self.persist_locked(&state).await;

            info!(
                "Maintenance {} ({}) ended, {} events still scheduled",
                current.id,
                current.title,
                state.schedule.len()
            );
            effects.push(Effect::Notify(Notification::Ended(current)));
        }

        self.dispatch(effects).await;
        true
    }

    /// Disconnect every online principal that is not exempt.
    pub(super) async fn enforce(&self, event: &MaintenanceEvent) {
        let reason = render_kick_message(&self.settings.kick_message, Some(event), self.settings.timezone);
        let principals = self.gateway.online_principals().await;

        let outcomes = join_all(principals.iter().map(|principal| {
            let reason = reason.as_str();
            async move {
                if self.exemptions.is_exempt(principal).await {
                    debug!("{} is exempt from maintenance {}", principal, event.id);
                    return false;
                }
                self.gateway.disconnect(principal, reason).await;
                true
            }
        }))
        .await;

        let disconnected = outcomes.into_iter().filter(|kicked| *kicked).count();
        info!(
            "Maintenance {}: disconnected {} of {} connected principals",
            event.id,
            disconnected,
            principals.len()
        );
    }
}
