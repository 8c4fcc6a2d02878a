//! In-memory collaborators that record what the engine asked of them.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use maintenance_manager::gateway::{ExemptionProvider, PlayerGateway, Principal};
use maintenance_manager::notifications::{Notification, Notifier};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Notifier that keeps every notification it was asked to deliver.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record deliveries but report every one as failed.
    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.failing.store(true, Ordering::SeqCst);
        notifier
    }

    pub fn all(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.sent.lock().unwrap().iter().map(Notification::kind).collect()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.kinds().into_iter().filter(|k| *k == kind).count()
    }

    pub fn count_for(&self, kind: &str, event_id: &str) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.kind() == kind && n.event().id == event_id)
            .count()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<()> {
        self.sent.lock().unwrap().push(notification.clone());
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("webhook unreachable"));
        }
        Ok(())
    }
}

/// Player gateway backed by plain vectors.
#[derive(Default)]
pub struct FakeGateway {
    online: Mutex<Vec<Principal>>,
    opted_out: Mutex<HashSet<String>>,
    messages: Mutex<Vec<(String, String)>>,
    disconnects: Mutex<Vec<(String, String)>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&self, principal: Principal) {
        self.online.lock().unwrap().push(principal);
    }

    /// Connect a principal holding the notice opt-out permission.
    pub fn connect_opted_out(&self, principal: Principal) {
        self.opted_out.lock().unwrap().insert(principal.id.clone());
        self.connect(principal);
    }

    pub fn online_ids(&self) -> Vec<String> {
        self.online.lock().unwrap().iter().map(|p| p.id.clone()).collect()
    }

    pub fn messages_for(&self, principal_id: &str) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == principal_id)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn message_count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    pub fn disconnected_ids(&self) -> Vec<String> {
        self.disconnects.lock().unwrap().iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn disconnect_reasons(&self) -> Vec<String> {
        self.disconnects.lock().unwrap().iter().map(|(_, reason)| reason.clone()).collect()
    }
}

#[async_trait]
impl PlayerGateway for FakeGateway {
    async fn online_principals(&self) -> Vec<Principal> {
        self.online.lock().unwrap().clone()
    }

    async fn has_permission(&self, principal: &Principal, permission: &str) -> bool {
        permission == "maintenance.notice.off" && self.opted_out.lock().unwrap().contains(&principal.id)
    }

    async fn send_message(&self, principal: &Principal, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((principal.id.clone(), message.to_string()));
    }

    async fn disconnect(&self, principal: &Principal, reason: &str) {
        self.online.lock().unwrap().retain(|p| p.id != principal.id);
        self.disconnects
            .lock()
            .unwrap()
            .push((principal.id.clone(), reason.to_string()));
    }
}

/// Exempts a fixed set of principal ids.
pub struct StaticExemptions {
    exempt: HashSet<String>,
}

impl StaticExemptions {
    pub fn of(ids: &[&str]) -> Self {
        Self {
            exempt: ids.iter().map(|id| id.to_string()).collect(),
        }
    }
}

#[async_trait]
impl ExemptionProvider for StaticExemptions {
    async fn is_exempt(&self, principal: &Principal) -> Result<bool> {
        Ok(self.exempt.contains(&principal.id))
    }
}

/// Provider whose backend is down.
pub struct FailingExemptions;

#[async_trait]
impl ExemptionProvider for FailingExemptions {
    async fn is_exempt(&self, _principal: &Principal) -> Result<bool> {
        Err(anyhow!("permission backend unavailable"))
    }
}
