// File: manager/src/gateway/session_registry.rs
//
// In-process view of the sessions a proxy host reports over HTTP. Messages and
// disconnects requested by the engine are queued as directives that the host
// drains and applies.

use super::{ExemptionProvider, PlayerGateway, Principal};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Directive {
    Message { text: String },
    Disconnect { reason: String },
}

#[derive(Debug, Clone)]
struct Session {
    principal: Principal,
    permissions: HashSet<String>,
    groups: Vec<String>,
    directives: Vec<Directive>,
    disconnecting: bool,
}

pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::with_capacity(64))),
        }
    }

    pub async fn register(
        &self,
        principal: Principal,
        permissions: impl IntoIterator<Item = String>,
        groups: impl IntoIterator<Item = String>,
    ) {
        let session = Session {
            principal: principal.clone(),
            permissions: permissions.into_iter().collect(),
            groups: groups.into_iter().collect(),
            directives: Vec::new(),
            disconnecting: false,
        };

        let mut sessions = self.sessions.write().await;
        if sessions.insert(principal.id.clone(), session).is_some() {
            debug!("Replaced existing session for {}", principal);
        } else {
            info!("Session registered: {}", principal);
        }
    }

    pub async fn unregister(&self, principal_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(principal_id);
        if let Some(session) = &removed {
            info!("Session closed: {}", session.principal);
        }
        removed.is_some()
    }

    /// Take every queued directive for a session. A drained disconnect also
    /// closes the session.
    pub async fn drain_directives(&self, principal_id: &str) -> Option<Vec<Directive>> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(principal_id)?;
        let directives = std::mem::take(&mut session.directives);

        if session.disconnecting {
            sessions.remove(principal_id);
        }

        Some(directives)
    }

    pub async fn groups_of(&self, principal_id: &str) -> Option<Vec<String>> {
        self.sessions
            .read()
            .await
            .get(principal_id)
            .map(|session| session.groups.clone())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    async fn enqueue(&self, principal: &Principal, directive: Directive) {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&principal.id) {
            Some(session) => {
                if matches!(directive, Directive::Disconnect { .. }) {
                    session.disconnecting = true;
                }
                session.directives.push(directive);
            }
            None => debug!("Dropping directive for unknown session {}", principal),
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlayerGateway for SessionRegistry {
    async fn online_principals(&self) -> Vec<Principal> {
        self.sessions
            .read()
            .await
            .values()
            .filter(|session| !session.disconnecting)
            .map(|session| session.principal.clone())
            .collect()
    }

    async fn has_permission(&self, principal: &Principal, permission: &str) -> bool {
        self.sessions
            .read()
            .await
            .get(&principal.id)
            .map(|session| session.permissions.contains(permission))
            .unwrap_or(false)
    }

    async fn send_message(&self, principal: &Principal, message: &str) {
        self.enqueue(
            principal,
            Directive::Message {
                text: message.to_string(),
            },
        )
        .await;
    }

    async fn disconnect(&self, principal: &Principal, reason: &str) {
        self.enqueue(
            principal,
            Directive::Disconnect {
                reason: reason.to_string(),
            },
        )
        .await;
    }
}

/// Exempts members of one group, as reported with the session.
pub struct GroupExemption {
    registry: Arc<SessionRegistry>,
    group: String,
}

impl GroupExemption {
    pub fn new(registry: Arc<SessionRegistry>, group: impl Into<String>) -> Self {
        Self {
            registry,
            group: group.into(),
        }
    }
}

#[async_trait]
impl ExemptionProvider for GroupExemption {
    async fn is_exempt(&self, principal: &Principal) -> Result<bool> {
        let groups = self
            .registry
            .groups_of(&principal.id)
            .await
            .ok_or_else(|| anyhow!("No session data for {}", principal))?;

        Ok(groups.iter().any(|group| group.eq_ignore_ascii_case(&self.group)))
    }
}
