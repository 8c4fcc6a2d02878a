//! Enforcement surface: who is connected, who may stay, and how to reach them.

pub mod session_registry;

pub use session_registry::{Directive, GroupExemption, SessionRegistry};

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub name: String,
}

impl Principal {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Connected principals as seen by the host service.
#[async_trait]
pub trait PlayerGateway: Send + Sync {
    async fn online_principals(&self) -> Vec<Principal>;

    async fn has_permission(&self, principal: &Principal, permission: &str) -> bool;

    async fn send_message(&self, principal: &Principal, message: &str);

    async fn disconnect(&self, principal: &Principal, reason: &str);
}

/// Source of the grant that lets a principal stay during maintenance.
#[async_trait]
pub trait ExemptionProvider: Send + Sync {
    async fn is_exempt(&self, principal: &Principal) -> Result<bool>;
}

/// How exemptions are decided. `Unavailable` is a configuration state, not an
/// error: nobody is exempt.
#[derive(Clone)]
pub enum ExemptionPolicy {
    Provider(Arc<dyn ExemptionProvider>),
    Unavailable,
}

impl ExemptionPolicy {
    pub fn is_available(&self) -> bool {
        matches!(self, ExemptionPolicy::Provider(_))
    }

    /// Fails closed: a missing provider or a provider error means "not exempt".
    pub async fn is_exempt(&self, principal: &Principal) -> bool {
        match self {
            ExemptionPolicy::Provider(provider) => match provider.is_exempt(principal).await {
                Ok(exempt) => exempt,
                Err(e) => {
                    error!("Exemption check failed for {}: {}", principal, e);
                    false
                }
            },
            ExemptionPolicy::Unavailable => {
                error!("No exemption provider available, cannot exempt {}", principal);
                false
            }
        }
    }
}

impl fmt::Debug for ExemptionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExemptionPolicy::Provider(_) => write!(f, "ExemptionPolicy::Provider"),
            ExemptionPolicy::Unavailable => write!(f, "ExemptionPolicy::Unavailable"),
        }
    }
}
