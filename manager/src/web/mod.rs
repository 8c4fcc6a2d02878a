// File: manager/src/web/mod.rs
pub mod handlers;
pub mod server;

pub use server::{create_router, start_web_server};

use std::sync::Arc;

use crate::config::Config;
use crate::engine::MaintenanceEngine;
use crate::gateway::SessionRegistry;

// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub engine: Arc<MaintenanceEngine>,
    // Sessions reported by the proxy host; also the engine's player gateway
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(config: Arc<Config>, engine: Arc<MaintenanceEngine>, sessions: Arc<SessionRegistry>) -> Self {
        Self {
            config,
            engine,
            sessions,
        }
    }
}
