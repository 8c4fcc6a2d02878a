// File: manager/src/main.rs
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use maintenance_manager::calendar::{CalendarFeed, GoogleCalendarClient};
use maintenance_manager::clock::{Clock, SystemClock};
use maintenance_manager::config::ConfigManager;
use maintenance_manager::constants::timing;
use maintenance_manager::engine::{EngineSettings, MaintenanceEngine};
use maintenance_manager::gateway::{ExemptionPolicy, GroupExemption, PlayerGateway, SessionRegistry};
use maintenance_manager::notifications::{DiscordNotifier, NoopNotifier, Notifier};
use maintenance_manager::scheduler::CalendarSyncScheduler;
use maintenance_manager::state::StateStore;
use maintenance_manager::web::{start_web_server, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with reduced verbosity
    let env_filter = EnvFilter::from_default_env()
        .add_directive("maintenance_manager=info".parse()?)
        .add_directive("tower_http=warn".parse()?)
        .add_directive("tokio_cron_scheduler=warn".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting Maintenance Manager");

    // Load configuration
    let config_manager = ConfigManager::new("config".to_string()).await?;
    let config = config_manager.get_current_config();
    let settings = EngineSettings::from_config(&config)?;
    info!(
        "Configuration loaded: timezone {}, {} notice offsets, state file {}",
        settings.timezone,
        settings.notification_offsets_minutes.len(),
        config.state_file
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let store = StateStore::new(PathBuf::from(&config.state_file));

    let notifier: Arc<dyn Notifier> = if config.discord.enabled {
        let discord = DiscordNotifier::new(&config.discord, settings.timezone)?;
        if !discord.is_enabled() {
            warn!("⚠️  Discord notifications enabled but no webhook_url set in config/main.toml");
        }
        Arc::new(discord)
    } else {
        info!("Discord notifications disabled");
        Arc::new(NoopNotifier)
    };

    let sessions = Arc::new(SessionRegistry::new());
    let exemptions = match config.maintenance.exempt_group() {
        Some(group) => {
            info!("Members of group '{}' may stay connected during maintenance", group);
            ExemptionPolicy::Provider(Arc::new(GroupExemption::new(sessions.clone(), group)))
        }
        None => ExemptionPolicy::Unavailable,
    };

    let gateway: Arc<dyn PlayerGateway> = sessions.clone();
    let engine = MaintenanceEngine::new(settings.clone(), store, notifier, gateway, exemptions, clock.clone());

    let recovery = engine.recover().await;
    info!(
        "State recovery complete: {} restored, maintenance {}",
        recovery.restored,
        if engine.is_maintenance_mode() { "active" } else { "inactive" }
    );

    let scheduler = if CalendarSyncScheduler::is_configured(&config.calendar) {
        let feed: Arc<dyn CalendarFeed> =
            Arc::new(GoogleCalendarClient::new(&config.calendar, settings.timezone, clock.clone())?);
        let scheduler = CalendarSyncScheduler::new(feed, engine.clone(), &config.calendar).await?;
        match scheduler.start().await {
            Ok(()) => Some(scheduler),
            Err(e) => {
                error!("Calendar polling not started: {}", e);
                None
            }
        }
    } else {
        None
    };

    // Start web server
    let state = AppState::new(config.clone(), engine.clone(), sessions);
    let served = start_web_server(state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
        }
        info!("Shutdown signal received");
    })
    .await;

    if let Some(scheduler) = &scheduler {
        scheduler.shutdown().await;
    }
    engine.shutdown(timing::SHUTDOWN_GRACE).await;

    info!("Maintenance Manager stopped");
    served
}
