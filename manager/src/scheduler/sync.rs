// File: manager/src/scheduler/sync.rs
use crate::calendar::CalendarFeed;
use crate::config::CalendarConfig;
use crate::constants::calendar as consts;
use crate::engine::{MaintenanceEngine, ReconcileReport};
use anyhow::{anyhow, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, instrument, warn};

pub struct CalendarSyncScheduler {
    feed: Arc<dyn CalendarFeed>,
    engine: Arc<MaintenanceEngine>,
    interval: Duration,
    initial_delay: Duration,
    scheduler: JobScheduler,
}

impl CalendarSyncScheduler {
    pub async fn new(
        feed: Arc<dyn CalendarFeed>,
        engine: Arc<MaintenanceEngine>,
        config: &CalendarConfig,
    ) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| anyhow!("Failed to create JobScheduler: {}", e))?;

        Ok(Self {
            feed,
            engine,
            interval: Duration::from_secs(config.check_interval_minutes.max(1) * 60),
            initial_delay: consts::INITIAL_SYNC_DELAY,
            scheduler,
        })
    }

    /// Whether polling may start at all. Logs what is missing when it may not.
    pub fn is_configured(config: &CalendarConfig) -> bool {
        if !config.enabled {
            info!("Calendar integration is disabled, not polling");
            return false;
        }

        if !config.has_usable_api_key() {
            error!("Calendar API key is not configured, set calendar.api_key in config/main.toml");
            error!("Create a key under 'APIs & Services' -> 'Credentials' in the Google Cloud console");
            return false;
        }

        true
    }

    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<()> {
        let feed = self.feed.clone();
        let engine = self.engine.clone();
        let first_run = Job::new_one_shot_async(self.initial_delay, move |job_id, _scheduler| {
            let feed = feed.clone();
            let engine = engine.clone();

            Box::pin(async move {
                info!("📅 Running initial calendar sync (job {})", job_id);
                sync_calendar(feed.as_ref(), &engine).await;
            })
        })
        .map_err(|e| anyhow!("Failed to create initial calendar sync job: {}", e))?;

        self.scheduler
            .add(first_run)
            .await
            .map_err(|e| anyhow!("Failed to add initial calendar sync job: {}", e))?;

        let feed = self.feed.clone();
        let engine = self.engine.clone();
        let repeated = Job::new_repeated_async(self.interval, move |job_id, _scheduler| {
            let feed = feed.clone();
            let engine = engine.clone();

            Box::pin(async move {
                info!("📅 Running periodic calendar sync (job {})", job_id);
                sync_calendar(feed.as_ref(), &engine).await;
            })
        })
        .map_err(|e| anyhow!("Failed to create periodic calendar sync job: {}", e))?;

        self.scheduler
            .add(repeated)
            .await
            .map_err(|e| anyhow!("Failed to add periodic calendar sync job: {}", e))?;

        self.scheduler
            .start()
            .await
            .map_err(|e| anyhow!("Failed to start calendar scheduler: {}", e))?;

        info!(
            "✓ Calendar sync scheduled: first run in {:?}, then every {:?}",
            self.initial_delay, self.interval
        );
        Ok(())
    }

    pub async fn shutdown(&self) {
        let mut scheduler = self.scheduler.clone();
        match scheduler.shutdown().await {
            Ok(()) => info!("Calendar scheduler stopped"),
            Err(e) => warn!("Failed to stop calendar scheduler cleanly: {}", e),
        }
    }
}

/// One poll: fetch, then reconcile. A failed fetch skips the cycle.
pub async fn sync_calendar(feed: &dyn CalendarFeed, engine: &MaintenanceEngine) -> Option<ReconcileReport> {
    match feed.fetch_events().await {
        Ok(events) => Some(engine.reconcile(events).await),
        Err(e) => {
            error!("✗ Failed to fetch calendar events, retrying next cycle: {}", e);
            None
        }
    }
}
