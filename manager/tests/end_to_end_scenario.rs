//! End-to-end scenario: calendar feed -> engine -> Discord webhook, across a
//! restart of the service.

mod common;

use chrono::Duration;
use common::fixtures::mock_calendar::{timed_item, API_KEY, CALENDAR_ID};
use common::fixtures::*;
use maintenance_manager::calendar::GoogleCalendarClient;
use maintenance_manager::clock::{Clock, TokioClock};
use maintenance_manager::config::{CalendarConfig, DiscordConfig};
use maintenance_manager::engine::{EngineSettings, MaintenanceEngine};
use maintenance_manager::gateway::ExemptionPolicy;
use maintenance_manager::notifications::DiscordNotifier;
use maintenance_manager::scheduler::sync::sync_calendar;
use maintenance_manager::state::StateStore;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

struct Service {
    engine: Arc<MaintenanceEngine>,
    feed: GoogleCalendarClient,
}

fn start_service(
    calendar: &MockCalendarServer,
    webhook: &MockWebhookServer,
    state_file: &Path,
    gateway: Arc<FakeGateway>,
) -> Service {
    let clock: Arc<dyn Clock> = Arc::new(TokioClock::starting_at(anchor()));

    let discord = DiscordConfig {
        enabled: true,
        webhook_url: webhook.webhook_url(),
        footer: None,
    };
    let notifier = Arc::new(DiscordNotifier::new(&discord, chrono_tz::UTC).unwrap());

    let engine = MaintenanceEngine::new(
        EngineSettings::default(),
        StateStore::new(state_file),
        notifier,
        gateway,
        ExemptionPolicy::Unavailable,
        clock.clone(),
    );

    let calendar_config = CalendarConfig {
        enabled: true,
        api_key: API_KEY.to_string(),
        calendar_id: CALENDAR_ID.to_string(),
        check_interval_minutes: 30,
        base_url: Some(calendar.base_url()),
    };
    let feed = GoogleCalendarClient::new(&calendar_config, chrono_tz::UTC, clock).unwrap();

    Service { engine, feed }
}

async fn embed_titles(webhook: &MockWebhookServer) -> Vec<String> {
    webhook
        .received_bodies()
        .await
        .iter()
        .filter_map(|body| body["embeds"][0]["title"].as_str().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn test_calendar_driven_lifecycle() {
    let calendar = MockCalendarServer::start().await;
    let webhook = MockWebhookServer::start().await;
    webhook.mock_success().await;
    let gateway = Arc::new(FakeGateway::new());
    gateway.connect(principal("1"));

    let state_dir = TempDir::new().unwrap();
    let state_file = state_dir.path().join("state.json");
    let service = start_service(&calendar, &webhook, &state_file, gateway.clone());
    assert_eq!(service.engine.recover().await.restored, 0);

    // 1. Two events appear in the calendar
    calendar
        .mock_events(vec![
            timed_item("patch", "Patch day", "2026-06-03T12:00:00Z", "2026-06-03T13:00:00Z"),
            timed_item("move", "Rack move", "2026-06-04T12:00:00Z", "2026-06-04T16:00:00Z"),
        ])
        .await;

    let report = sync_calendar(&service.feed, &service.engine).await.unwrap();
    assert_eq!(report.added.len(), 2);
    let titles = embed_titles(&webhook).await;
    assert_eq!(titles.len(), 2);
    assert!(titles.iter().all(|t| t.contains("Maintenance scheduled")));

    // Polling again with the same calendar is silent
    let report = sync_calendar(&service.feed, &service.engine).await.unwrap();
    assert_eq!(report.unchanged, 2);
    assert_eq!(webhook.request_count().await, 2);

    // 2. One event is moved, the other deleted
    calendar.server.reset().await;
    calendar
        .mock_events(vec![timed_item(
            "patch",
            "Patch day",
            "2026-06-03T14:00:00Z",
            "2026-06-03T15:00:00Z",
        )])
        .await;

    let report = sync_calendar(&service.feed, &service.engine).await.unwrap();
    assert_eq!(report.updated, vec!["patch".to_string()]);
    assert_eq!(report.cancelled, vec!["move".to_string()]);
    let titles = embed_titles(&webhook).await;
    assert_eq!(titles.len(), 4);
    assert!(titles.iter().any(|t| t.contains("Maintenance cancelled")));
    assert!(titles.iter().any(|t| t.contains("Maintenance rescheduled: Patch day")));

    // 3. An emergency window that has just begun
    calendar.server.reset().await;
    calendar
        .mock_events(vec![
            timed_item("hotfix", "Hotfix", "2026-06-01T11:59:50Z", "2026-06-01T13:00:00Z"),
            timed_item("patch", "Patch day", "2026-06-03T14:00:00Z", "2026-06-03T15:00:00Z"),
        ])
        .await;

    sync_calendar(&service.feed, &service.engine).await.unwrap();
    assert_eq!(
        service.engine.mode().current().map(|e| e.id.clone()),
        Some("hotfix".to_string())
    );
    assert_eq!(gateway.disconnected_ids(), vec!["1".to_string()]);
    let titles = embed_titles(&webhook).await;
    assert!(titles.last().unwrap().contains("Maintenance started: Hotfix"));

    // 4. The service restarts mid-maintenance
    service.engine.shutdown(std::time::Duration::from_secs(1)).await;
    let sent_before_restart = webhook.request_count().await;

    let service = start_service(&calendar, &webhook, &state_file, gateway.clone());
    let recovery = service.engine.recover().await;

    assert_eq!(recovery.resumed, Some("hotfix".to_string()));
    assert_eq!(recovery.rearmed, vec!["patch".to_string()]);
    assert!(service.engine.is_maintenance_mode());
    assert_eq!(webhook.request_count().await, sent_before_restart);

    // 5. An operator ends the maintenance
    assert!(service.engine.end_maintenance().await);
    assert!(!service.engine.is_maintenance_mode());
    let titles = embed_titles(&webhook).await;
    assert!(titles.last().unwrap().contains("Maintenance finished: Hotfix"));

    let snapshot = StateStore::new(&state_file).load().await.expect("patch still scheduled");
    assert!(!snapshot.maintenance_mode_active);
    assert_eq!(snapshot.events.len(), 1);
    assert!(snapshot.was_announced("patch"));

    service.engine.shutdown(std::time::Duration::from_secs(1)).await;
}

#[tokio::test(start_paused = true)]
async fn test_hour_ahead_window_runs_until_ended() {
    let harness = TestHarness::new();
    let a = hourly(events::A, harness.now(), 1);

    harness.engine.reconcile(vec![a.clone()]).await;
    assert!(!harness.engine.is_maintenance_mode());

    harness.advance(Duration::hours(1) + Duration::seconds(1)).await;
    assert_eq!(harness.engine.mode().current(), Some(&a));

    assert!(harness.engine.end_maintenance().await);
    assert!(!harness.engine.is_maintenance_mode());
    assert!(harness.engine.scheduled_events().await.is_empty());
    assert!(!harness.store().exists().await);
    assert_eq!(
        harness.notifier.kinds(),
        vec![kinds::SCHEDULED, kinds::STARTED, kinds::ENDED]
    );
}

#[tokio::test(start_paused = true)]
async fn test_extended_window_is_updated_once() {
    let harness = TestHarness::new();
    let a = hourly(events::A, harness.now(), 1);
    let extended = event_at(events::A, harness.now(), Duration::hours(1), Duration::hours(2));

    harness.engine.reconcile(vec![a]).await;
    harness.advance(Duration::minutes(20)).await;

    harness.engine.reconcile(vec![extended.clone()]).await;
    harness.engine.reconcile(vec![extended.clone()]).await;
    assert_eq!(harness.notifier.count_for(kinds::UPDATED, events::A), 1);

    harness.advance(Duration::minutes(40) + Duration::seconds(1)).await;
    assert_eq!(harness.engine.mode().current(), Some(&extended));
    assert_eq!(harness.notifier.count(kinds::STARTED), 1);
}
