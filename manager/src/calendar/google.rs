// File: manager/src/calendar/google.rs
use super::CalendarFeed;
use crate::clock::Clock;
use crate::config::CalendarConfig;
use crate::constants::calendar as consts;
use crate::errors::FeedError;
use crate::event::MaintenanceEvent;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
pub struct EventsPage {
    #[serde(default)]
    pub items: Vec<CalendarItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalendarItem {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub start: Option<EventBound>,
    pub end: Option<EventBound>,
}

/// Either a timed bound (`dateTime`) or an all-day bound (`date`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBound {
    pub date_time: Option<String>,
    pub date: Option<String>,
}

/// Google Calendar v3 `events.list` client authenticated with an API key.
pub struct GoogleCalendarClient {
    base_url: String,
    calendar_id: String,
    api_key: String,
    timezone: Tz,
    clock: Arc<dyn Clock>,
    client: Client,
}

impl GoogleCalendarClient {
    pub fn new(config: &CalendarConfig, timezone: Tz, clock: Arc<dyn Clock>) -> Result<Self> {
        let client = Client::builder()
            .timeout(consts::REQUEST_TIMEOUT)
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client for GoogleCalendarClient: {}", e))?;

        Ok(Self {
            base_url: config.base_url().trim_end_matches('/').to_string(),
            calendar_id: config.calendar_id.clone(),
            api_key: config.api_key.trim().to_string(),
            timezone,
            clock,
            client,
        })
    }

    async fn fetch_page(&self, now: DateTime<Utc>) -> Result<EventsPage> {
        let url = format!("{}/calendars/{}/events", self.base_url, self.calendar_id);
        let time_min = now.to_rfc3339_opts(SecondsFormat::Secs, true);
        let time_max = (now + Duration::days(consts::LOOKAHEAD_DAYS)).to_rfc3339_opts(SecondsFormat::Secs, true);
        let max_results = consts::MAX_RESULTS.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("timeMin", time_min.as_str()),
                ("timeMax", time_max.as_str()),
                ("orderBy", "startTime"),
                ("singleEvents", "true"),
                ("maxResults", max_results.as_str()),
            ])
            .send()
            .await
            .map_err(|e| anyhow!("Failed to query calendar {}: {}", self.calendar_id, e))?;

        if !response.status().is_success() {
            return Err(FeedError::Http {
                status: response.status().as_u16(),
            }
            .into());
        }

        response
            .json::<EventsPage>()
            .await
            .map_err(|e| anyhow!("Failed to parse calendar response: {}", e))
    }
}

#[async_trait]
impl CalendarFeed for GoogleCalendarClient {
    async fn fetch_events(&self) -> Result<Vec<MaintenanceEvent>> {
        let now = self.clock.now();
        let page = self.fetch_page(now).await?;

        if page.items.is_empty() {
            debug!("No upcoming maintenance events in calendar {}", self.calendar_id);
        }

        let mut events = Vec::with_capacity(page.items.len());
        for item in &page.items {
            match to_event(item, self.timezone) {
                Ok(event) if event.has_ended(now) => debug!("Skipping ended calendar event {}", event.id),
                Ok(event) => events.push(event),
                Err(e) => warn!("Dropping calendar event: {}", e),
            }
        }

        Ok(events)
    }
}

/// Convert one calendar item. All-day bounds resolve to midnight in `timezone`.
pub fn to_event(item: &CalendarItem, timezone: Tz) -> Result<MaintenanceEvent, FeedError> {
    let start = resolve_bound(&item.id, "start", item.start.as_ref(), timezone)?;
    let end = resolve_bound(&item.id, "end", item.end.as_ref(), timezone)?;

    if end < start {
        return Err(FeedError::InvalidWindow {
            event_id: item.id.clone(),
        });
    }

    Ok(MaintenanceEvent::new(
        item.id.clone(),
        item.summary.clone().unwrap_or_default(),
        item.description.clone().unwrap_or_default(),
        start,
        end,
    ))
}

fn resolve_bound(
    event_id: &str,
    field: &str,
    bound: Option<&EventBound>,
    timezone: Tz,
) -> Result<DateTime<Utc>, FeedError> {
    let invalid = |value: &str| FeedError::InvalidTimestamp {
        event_id: event_id.to_string(),
        value: value.to_string(),
    };

    let bound = bound.ok_or_else(|| FeedError::MissingBound {
        event_id: event_id.to_string(),
        field: field.to_string(),
    })?;

    if let Some(date_time) = &bound.date_time {
        return DateTime::parse_from_rfc3339(date_time)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|_| invalid(date_time));
    }

    if let Some(date) = &bound.date {
        let midnight = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| invalid(date))?
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| invalid(date))?;

        return timezone
            .from_local_datetime(&midnight)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| invalid(date));
    }

    Err(FeedError::MissingBound {
        event_id: event_id.to_string(),
        field: field.to_string(),
    })
}
