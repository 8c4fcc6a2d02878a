//! Mock Google Calendar v3 server

use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

pub const CALENDAR_ID: &str = "maintenance-calendar";
pub const API_KEY: &str = "test-api-key";

pub struct MockCalendarServer {
    pub server: MockServer,
}

impl MockCalendarServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL to put into `calendar.base_url`
    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    fn events_path() -> String {
        format!("/calendars/{}/events", CALENDAR_ID)
    }

    /// Answer `events.list` with the given items, requiring the expected query.
    pub async fn mock_events(&self, items: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path(Self::events_path()))
            .and(query_param("key", API_KEY))
            .and(query_param("orderBy", "startTime"))
            .and(query_param("singleEvents", "true"))
            .and(query_param("maxResults", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": items })))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_failure(&self, status_code: u16) {
        Mock::given(method("GET"))
            .and(path(Self::events_path()))
            .respond_with(ResponseTemplate::new(status_code))
            .mount(&self.server)
            .await;
    }

    pub async fn request_count(&self) -> usize {
        self.server.received_requests().await.unwrap_or_default().len()
    }
}

/// Timed calendar item
pub fn timed_item(id: &str, summary: &str, start: &str, end: &str) -> Value {
    json!({
        "id": id,
        "summary": summary,
        "start": { "dateTime": start },
        "end": { "dateTime": end }
    })
}

/// All-day calendar item
pub fn all_day_item(id: &str, summary: &str, start: &str, end: &str) -> Value {
    json!({
        "id": id,
        "summary": summary,
        "start": { "date": start },
        "end": { "date": end }
    })
}
