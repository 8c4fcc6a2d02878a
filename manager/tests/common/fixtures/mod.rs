//! This module provides reusable test utilities:
//! - Recording collaborators (notifier, player gateway, exemptions)
//! - An engine harness on paused tokio time with a temp state file
//! - Mock HTTP servers (Discord webhook, Google Calendar)
//! - Test configuration builders
//! - Common test data

// Allow unused code in test fixtures - each test binary uses a subset
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod fakes;
pub mod harness;
pub mod mock_calendar;
pub mod mock_webhook;
pub mod test_config;
pub mod test_data;

// Re-export commonly used items
pub use fakes::{FailingExemptions, FakeGateway, RecordingNotifier, StaticExemptions};
pub use harness::TestHarness;
pub use mock_calendar::MockCalendarServer;
pub use mock_webhook::MockWebhookServer;
pub use test_config::TestConfigBuilder;
pub use test_data::*;
