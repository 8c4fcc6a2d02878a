//! Player-facing message text and human-readable time spans.

use crate::event::MaintenanceEvent;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

/// Lead time of a pre-maintenance notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLead {
    Minutes(u32),
    Seconds(i64),
}

impl NoticeLead {
    pub fn describe(&self) -> String {
        match *self {
            NoticeLead::Seconds(seconds) => plural(seconds, "second"),
            NoticeLead::Minutes(minutes) if minutes >= 60 => {
                let hours = plural(i64::from(minutes / 60), "hour");
                match minutes % 60 {
                    0 => hours,
                    rest => format!("{} {}", hours, plural(i64::from(rest), "minute")),
                }
            }
            NoticeLead::Minutes(minutes) => plural(i64::from(minutes), "minute"),
        }
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

pub fn format_datetime(instant: DateTime<Utc>, timezone: Tz) -> String {
    instant
        .with_timezone(&timezone)
        .format("%Y/%m/%d (%a) %H:%M %Z")
        .to_string()
}

/// Compact span such as `2d 3h 15m`, `3h 15m` or `15m`. Negative spans are
/// rendered by magnitude.
pub fn human_delta(span: Duration) -> String {
    let total_minutes = span.num_minutes().abs();
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

pub fn pre_maintenance_notice(event: &MaintenanceEvent, lead: NoticeLead, timezone: Tz) -> String {
    format!(
        "[Maintenance notice] Maintenance starts in {}.\nTitle: {}\nStart: {}",
        lead.describe(),
        event.title,
        format_datetime(event.start_time, timezone)
    )
}

pub fn login_notice(event: &MaintenanceEvent, until: Duration, timezone: Tz) -> String {
    format!(
        "[Upcoming maintenance] Maintenance is scheduled in {}.\nTitle: {}\nStart: {}",
        human_delta(until),
        event.title,
        format_datetime(event.start_time, timezone)
    )
}

/// Expand `{title}`, `{start}` and `{end}` in the configured kick message.
pub fn render_kick_message(template: &str, current: Option<&MaintenanceEvent>, timezone: Tz) -> String {
    match current {
        Some(event) => template
            .replace("{title}", &event.title)
            .replace("{start}", &format_datetime(event.start_time, timezone))
            .replace("{end}", &format_datetime(event.end_time, timezone)),
        None => template.to_string(),
    }
}
