//! Calendar and event types exchanged with the remote calendar service.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// An entry from the remote calendar list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub id: String,
    pub summary: String,
}

/// A logged activity as stored by the remote service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub summary: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl ActivityEvent {
    /// The summary, treating an empty string as absent.
    pub fn text(&self) -> Option<&str> {
        self.summary.as_deref().filter(|s| !s.is_empty())
    }
}

/// Input for inserting an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub summary: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl NewEvent {
    /// A zero-length event at `at`.
    pub fn instant(summary: impl Into<String>, at: DateTime<Utc>) -> Self {
        NewEvent {
            summary: summary.into(),
            start: at,
            end: at,
        }
    }
}

/// Parameters for listing events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub time_min: DateTime<Utc>,
    pub order_by_start_time: bool,
    pub single_events: bool,
}

impl EventQuery {
    /// Events starting within the trailing `days`, recurring instances
    /// expanded, ordered by start time.
    ///
    /// A window reaching past the earliest representable instant starts there.
    pub fn trailing_days(now: DateTime<Utc>, days: i64) -> Self {
        let time_min = Duration::try_days(days)
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        EventQuery {
            time_min,
            order_by_start_time: true,
            single_events: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_summary_has_no_text() {
        let event = ActivityEvent {
            summary: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(event.text(), None);
        assert_eq!(ActivityEvent::default().text(), None);
    }

    #[test]
    fn instant_event_has_zero_duration() {
        let now = Utc::now();
        let event = NewEvent::instant("Gym", now);
        assert_eq!(event.start, event.end);
        assert_eq!(event.summary, "Gym");
    }

    #[test]
    fn trailing_window() {
        let now = Utc::now();
        let query = EventQuery::trailing_days(now, 28);
        assert_eq!(now - query.time_min, Duration::days(28));
        assert!(query.order_by_start_time && query.single_events);
    }

    #[test]
    fn oversized_window_saturates() {
        let query = EventQuery::trailing_days(Utc::now(), 1_000_000_000);
        assert_eq!(query.time_min, DateTime::<Utc>::MIN_UTC);

        let query = EventQuery::trailing_days(Utc::now(), i64::MAX);
        assert_eq!(query.time_min, DateTime::<Utc>::MIN_UTC);
    }
}
