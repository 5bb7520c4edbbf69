//! Google Calendar as a [`CalendarService`].

use std::sync::Arc;

use activity_logger_core::event::{ActivityEvent, CalendarEntry, EventQuery, NewEvent};
use activity_logger_core::provider::CalendarService;
use activity_logger_core::{Error, Result};
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use google_calendar::types::{EventDateTime, MinAccessRole, OrderBy, SendUpdates};
use tracing::debug;

use crate::identity::GoogleIdentity;

fn calendar_error(e: anyhow::Error) -> Error {
    Error::Calendar(format!("{:#}", e))
}

pub struct GoogleCalendar {
    identity: Arc<GoogleIdentity>,
}

impl GoogleCalendar {
    pub fn new(identity: Arc<GoogleIdentity>) -> Self {
        GoogleCalendar { identity }
    }

    async fn list_calendars_inner(&self) -> anyhow::Result<Vec<CalendarEntry>> {
        let client = self.identity.client().await?;

        let calendars = client
            .calendar_list()
            .list_all(MinAccessRole::default(), false, false)
            .await
            .context("Failed to fetch calendars")?
            .body;

        debug!(count = calendars.len(), "fetched calendar list");

        Ok(calendars
            .into_iter()
            .map(|c| CalendarEntry {
                id: c.id,
                summary: c.summary,
            })
            .collect())
    }

    async fn create_calendar_inner(&self, summary: &str) -> anyhow::Result<String> {
        let client = self.identity.client().await?;

        let calendar = to_google_calendar(summary);

        let response = client
            .calendars()
            .insert(&calendar)
            .await
            .with_context(|| format!("Failed to create calendar: {}", summary))?;

        if response.body.id.is_empty() {
            anyhow::bail!("Google returned no id for new calendar {}", summary);
        }

        Ok(response.body.id)
    }

    async fn insert_event_inner(
        &self,
        calendar_id: &str,
        event: &NewEvent,
    ) -> anyhow::Result<ActivityEvent> {
        let client = self.identity.client().await?;
        let google_event = to_google_event(event);

        let response = client
            .events()
            .insert(
                calendar_id,
                0,
                0,
                false,
                SendUpdates::None,
                false,
                &google_event,
            )
            .await
            .with_context(|| format!("Failed to create event: {}", event.summary))?;

        debug!(id = %response.body.id, "inserted event");
        Ok(from_google_event(response.body))
    }

    async fn list_events_inner(
        &self,
        calendar_id: &str,
        query: &EventQuery,
    ) -> anyhow::Result<Vec<ActivityEvent>> {
        let client = self.identity.client().await?;

        // Google only accepts startTime ordering with expanded recurrences
        let order_by = if query.order_by_start_time && query.single_events {
            OrderBy::StartTime
        } else {
            OrderBy::default()
        };
        let time_min = query.time_min.to_rfc3339();

        let response = client
            .events()
            .list_all(
                calendar_id,
                "",
                0,
                order_by,
                &[],
                "", // search query
                &[],
                false,
                false,
                query.single_events,
                "",
                &time_min,
                "",
                "",
            )
            .await
            .context("Failed to fetch events")?;

        Ok(response
            .body
            .into_iter()
            .filter(|e| e.status != "cancelled")
            .map(from_google_event)
            .collect())
    }
}

#[async_trait]
impl CalendarService for GoogleCalendar {
    async fn list_calendars(&self) -> Result<Vec<CalendarEntry>> {
        self.list_calendars_inner().await.map_err(calendar_error)
    }

    async fn create_calendar(&self, summary: &str) -> Result<String> {
        self.create_calendar_inner(summary)
            .await
            .map_err(calendar_error)
    }

    async fn insert_event(&self, calendar_id: &str, event: &NewEvent) -> Result<ActivityEvent> {
        self.insert_event_inner(calendar_id, event)
            .await
            .map_err(calendar_error)
    }

    async fn list_events(
        &self,
        calendar_id: &str,
        query: &EventQuery,
    ) -> Result<Vec<ActivityEvent>> {
        self.list_events_inner(calendar_id, query)
            .await
            .map_err(calendar_error)
    }
}

/// A new secondary calendar; Google assigns the id and time zone.
pub fn to_google_calendar(summary: &str) -> google_calendar::types::Calendar {
    google_calendar::types::Calendar {
        conference_properties: None,
        description: String::new(),
        etag: String::new(),
        id: String::new(),
        kind: String::new(),
        location: String::new(),
        summary: summary.to_string(),
        time_zone: String::new(),
    }
}

fn to_google_time(at: DateTime<Utc>) -> EventDateTime {
    EventDateTime {
        date: None,
        date_time: Some(at),
        time_zone: String::new(),
    }
}

/// A timed event; Google assigns the id.
pub fn to_google_event(event: &NewEvent) -> google_calendar::types::Event {
    google_calendar::types::Event {
        summary: event.summary.clone(),
        start: Some(to_google_time(event.start)),
        end: Some(to_google_time(event.end)),
        ..Default::default()
    }
}

/// All-day times are taken as midnight UTC.
fn from_google_time(time: Option<&EventDateTime>) -> Option<DateTime<Utc>> {
    let time = time?;
    time.date_time.or_else(|| {
        time.date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    })
}

pub fn from_google_event(event: google_calendar::types::Event) -> ActivityEvent {
    ActivityEvent {
        start: from_google_time(event.start.as_ref()),
        end: from_google_time(event.end.as_ref()),
        summary: if event.summary.is_empty() {
            None
        } else {
            Some(event.summary)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn new_calendar_carries_only_the_summary() {
        let calendar = to_google_calendar("Activity Log");
        assert_eq!(calendar.summary, "Activity Log");
        assert!(calendar.id.is_empty());
        assert!(calendar.time_zone.is_empty());
        assert!(calendar.conference_properties.is_none());
    }

    #[test]
    fn new_event_is_timed_and_instant() {
        let at = Utc::now();
        let google = to_google_event(&NewEvent::instant("Gym", at));

        assert_eq!(google.summary, "Gym");
        assert!(google.id.is_empty());
        let start = google.start.unwrap();
        let end = google.end.unwrap();
        assert_eq!(start.date_time, Some(at));
        assert_eq!(end.date_time, Some(at));
        assert!(start.date.is_none());
        assert!(start.time_zone.is_empty());
    }

    #[test]
    fn converts_back_from_google() {
        let at = Utc::now();
        let event = from_google_event(to_google_event(&NewEvent::instant("Read", at)));
        assert_eq!(event.summary.as_deref(), Some("Read"));
        assert_eq!(event.start, Some(at));
        assert_eq!(event.end, Some(at));
    }

    #[test]
    fn blank_summary_becomes_none() {
        let event = from_google_event(google_calendar::types::Event::default());
        assert_eq!(event, ActivityEvent::default());
    }

    #[test]
    fn all_day_start_is_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let google = google_calendar::types::Event {
            summary: "Holiday".into(),
            start: Some(EventDateTime {
                date: Some(date),
                date_time: None,
                time_zone: String::new(),
            }),
            ..Default::default()
        };

        let event = from_google_event(google);
        assert_eq!(
            event.start,
            Some(date.and_hms_opt(0, 0, 0).unwrap().and_utc())
        );
        assert_eq!(event.end, None);
    }
}
