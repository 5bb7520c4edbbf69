//! In-memory identity provider and calendar service.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use activity_logger_core::constants::{SCOPE_CALENDARLIST_READONLY, SCOPE_CALENDAR_APP_CREATED};
use activity_logger_core::{
    ActivityEvent, CalendarEntry, CalendarService, Error, EventQuery, IdentityProvider, NewEvent,
    Result, User,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Notify, watch};

pub const EMAIL: &str = "logger@example.com";

pub fn required_scopes() -> Vec<String> {
    vec![
        SCOPE_CALENDAR_APP_CREATED.to_string(),
        SCOPE_CALENDARLIST_READONLY.to_string(),
    ]
}

pub struct FakeIdentity {
    user: watch::Sender<User>,
    fail_init: bool,
    /// Scopes the user consents to on the next sign-in.
    consented_scopes: Mutex<String>,
}

impl FakeIdentity {
    pub fn new(consented_scopes: &str) -> Self {
        FakeIdentity {
            user: watch::channel(User::signed_out()).0,
            fail_init: false,
            consented_scopes: Mutex::new(consented_scopes.to_string()),
        }
    }

    pub fn failing() -> Self {
        FakeIdentity {
            fail_init: true,
            ..FakeIdentity::new("")
        }
    }

    pub fn signed_in(scopes: &str) -> Self {
        let identity = FakeIdentity::new(scopes);
        identity.user.send_replace(User {
            signed_in: true,
            email: EMAIL.to_string(),
            granted_scopes: scopes.to_string(),
        });
        identity
    }

    /// Simulate the user revoking a scope from outside the app.
    pub fn revoke(&self, scope: &str) {
        self.user.send_modify(|user| {
            user.granted_scopes = user
                .granted_scopes
                .split_whitespace()
                .filter(|s| *s != scope)
                .collect::<Vec<_>>()
                .join(" ");
        });
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn init(&self) -> Result<()> {
        if self.fail_init {
            return Err(Error::Identity("client failed to load".into()));
        }
        Ok(())
    }

    fn current_user(&self) -> User {
        self.user.borrow().clone()
    }

    fn listen(&self) -> watch::Receiver<User> {
        self.user.subscribe()
    }

    async fn sign_in(&self) -> Result<()> {
        let scopes = self.consented_scopes.lock().unwrap().clone();
        self.user.send_replace(User {
            signed_in: true,
            email: EMAIL.to_string(),
            granted_scopes: scopes,
        });
        Ok(())
    }

    async fn grant(&self, scopes: &[String]) -> Result<()> {
        self.user.send_modify(|user| {
            for scope in scopes {
                if !user.granted_scopes.split_whitespace().any(|s| s == scope) {
                    if !user.granted_scopes.is_empty() {
                        user.granted_scopes.push(' ');
                    }
                    user.granted_scopes.push_str(scope);
                }
            }
        });
        Ok(())
    }

    async fn sign_out(&self) -> Result<()> {
        self.user.send_replace(User::signed_out());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeCalendar {
    calendars: Mutex<Vec<CalendarEntry>>,
    events: Mutex<HashMap<String, Vec<ActivityEvent>>>,
    pub inserted: Mutex<Vec<(String, NewEvent)>>,
    pub queries: Mutex<Vec<EventQuery>>,
    pub created: AtomicUsize,
    pub list_event_calls: AtomicUsize,
    pub fail_insert: AtomicBool,
    /// When set, inserts signal `entered` and wait on `release`.
    pub gated: AtomicBool,
    pub entered: Notify,
    pub release: Notify,
}

impl FakeCalendar {
    pub fn new() -> Self {
        FakeCalendar::default()
    }

    pub fn with_calendar(id: &str, summary: &str) -> Self {
        let service = FakeCalendar::new();
        service.calendars.lock().unwrap().push(CalendarEntry {
            id: id.to_string(),
            summary: summary.to_string(),
        });
        service
    }

    pub fn add_event(&self, calendar_id: &str, summary: Option<&str>, start: DateTime<Utc>) {
        self.events
            .lock()
            .unwrap()
            .entry(calendar_id.to_string())
            .or_default()
            .push(ActivityEvent {
                summary: summary.map(str::to_string),
                start: Some(start),
                end: Some(start),
            });
    }

    pub fn calendars(&self) -> Vec<CalendarEntry> {
        self.calendars.lock().unwrap().clone()
    }

    pub fn inserted(&self) -> Vec<(String, NewEvent)> {
        self.inserted.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarService for FakeCalendar {
    async fn list_calendars(&self) -> Result<Vec<CalendarEntry>> {
        Ok(self.calendars())
    }

    async fn create_calendar(&self, summary: &str) -> Result<String> {
        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("created-{n}@group.calendar.google.com");
        self.calendars.lock().unwrap().push(CalendarEntry {
            id: id.clone(),
            summary: summary.to_string(),
        });
        Ok(id)
    }

    async fn insert_event(&self, calendar_id: &str, event: &NewEvent) -> Result<ActivityEvent> {
        if self.gated.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }

        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(Error::Calendar("insert rejected".into()));
        }

        self.inserted
            .lock()
            .unwrap()
            .push((calendar_id.to_string(), event.clone()));
        self.add_event(calendar_id, Some(&event.summary), event.start);

        Ok(ActivityEvent {
            summary: Some(event.summary.clone()),
            start: Some(event.start),
            end: Some(event.end),
        })
    }

    async fn list_events(
        &self,
        calendar_id: &str,
        query: &EventQuery,
    ) -> Result<Vec<ActivityEvent>> {
        self.list_event_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());

        let mut events: Vec<ActivityEvent> = self
            .events
            .lock()
            .unwrap()
            .get(calendar_id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|e| e.start.is_some_and(|s| s >= query.time_min))
            .collect();

        if query.order_by_start_time {
            events.sort_by_key(|e| e.start);
        }
        Ok(events)
    }
}
