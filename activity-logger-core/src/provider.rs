//! Seams to the external services.
//!
//! The shell talks to an [`IdentityProvider`] and the form to a
//! [`CalendarService`]. Implementations own their credentials; the
//! components only see user snapshots and calendar data.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::error::Result;
use crate::event::{ActivityEvent, CalendarEntry, EventQuery, NewEvent};

/// Snapshot of the identity provider's current user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub signed_in: bool,
    pub email: String,
    /// Space-delimited scope string.
    pub granted_scopes: String,
}

impl User {
    pub fn signed_out() -> Self {
        User::default()
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Load stored state and report readiness.
    async fn init(&self) -> Result<()>;

    fn current_user(&self) -> User;

    /// Subscribe to user changes. Dropping the receiver unsubscribes.
    fn listen(&self) -> watch::Receiver<User>;

    async fn sign_in(&self) -> Result<()>;

    /// Ask the signed-in user to consent to `scopes` in addition to what
    /// they already granted.
    async fn grant(&self, scopes: &[String]) -> Result<()>;

    async fn sign_out(&self) -> Result<()>;
}

#[async_trait]
pub trait CalendarService: Send + Sync {
    async fn list_calendars(&self) -> Result<Vec<CalendarEntry>>;

    /// Create a calendar and return its id.
    async fn create_calendar(&self, summary: &str) -> Result<String>;

    async fn insert_event(&self, calendar_id: &str, event: &NewEvent) -> Result<ActivityEvent>;

    async fn list_events(&self, calendar_id: &str, query: &EventQuery)
    -> Result<Vec<ActivityEvent>>;
}

#[async_trait]
impl<T: CalendarService + ?Sized> CalendarService for std::sync::Arc<T> {
    async fn list_calendars(&self) -> Result<Vec<CalendarEntry>> {
        (**self).list_calendars().await
    }

    async fn create_calendar(&self, summary: &str) -> Result<String> {
        (**self).create_calendar(summary).await
    }

    async fn insert_event(&self, calendar_id: &str, event: &NewEvent) -> Result<ActivityEvent> {
        (**self).insert_event(calendar_id, event).await
    }

    async fn list_events(
        &self,
        calendar_id: &str,
        query: &EventQuery,
    ) -> Result<Vec<ActivityEvent>> {
        (**self).list_events(calendar_id, query).await
    }
}

#[async_trait]
impl<T: IdentityProvider + ?Sized> IdentityProvider for std::sync::Arc<T> {
    async fn init(&self) -> Result<()> {
        (**self).init().await
    }

    fn current_user(&self) -> User {
        (**self).current_user()
    }

    fn listen(&self) -> watch::Receiver<User> {
        (**self).listen()
    }

    async fn sign_in(&self) -> Result<()> {
        (**self).sign_in().await
    }

    async fn grant(&self, scopes: &[String]) -> Result<()> {
        (**self).grant(scopes).await
    }

    async fn sign_out(&self) -> Result<()> {
        (**self).sign_out().await
    }
}
