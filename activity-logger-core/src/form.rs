//! The activity form: calendar resolution, submission and the recent list.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::display::{DisplayMode, events_to_display};
use crate::error::Result;
use crate::event::{ActivityEvent, EventQuery, NewEvent};
use crate::provider::CalendarService;
use crate::timestamp::Clock;

/// Find the calendar named `name`, creating it when missing.
///
/// Two callers racing on an absent name can both create a calendar.
pub async fn resolve_calendar<S: CalendarService + ?Sized>(
    service: &S,
    name: &str,
) -> Result<String> {
    let calendars = service.list_calendars().await?;

    if let Some(existing) = calendars
        .into_iter()
        .find(|c| c.summary == name && !c.id.is_empty())
    {
        debug!(calendar_id = %existing.id, "found existing calendar");
        return Ok(existing.id);
    }

    let id = service.create_calendar(name).await?;
    info!(calendar_id = %id, name, "created calendar");
    Ok(id)
}

/// Result of a submit call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Logged(ActivityEvent),
    /// Another submission on this form was still running.
    AlreadyInProgress,
    /// The calendar has not been resolved yet.
    NotReady,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryView {
    pub when: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormView {
    Loading,
    Ready {
        calendar_id: String,
        input: String,
        submitting: bool,
        mode: DisplayMode,
        entries: Vec<EntryView>,
    },
}

#[derive(Debug, Default)]
struct FormState {
    input: String,
    /// Most recent first.
    events: Vec<ActivityEvent>,
    mode: DisplayMode,
}

pub struct ActivityForm<S> {
    service: S,
    calendar_name: String,
    lookback_days: i64,
    clock: Clock,
    calendar_id: OnceCell<String>,
    submitting: AtomicBool,
    state: Mutex<FormState>,
}

/// Clears the in-progress flag when the submission ends, however it ends.
struct SubmitGuard<'a>(&'a AtomicBool);

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: CalendarService> ActivityForm<S> {
    pub fn new(service: S, calendar_name: impl Into<String>, lookback_days: i64) -> Self {
        ActivityForm {
            service,
            calendar_name: calendar_name.into(),
            lookback_days,
            clock: Clock::default(),
            calendar_id: OnceCell::new(),
            submitting: AtomicBool::new(false),
            state: Mutex::new(FormState::default()),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolve the calendar (once per form) and load the recent list.
    pub async fn mount(&self) -> Result<()> {
        self.calendar_id
            .get_or_try_init(|| resolve_calendar(&self.service, &self.calendar_name))
            .await?;
        self.load_recent_events().await
    }

    pub fn calendar_id(&self) -> Option<&str> {
        self.calendar_id.get().map(String::as_str)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Fetch the trailing window of events and cache them newest first.
    pub async fn load_recent_events(&self) -> Result<()> {
        let Some(calendar_id) = self.calendar_id() else {
            debug!("calendar not resolved, skipping event load");
            return Ok(());
        };

        let query = EventQuery::trailing_days(Utc::now(), self.lookback_days);
        let mut events = self.service.list_events(calendar_id, &query).await?;
        events.reverse();

        debug!(count = events.len(), "loaded recent events");
        self.state().events = events;
        Ok(())
    }

    /// Log `text` as an instantaneous event at the current time.
    ///
    /// The text is sent as-is. After the insert finishes, successfully or
    /// not, the recent list is reloaded before the form accepts another
    /// submission.
    pub async fn submit(&self, text: &str) -> Result<Submission> {
        let Some(calendar_id) = self.calendar_id() else {
            return Ok(Submission::NotReady);
        };

        if self.submitting.swap(true, Ordering::AcqRel) {
            debug!("submission already in progress");
            return Ok(Submission::AlreadyInProgress);
        }
        let _guard = SubmitGuard(&self.submitting);

        let event = NewEvent::instant(text, Utc::now());
        let inserted = self.service.insert_event(calendar_id, &event).await;
        let reloaded = self.load_recent_events().await;

        let inserted = inserted?;
        reloaded?;

        info!(summary = text, "logged activity");
        Ok(Submission::Logged(inserted))
    }

    /// Submit whatever is currently in the input field.
    pub async fn submit_input(&self) -> Result<Submission> {
        let text = self.input();
        self.submit(&text).await
    }

    pub fn input(&self) -> String {
        self.state().input.clone()
    }

    pub fn set_input(&self, text: impl Into<String>) {
        self.state().input = text.into();
    }

    pub fn mode(&self) -> DisplayMode {
        self.state().mode
    }

    pub fn set_mode(&self, mode: DisplayMode) {
        self.state().mode = mode;
    }

    pub fn toggle_mode(&self) -> DisplayMode {
        let mut state = self.state();
        state.mode = state.mode.toggle();
        state.mode
    }

    /// The cached list, newest first, unfiltered.
    pub fn events(&self) -> Vec<ActivityEvent> {
        self.state().events.clone()
    }

    pub fn events_to_display(&self) -> Vec<ActivityEvent> {
        let state = self.state();
        events_to_display(&state.events, state.mode)
    }

    /// Copy the summary of the displayed entry at `index` into the input.
    pub fn select_entry(&self, index: usize) -> Option<String> {
        let mut state = self.state();
        let shown = events_to_display(&state.events, state.mode);
        let text = shown.get(index)?.summary.clone().unwrap_or_default();
        state.input = text.clone();
        Some(text)
    }

    pub fn render(&self) -> FormView {
        let Some(calendar_id) = self.calendar_id() else {
            return FormView::Loading;
        };

        let state = self.state();
        let entries = events_to_display(&state.events, state.mode)
            .iter()
            .map(|event| EntryView {
                when: self.clock.format(event.start.as_ref()),
                summary: event.summary.clone().unwrap_or_default(),
            })
            .collect();

        FormView::Ready {
            calendar_id: calendar_id.to_string(),
            input: state.input.clone(),
            submitting: self.is_submitting(),
            mode: state.mode,
            entries,
        }
    }
}
