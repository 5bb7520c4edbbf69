/// Title shown in the shell's top bar.
pub const APP_TITLE: &str = "Activity Logger";

/// Display name of the calendar activities are logged to.
pub const DEFAULT_CALENDAR_NAME: &str = "Activity Log";

/// How far back the recent-events list reaches.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 28;

/// Upper bound accepted for `lookback_days`.
pub const MAX_LOOKBACK_DAYS: i64 = 365 * 100;

/// Create and manage secondary calendars made by this app.
pub const SCOPE_CALENDAR_APP_CREATED: &str =
    "https://www.googleapis.com/auth/calendar.app.created";

/// Read the user's calendar list.
pub const SCOPE_CALENDARLIST_READONLY: &str =
    "https://www.googleapis.com/auth/calendar.calendarlist.readonly";

pub const REQUIRED_SCOPES: &[&str] = &[SCOPE_CALENDAR_APP_CREATED, SCOPE_CALENDARLIST_READONLY];
