//! Display formatting for event timestamps.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};

/// Shown when an event carries no start time.
pub const UNKNOWN: &str = "unknown";

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format `ts` as local wall-clock time (`YYYY-MM-DD HH:MM:SS`).
pub fn format_local(ts: Option<&DateTime<Utc>>) -> String {
    format_in(ts, &Local)
}

/// Format `ts` as wall-clock time in `tz`.
pub fn format_in<Tz>(ts: Option<&DateTime<Utc>>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match ts {
        Some(ts) => ts.with_timezone(tz).format(DISPLAY_FORMAT).to_string(),
        None => UNKNOWN.to_string(),
    }
}

/// Formats with either the machine's local zone or a configured IANA zone.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Local,
    Zoned(chrono_tz::Tz),
}

impl Clock {
    pub fn format(&self, ts: Option<&DateTime<Utc>>) -> String {
        match self {
            Clock::Local => format_local(ts),
            Clock::Zoned(tz) => format_in(ts, tz),
        }
    }
}
