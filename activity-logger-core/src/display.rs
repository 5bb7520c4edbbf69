//! Recent-events display filter.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::ActivityEvent;

/// Which entries of the recent-events list are shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    All,
    /// First occurrence of each distinct activity text.
    Unique,
}

impl DisplayMode {
    pub fn toggle(self) -> Self {
        match self {
            DisplayMode::All => DisplayMode::Unique,
            DisplayMode::Unique => DisplayMode::All,
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayMode::All => write!(f, "All"),
            DisplayMode::Unique => write!(f, "Unique"),
        }
    }
}

/// Project `events` through `mode`, keeping their order.
pub fn events_to_display(events: &[ActivityEvent], mode: DisplayMode) -> Vec<ActivityEvent> {
    match mode {
        DisplayMode::All => events.to_vec(),
        DisplayMode::Unique => {
            let mut seen = HashSet::new();
            events
                .iter()
                .filter(|event| match event.text() {
                    Some(text) => seen.insert(text),
                    None => false,
                })
                .cloned()
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(summaries: &[Option<&str>]) -> Vec<ActivityEvent> {
        summaries
            .iter()
            .map(|s| ActivityEvent {
                summary: s.map(str::to_string),
                ..Default::default()
            })
            .collect()
    }

    fn summaries(events: &[ActivityEvent]) -> Vec<Option<&str>> {
        events.iter().map(|e| e.summary.as_deref()).collect()
    }

    #[test]
    fn unique_keeps_first_occurrence() {
        let input = events(&[Some("run"), Some("walk"), Some("run"), Some(""), Some("walk")]);
        let shown = events_to_display(&input, DisplayMode::Unique);
        assert_eq!(summaries(&shown), vec![Some("run"), Some("walk")]);
    }

    #[test]
    fn unique_drops_absent_summaries() {
        let input = events(&[None, Some("read"), None]);
        let shown = events_to_display(&input, DisplayMode::Unique);
        assert_eq!(summaries(&shown), vec![Some("read")]);
    }

    #[test]
    fn unique_is_case_sensitive() {
        let input = events(&[Some("Gym"), Some("gym"), Some("Gym ")]);
        let shown = events_to_display(&input, DisplayMode::Unique);
        assert_eq!(shown.len(), 3);
    }

    #[test]
    fn all_is_identity() {
        let input = events(&[Some("run"), None, Some("run"), Some("")]);
        assert_eq!(events_to_display(&input, DisplayMode::All), input);
        assert!(events_to_display(&[], DisplayMode::All).is_empty());
    }

    #[test]
    fn toggle_flips() {
        assert_eq!(DisplayMode::All.toggle(), DisplayMode::Unique);
        assert_eq!(DisplayMode::Unique.toggle(), DisplayMode::All);
        assert_eq!(DisplayMode::default(), DisplayMode::All);
    }
}
