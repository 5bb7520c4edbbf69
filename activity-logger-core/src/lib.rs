//! Core of activity-logger.
//!
//! - `shell` tracks sign-in state and decides when the form is shown
//! - `form` resolves the activity calendar, logs events and keeps the
//!   recent list
//! - `provider` holds the traits the two talk to the outside world through

pub mod config;
pub mod constants;
pub mod display;
pub mod error;
pub mod event;
pub mod form;
pub mod provider;
pub mod scope;
pub mod shell;
pub mod timestamp;

pub use display::DisplayMode;
pub use error::{Error, Result};
pub use event::{ActivityEvent, CalendarEntry, EventQuery, NewEvent};
pub use form::{ActivityForm, FormView, Submission};
pub use provider::{CalendarService, IdentityProvider, User};
pub use shell::{AuthShell, AuthState, ShellView};
