//! Google backend for activity-logger.
//!
//! Credentials and the session are stored in:
//!   ~/.config/activity-logger/google/app_config.toml
//!   ~/.config/activity-logger/google/session.toml

pub mod app_config;
pub mod calendar;
pub mod identity;
pub mod oauth;
pub mod session;

pub use app_config::GoogleAppConfig;
pub use calendar::GoogleCalendar;
pub use identity::GoogleIdentity;
