use std::path::Path;
use std::sync::Arc;

use activity_logger_core::config::AppConfig;
use activity_logger_core::{ActivityForm, AuthShell, AuthState};
use activity_logger_google::{GoogleAppConfig, GoogleCalendar, GoogleIdentity};
use anyhow::Result;
use tracing::debug;

use crate::utils::tui;

pub type Shell = AuthShell<Arc<GoogleIdentity>>;
pub type Form = ActivityForm<GoogleCalendar>;

pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    debug!(path = ?path, "loading config");
    let config = match path {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    Ok(config)
}

/// Build the shell around the Google identity and mount it.
pub async fn start(config: &AppConfig) -> Result<Shell> {
    let google = GoogleAppConfig::load()?;
    let identity = Arc::new(GoogleIdentity::new(google, config.required_scopes.clone()));
    let mut shell = AuthShell::new(identity, config.required_scopes.clone());

    let spinner = tui::create_spinner("Loading...".to_string());
    let mounted = shell.mount().await;
    spinner.finish_and_clear();
    mounted?;

    debug!(state = ?shell.state(), "shell mounted");
    Ok(shell)
}

/// A form for the shell's user, not yet mounted.
fn form(config: &AppConfig, shell: &Shell) -> Result<Form> {
    let service = GoogleCalendar::new(Arc::clone(shell.provider()));
    let form = ActivityForm::new(service, config.calendar_name.clone(), config.lookback_days)
        .with_clock(config.clock()?);
    Ok(form)
}

/// Mount a form, failing with a hint when the user cannot log yet.
pub async fn require_authorized(config: &AppConfig, shell: &Shell) -> Result<Form> {
    match shell.state() {
        AuthState::SignedInAuthorized { .. } => {}
        AuthState::SignedInInsufficientScope { email } => anyhow::bail!(
            "{} has not granted calendar access.\n\n\
            Grant it with:\n  \
            activity-logger authorize",
            email
        ),
        AuthState::SignedOut | AuthState::Unready => anyhow::bail!(
            "Not signed in.\n\n\
            Sign in with:\n  \
            activity-logger auth"
        ),
    }

    mount_form(config, shell).await
}

/// Build a form and resolve its calendar.
pub async fn mount_form(config: &AppConfig, shell: &Shell) -> Result<Form> {
    let form = form(config, shell)?;

    let spinner = tui::create_spinner("Loading...".to_string());
    let mounted = form.mount().await;
    spinner.finish_and_clear();
    mounted?;

    debug!(calendar_id = form.calendar_id().unwrap_or_default(), "form mounted");
    Ok(form)
}
