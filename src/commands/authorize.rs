use activity_logger_core::config::AppConfig;
use activity_logger_core::AuthState;
use anyhow::Result;

use crate::app;

pub async fn run(config: &AppConfig) -> Result<()> {
    let mut shell = app::start(config).await?;

    if matches!(shell.state(), AuthState::SignedOut) {
        anyhow::bail!(
            "Not signed in.\n\n\
            Sign in with:\n  \
            activity-logger auth"
        );
    }

    shell.authorize().await?;
    super::print_shell(&shell);
    Ok(())
}
