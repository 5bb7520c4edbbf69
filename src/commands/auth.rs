use activity_logger_core::config::AppConfig;
use activity_logger_core::AuthState;
use anyhow::Result;

use crate::app;

pub async fn run(config: &AppConfig) -> Result<()> {
    let mut shell = app::start(config).await?;

    match shell.state() {
        AuthState::SignedInAuthorized { email } => {
            println!("Already signed in as {email}");
        }
        AuthState::SignedInInsufficientScope { email } => {
            println!("Granting calendar access for {email}...");
            shell.authorize().await?;
        }
        AuthState::SignedOut | AuthState::Unready => {
            println!("Signing in with Google...");
            shell.sign_in().await?;
        }
    }

    super::print_shell(&shell);
    Ok(())
}
