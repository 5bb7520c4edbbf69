use activity_logger_core::config::AppConfig;
use anyhow::Result;

use crate::app;

pub async fn run(config: &AppConfig) -> Result<()> {
    let mut shell = app::start(config).await?;
    shell.sign_out().await?;
    println!("Signed out.");
    Ok(())
}
