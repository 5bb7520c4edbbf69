use activity_logger_core::config::AppConfig;
use anyhow::Result;

use crate::app;

pub async fn run(config: &AppConfig) -> Result<()> {
    let shell = app::start(config).await?;
    super::print_shell(&shell);
    Ok(())
}
