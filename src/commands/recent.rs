use activity_logger_core::config::AppConfig;
use activity_logger_core::DisplayMode;
use anyhow::Result;

use crate::app;
use crate::render::Render;

pub async fn run(config: &AppConfig, unique: bool) -> Result<()> {
    let shell = app::start(config).await?;
    let form = app::require_authorized(config, &shell).await?;

    if unique {
        form.set_mode(DisplayMode::Unique);
    }

    println!("{}", form.render().render());
    Ok(())
}
