use activity_logger_core::config::AppConfig;
use activity_logger_core::Submission;
use anyhow::Result;
use owo_colors::OwoColorize;

use crate::app;
use crate::render::Render;
use crate::utils::tui;

pub async fn run(config: &AppConfig, text: &str) -> Result<()> {
    let shell = app::start(config).await?;
    let form = app::require_authorized(config, &shell).await?;

    let spinner = tui::create_spinner("Submitting...".to_string());
    let submitted = form.submit(text).await;
    spinner.finish_and_clear();

    match submitted? {
        Submission::Logged(_) => println!("{} {}", "Logged".green(), text),
        Submission::AlreadyInProgress | Submission::NotReady => {
            anyhow::bail!("Could not log activity right now, try again")
        }
    }

    println!("{}", form.render().render());
    Ok(())
}
