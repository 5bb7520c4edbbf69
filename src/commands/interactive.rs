use activity_logger_core::config::AppConfig;
use activity_logger_core::{AuthState, DisplayMode, FormView, Submission};
use anyhow::Result;
use dialoguer::{Input, Select};
use owo_colors::OwoColorize;

use crate::app::{self, Form, Shell};
use crate::render::Render;
use crate::utils::tui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Log,
    Relog,
    ToggleMode,
    Refresh,
    Authorize,
    SignIn,
    SignOut,
    Quit,
}

impl Action {
    fn label(self, mode: DisplayMode) -> String {
        match self {
            Action::Log => "Log activity".to_string(),
            Action::Relog => "Pick a recent activity".to_string(),
            Action::ToggleMode => match mode {
                DisplayMode::All => "Show unique activities".to_string(),
                DisplayMode::Unique => "Show all activities".to_string(),
            },
            Action::Refresh => "Refresh".to_string(),
            Action::Authorize => "Authorize".to_string(),
            Action::SignIn => "Sign in".to_string(),
            Action::SignOut => "Sign out".to_string(),
            Action::Quit => "Quit".to_string(),
        }
    }
}

fn actions_for(state: &AuthState, form: Option<&Form>) -> Vec<Action> {
    let mut actions = Vec::new();

    if let Some(form) = form {
        actions.push(Action::Log);
        if !form.events_to_display().is_empty() {
            actions.push(Action::Relog);
        }
        actions.push(Action::ToggleMode);
        actions.push(Action::Refresh);
    }

    match state {
        AuthState::Unready => {}
        AuthState::SignedOut => actions.push(Action::SignIn),
        AuthState::SignedInInsufficientScope { .. } => {
            actions.push(Action::Authorize);
            actions.push(Action::SignOut);
        }
        AuthState::SignedInAuthorized { .. } => actions.push(Action::SignOut),
    }

    actions.push(Action::Quit);
    actions
}

pub async fn run(config: &AppConfig) -> Result<()> {
    let mut shell = app::start(config).await?;
    let mut form: Option<Form> = None;

    loop {
        shell.poll_changes();

        if !shell.should_mount_form() {
            form = None;
        } else if form.is_none() {
            match app::mount_form(config, &shell).await {
                Ok(mounted) => form = Some(mounted),
                Err(e) => print_error(&e),
            }
        }

        println!();
        super::print_shell(&shell);
        if let Some(form) = &form {
            println!("{}", form.render().render());
        }
        println!();

        let mode = form.as_ref().map(|f| f.mode()).unwrap_or_default();
        let actions = actions_for(&shell.state(), form.as_ref());
        let labels: Vec<String> = actions.iter().map(|a| a.label(mode)).collect();

        let selection = Select::new()
            .with_prompt("  What next?")
            .items(&labels)
            .default(0)
            .interact()?;

        let action = actions[selection];
        if action == Action::Quit {
            return Ok(());
        }

        if let Err(e) = perform(action, &mut shell, form.as_ref()).await {
            print_error(&e);
        }
    }
}

async fn perform(action: Action, shell: &mut Shell, form: Option<&Form>) -> Result<()> {
    match (action, form) {
        (Action::Log, Some(form)) => log(form).await,
        (Action::Relog, Some(form)) => relog(form),
        (Action::ToggleMode, Some(form)) => {
            form.toggle_mode();
            Ok(())
        }
        (Action::Refresh, Some(form)) => {
            let spinner = tui::create_spinner("Loading...".to_string());
            let loaded = form.load_recent_events().await;
            spinner.finish_and_clear();
            Ok(loaded?)
        }
        (Action::Authorize, _) => Ok(shell.authorize().await?),
        (Action::SignIn, _) => Ok(shell.sign_in().await?),
        (Action::SignOut, _) => Ok(shell.sign_out().await?),
        _ => Ok(()),
    }
}

/// Prompt for the activity text, starting from the current input.
async fn log(form: &Form) -> Result<()> {
    let text: String = Input::new()
        .with_prompt("  Activity")
        .with_initial_text(form.input())
        .allow_empty(true)
        .interact_text()?;
    form.set_input(text.clone());

    let spinner = tui::create_spinner("Submitting...".to_string());
    let submitted = form.submit_input().await;
    spinner.finish_and_clear();

    match submitted? {
        Submission::Logged(_) => println!("   {} {}", "Logged".green(), text),
        Submission::AlreadyInProgress => println!("   {}", "Still submitting...".dimmed()),
        Submission::NotReady => println!("   {}", "Calendar not ready yet".yellow()),
    }
    Ok(())
}

/// Pick a displayed entry and copy its text into the input for the next
/// "Log activity".
fn relog(form: &Form) -> Result<()> {
    let FormView::Ready { entries, .. } = form.render() else {
        return Ok(());
    };
    if entries.is_empty() {
        return Ok(());
    }

    let labels: Vec<String> = entries.iter().map(Render::render).collect();
    let selection = Select::new()
        .with_prompt("  Which one?")
        .items(&labels)
        .default(0)
        .interact()?;

    if let Some(text) = form.select_entry(selection) {
        println!("   {} {}", "Pre-filled:".dimmed(), text);
    }
    Ok(())
}

fn print_error(e: &anyhow::Error) {
    eprintln!("{} {:#}", "Error:".red(), e);
}
