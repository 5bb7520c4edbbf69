//! Terminal rendering for the shell and form views.

use activity_logger_core::form::{EntryView, FormView};
use activity_logger_core::shell::{Affordance, ShellView};
use activity_logger_core::DisplayMode;
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Affordance {
    fn render(&self) -> String {
        match self {
            Affordance::Loading => "Loading...".dimmed().to_string(),
            Affordance::UserEmail(email) => email.to_string(),
            Affordance::InsufficientPermissions => "Insufficient permissions".yellow().to_string(),
            Affordance::Authorize => "[Authorize]".green().bold().to_string(),
            Affordance::SignIn => "[Sign In]".green().bold().to_string(),
            Affordance::SignOut => "[Sign Out]".bold().to_string(),
        }
    }
}

impl Render for ShellView {
    fn render(&self) -> String {
        let actions: Vec<String> = self.actions.iter().map(Render::render).collect();
        format!("{}   {}", self.title.bold().underline(), actions.join("  "))
    }
}

impl Render for EntryView {
    fn render(&self) -> String {
        format!("{}  {}", self.when.dimmed(), self.summary)
    }
}

impl Render for DisplayMode {
    fn render(&self) -> String {
        let (all, unique) = match self {
            DisplayMode::All => ("All".bold().to_string(), "Unique".dimmed().to_string()),
            DisplayMode::Unique => ("All".dimmed().to_string(), "Unique".bold().to_string()),
        };
        format!("{} | {}", all, unique)
    }
}

impl Render for FormView {
    fn render(&self) -> String {
        match self {
            FormView::Loading => "   Loading...".dimmed().to_string(),
            FormView::Ready {
                calendar_id,
                input,
                submitting,
                mode,
                entries,
            } => {
                let mut lines = vec![format!(
                    "   {} {}",
                    "Using calendar:".dimmed(),
                    calendar_id
                )];

                if *submitting {
                    lines.push(format!("   {}", "Submitting...".dimmed()));
                } else if !input.is_empty() {
                    lines.push(format!("   {} {}", "Activity:".dimmed(), input));
                }

                lines.push(String::new());
                lines.push(format!("   {}", mode.render()));

                if entries.is_empty() {
                    lines.push(format!("   {}", "No recent activities".dimmed()));
                } else {
                    lines.extend(entries.iter().map(|e| format!("   {}", e.render())));
                }

                lines.join("\n")
            }
        }
    }
}
