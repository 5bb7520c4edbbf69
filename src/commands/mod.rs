pub mod auth;
pub mod authorize;
pub mod interactive;
pub mod log;
pub mod recent;
pub mod sign_out;
pub mod status;

use activity_logger_core::{scope, IdentityProvider};
use activity_logger_core::shell::Affordance;

use crate::app::Shell;
use crate::render::Render;

/// Title bar followed by any scopes the user still has to grant.
pub fn print_shell(shell: &Shell) {
    let view = shell.render();
    println!("{}", view.render());

    if view.actions.contains(&Affordance::InsufficientPermissions) {
        let user = shell.provider().current_user();
        for missing in scope::missing(shell.required_scopes(), &user.granted_scopes) {
            println!("   missing: {}", missing);
        }
    }
}
