//! The auth shell: sign-in state and the gate in front of the form.
//!
//! The shell follows the identity provider through a small state machine:
//!
//! ```text
//! Unready ─init─▶ SignedOut ◀──────sign_out────── SignedIn*
//!                    │                               ▲
//!                    └──────────sign_in──────────────┘
//! ```
//!
//! `SignedIn*` is split on whether every required scope was granted. User
//! change notifications can move between the two substates on their own,
//! e.g. when access is revoked elsewhere.

use tokio::sync::watch;
use tracing::{debug, info};

use crate::constants::APP_TITLE;
use crate::error::Result;
use crate::provider::{IdentityProvider, User};
use crate::scope;

/// Sign-in status as seen by the shell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub ready: bool,
    pub signed_in: bool,
    /// Non-empty only while signed in.
    pub user_email: String,
    pub granted_scopes_satisfied: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unready,
    SignedOut,
    SignedInInsufficientScope { email: String },
    SignedInAuthorized { email: String },
}

impl Session {
    pub fn state(&self) -> AuthState {
        if !self.ready {
            return AuthState::Unready;
        }
        if !self.signed_in {
            return AuthState::SignedOut;
        }
        let email = self.user_email.clone();
        if self.granted_scopes_satisfied {
            AuthState::SignedInAuthorized { email }
        } else {
            AuthState::SignedInInsufficientScope { email }
        }
    }
}

/// One element of the shell's action bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Affordance {
    Loading,
    UserEmail(String),
    InsufficientPermissions,
    Authorize,
    SignIn,
    SignOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellView {
    pub title: &'static str,
    pub actions: Vec<Affordance>,
    pub show_form: bool,
}

pub struct AuthShell<P> {
    provider: P,
    required_scopes: Vec<String>,
    session: Session,
    changes: Option<watch::Receiver<User>>,
}

impl<P: IdentityProvider> AuthShell<P> {
    pub fn new(provider: P, required_scopes: Vec<String>) -> Self {
        AuthShell {
            provider,
            required_scopes,
            session: Session::default(),
            changes: None,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> AuthState {
        self.session.state()
    }

    pub fn required_scopes(&self) -> &[String] {
        &self.required_scopes
    }

    /// Initialize the provider and start following its user changes.
    ///
    /// If initialization fails the shell stays `Unready`.
    pub async fn mount(&mut self) -> Result<()> {
        self.provider.init().await?;

        self.session.ready = true;

        let mut changes = self.provider.listen();
        changes.mark_unchanged();
        self.changes = Some(changes);

        self.update_auth_status(&self.provider.current_user());
        Ok(())
    }

    /// Stop following the provider and forget the session.
    pub fn unmount(&mut self) {
        self.changes = None;
        self.session = Session::default();
    }

    /// Apply any user changes the provider published since the last call.
    ///
    /// Returns whether the session changed.
    pub fn poll_changes(&mut self) -> bool {
        let Some(changes) = self.changes.as_mut() else {
            return false;
        };

        match changes.has_changed() {
            Ok(true) => {
                let user = changes.borrow_and_update().clone();
                let before = self.session.clone();
                self.update_auth_status(&user);
                before != self.session
            }
            _ => false,
        }
    }

    /// Recompute the session from a user snapshot.
    pub fn update_auth_status(&mut self, user: &User) {
        let before = self.session.state();

        self.session.signed_in = user.signed_in;
        if user.signed_in {
            self.session.user_email = user.email.clone();
            self.session.granted_scopes_satisfied =
                scope::is_satisfied(&self.required_scopes, &user.granted_scopes);
        } else {
            self.session.user_email.clear();
            self.session.granted_scopes_satisfied = false;
        }

        let after = self.session.state();
        if before != after {
            info!(?before, ?after, "auth state changed");
        }
    }

    pub async fn sign_in(&mut self) -> Result<()> {
        debug!("signing in");
        self.provider.sign_in().await?;
        self.refresh_from_provider();
        Ok(())
    }

    /// Re-consent with the required scopes without signing out.
    pub async fn authorize(&mut self) -> Result<()> {
        debug!(scopes = ?self.required_scopes, "requesting additional scopes");
        self.provider.grant(&self.required_scopes).await?;
        self.refresh_from_provider();
        Ok(())
    }

    pub async fn sign_out(&mut self) -> Result<()> {
        debug!("signing out");
        self.provider.sign_out().await?;
        self.refresh_from_provider();
        Ok(())
    }

    fn refresh_from_provider(&mut self) {
        if let Some(changes) = self.changes.as_mut() {
            changes.mark_unchanged();
        }
        let user = self.provider.current_user();
        self.update_auth_status(&user);
    }

    pub fn should_mount_form(&self) -> bool {
        matches!(self.state(), AuthState::SignedInAuthorized { .. })
    }

    pub fn render(&self) -> ShellView {
        ShellView {
            title: APP_TITLE,
            actions: actions_for(&self.state()),
            show_form: self.should_mount_form(),
        }
    }
}

fn actions_for(state: &AuthState) -> Vec<Affordance> {
    match state {
        AuthState::Unready => vec![Affordance::Loading],
        AuthState::SignedOut => vec![Affordance::SignIn],
        AuthState::SignedInInsufficientScope { email } => vec![
            Affordance::UserEmail(email.clone()),
            Affordance::InsufficientPermissions,
            Affordance::Authorize,
            Affordance::SignOut,
        ],
        AuthState::SignedInAuthorized { email } => {
            vec![Affordance::UserEmail(email.clone()), Affordance::SignOut]
        }
    }
}
