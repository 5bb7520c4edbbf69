//! Google sign-in as an [`IdentityProvider`].

use activity_logger_core::provider::{IdentityProvider, User};
use activity_logger_core::{Error, Result};
use async_trait::async_trait;
use google_calendar::Client;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::app_config::GoogleAppConfig;
use crate::oauth;
use crate::session::Session;

fn identity_error(e: anyhow::Error) -> Error {
    Error::Identity(format!("{:#}", e))
}

pub struct GoogleIdentity {
    config: GoogleAppConfig,
    required_scopes: Vec<String>,
    session: Mutex<Option<Session>>,
    user: watch::Sender<User>,
}

impl GoogleIdentity {
    pub fn new(config: GoogleAppConfig, required_scopes: Vec<String>) -> Self {
        GoogleIdentity {
            config,
            required_scopes,
            session: Mutex::new(None),
            user: watch::channel(User::signed_out()).0,
        }
    }

    pub fn config(&self) -> &GoogleAppConfig {
        &self.config
    }

    fn publish(&self, session: Option<&Session>) {
        let user = match session {
            Some(session) => User {
                signed_in: true,
                email: session.email.clone(),
                granted_scopes: session.granted_scopes.clone(),
            },
            None => User::signed_out(),
        };

        self.user.send_if_modified(|current| {
            if *current == user {
                return false;
            }
            *current = user;
            true
        });
    }

    /// An API client with a valid access token.
    ///
    /// Refreshing re-reads the granted scopes, so access revoked elsewhere
    /// reaches listeners from here.
    pub async fn client(&self) -> anyhow::Result<Client> {
        let mut guard = self.session.lock().await;
        let session = guard
            .as_mut()
            .ok_or_else(|| anyhow::anyhow!("Not signed in to Google"))?;

        if session.is_expired() {
            session.refresh(&self.config).await?;
            let info = oauth::token_info(session.access_token()).await?;
            session.granted_scopes = info.scope;
            session.save(&self.config.session_path())?;
            self.publish(Some(&*session));
        }

        Ok(session.client(&self.config))
    }

    async fn consent(&self, scopes: &[String], login_hint: Option<&str>) -> anyhow::Result<()> {
        let session = oauth::authorize(&self.config, scopes, login_hint).await?;
        session.save(&self.config.session_path())?;

        info!(email = %session.email, "signed in to Google");
        self.publish(Some(&session));
        *self.session.lock().await = Some(session);
        Ok(())
    }

    async fn restore(&self) -> anyhow::Result<Option<Session>> {
        let path = self.config.session_path();
        let mut session = match Session::load(&path) {
            Ok(Some(session)) => session,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!(error = %format!("{:#}", e), "discarding unreadable Google session");
                Session::delete(&path)?;
                return Ok(None);
            }
        };

        if session.is_expired() {
            if let Err(e) = session.refresh(&self.config).await {
                warn!(error = %format!("{:#}", e), "stored Google session is no longer valid");
                Session::delete(&path)?;
                return Ok(None);
            }
            session.save(&path)?;
        }

        match oauth::token_info(session.access_token()).await {
            Ok(info) => {
                session.granted_scopes = info.scope;
                session.save(&path)?;
            }
            Err(e) => warn!(error = %format!("{:#}", e), "could not re-read granted scopes"),
        }

        Ok(Some(session))
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentity {
    async fn init(&self) -> Result<()> {
        let session = self.restore().await.map_err(identity_error)?;
        debug!(signed_in = session.is_some(), "Google identity ready");

        self.publish(session.as_ref());
        *self.session.lock().await = session;
        Ok(())
    }

    fn current_user(&self) -> User {
        self.user.borrow().clone()
    }

    fn listen(&self) -> watch::Receiver<User> {
        self.user.subscribe()
    }

    async fn sign_in(&self) -> Result<()> {
        self.consent(&self.required_scopes, None)
            .await
            .map_err(identity_error)
    }

    async fn grant(&self, scopes: &[String]) -> Result<()> {
        let hint = self
            .session
            .lock()
            .await
            .as_ref()
            .map(|s| s.email.clone());

        self.consent(scopes, hint.as_deref())
            .await
            .map_err(identity_error)
    }

    async fn sign_out(&self) -> Result<()> {
        if let Some(session) = self.session.lock().await.take() {
            oauth::revoke(session.refresh_token()).await;
            info!(email = %session.email, "signed out of Google");
        }

        Session::delete(&self.config.session_path()).map_err(identity_error)?;
        self.publish(None);
        Ok(())
    }
}
