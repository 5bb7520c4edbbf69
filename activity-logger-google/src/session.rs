//! The signed-in user's Google session (tokens plus who they belong to).

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use google_calendar::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::app_config::GoogleAppConfig;

/// Refresh a little before the token actually expires.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Session {
    pub email: String,
    /// Space-delimited scopes granted to the current access token.
    #[serde(default)]
    pub granted_scopes: String,
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        email: String,
        granted_scopes: String,
        access_token: String,
        refresh_token: String,
        expires_in: i64,
    ) -> Self {
        Session {
            email,
            granted_scopes,
            access_token,
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(expires_in),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn client(&self, config: &GoogleAppConfig) -> Client {
        Client::new(
            config.client_id.clone(),
            config.client_secret.clone(),
            config.redirect_uri(),
            self.access_token.clone(),
            self.refresh_token.clone(),
        )
    }

    /// Load the stored session, if there is one.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path).with_context(|| {
            format!("Failed to read Google OAuth session from {}", path.display())
        })?;

        let session: Session = toml::from_str(&contents).with_context(|| {
            format!("Failed to parse Google OAuth session from {}", path.display())
        })?;

        Ok(Some(session))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize session")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write session to {}", path.display()))?;

        // Owner-only, the file holds OAuth tokens
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
        }

        Ok(())
    }

    pub fn delete(path: &Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_file(path)
                .with_context(|| format!("Failed to remove session at {}", path.display()))?;
        }
        Ok(())
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Granted scopes are not touched here; callers re-read them from
    /// tokeninfo afterwards.
    pub async fn refresh(&mut self, config: &GoogleAppConfig) -> Result<()> {
        debug!(email = %self.email, "refreshing access token");

        let tokens = self
            .client(config)
            .refresh_access_token()
            .await
            .context("Failed to refresh token")?;

        self.access_token = tokens.access_token;
        self.expires_at = Utc::now() + Duration::seconds(tokens.expires_in);

        // Google typically doesn't return a new refresh_token on refresh
        if !tokens.refresh_token.is_empty() {
            self.refresh_token = tokens.refresh_token;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_in: i64) -> Session {
        Session::new(
            "me@example.com".into(),
            "openid email".into(),
            "access".into(),
            "refresh".into(),
            expires_in,
        )
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.toml");
        let original = session(3600);

        original.save(&path).unwrap();
        assert_eq!(Session::load(&path).unwrap(), Some(original));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn absent_session_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Session::load(&dir.path().join("session.toml")).unwrap(), None);
    }

    #[test]
    fn delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        session(3600).save(&path).unwrap();

        Session::delete(&path).unwrap();
        Session::delete(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn expiry_includes_margin() {
        assert!(!session(3600).is_expired());
        assert!(session(30).is_expired());
        assert!(session(-10).is_expired());
    }
}
