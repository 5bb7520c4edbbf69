//! OAuth client configuration for the Google backend.
//!
//! User-provided credentials are stored at:
//!   ~/.config/activity-logger/google/app_config.toml

use std::path::{Path, PathBuf};

use activity_logger_core::config::config_dir;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const DEFAULT_REDIRECT_PORT: u16 = 8085;

fn default_redirect_port() -> u16 {
    DEFAULT_REDIRECT_PORT
}

/// Google OAuth client credentials (user-provided).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleAppConfig {
    pub client_id: String,
    pub client_secret: String,

    /// Loopback port the OAuth redirect lands on.
    #[serde(default = "default_redirect_port")]
    pub redirect_port: u16,

    /// Directory the session is kept in, next to the credentials.
    #[serde(skip)]
    pub dir: PathBuf,
}

pub fn base_dir() -> Result<PathBuf> {
    Ok(config_dir()?.join("google"))
}

impl GoogleAppConfig {
    pub fn load() -> Result<Self> {
        Self::load_from(&base_dir()?)
    }

    pub fn load_from(dir: &Path) -> Result<Self> {
        let path = dir.join("app_config.toml");

        if !path.exists() {
            anyhow::bail!(
                "Google credentials not found.\n\n\
                Create {} with:\n\n\
                client_id = \"your-client-id.apps.googleusercontent.com\"\n\
                client_secret = \"your-client-secret\"\n\n\
                See https://console.cloud.google.com/apis/credentials for setup.\n\
                Choose \"Desktop app\" as the application type and enable the\n\
                Google Calendar API for the project.",
                path.display()
            );
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read credentials from {}", path.display()))?;

        let mut config: GoogleAppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse credentials from {}", path.display()))?;
        config.dir = dir.to_path_buf();

        Ok(config)
    }

    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/callback", self.redirect_port)
    }

    pub fn redirect_address(&self) -> String {
        format!("127.0.0.1:{}", self.redirect_port)
    }

    pub fn session_path(&self) -> PathBuf {
        self.dir.join("session.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credentials_explain_setup() {
        let dir = tempfile::tempdir().unwrap();
        let err = GoogleAppConfig::load_from(dir.path()).unwrap_err();
        assert!(err.to_string().contains("client_id"));
    }

    #[test]
    fn loads_with_default_port() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("app_config.toml"),
            "client_id = \"id.apps.googleusercontent.com\"\nclient_secret = \"shh\"\n",
        )
        .unwrap();

        let config = GoogleAppConfig::load_from(dir.path()).unwrap();
        assert_eq!(config.client_id, "id.apps.googleusercontent.com");
        assert_eq!(config.redirect_uri(), "http://localhost:8085/callback");
        assert_eq!(config.redirect_address(), "127.0.0.1:8085");
        assert_eq!(config.session_path(), dir.path().join("session.toml"));
    }
}
