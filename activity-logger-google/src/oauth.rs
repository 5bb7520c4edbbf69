//! Installed-app OAuth flow against Google.
//!
//! The consent page is opened in the browser and Google redirects back to
//! a one-shot loopback listener carrying the authorization code.

use anyhow::{Context, Result};
use google_calendar::Client;
use google_calendar::types::{CalendarListEntry, MinAccessRole};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tracing::{debug, warn};
use url::Url;

use crate::app_config::GoogleAppConfig;
use crate::session::Session;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const REVOKE_URL: &str = "https://oauth2.googleapis.com/revoke";

/// Requested alongside the calendar scopes so tokeninfo reports the email.
pub const IDENTITY_SCOPES: &[&str] = &["openid", "email"];

/// Build the consent URL for `scopes`.
///
/// Previously granted scopes are kept (`include_granted_scopes`), so the
/// same flow serves both first sign-in and re-authorization.
pub fn consent_url(
    config: &GoogleAppConfig,
    scopes: &[String],
    state: &str,
    login_hint: Option<&str>,
) -> Result<String> {
    let scope = IDENTITY_SCOPES
        .iter()
        .copied()
        .chain(scopes.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ");
    let redirect_uri = config.redirect_uri();

    let mut params = vec![
        ("client_id", config.client_id.as_str()),
        ("redirect_uri", redirect_uri.as_str()),
        ("response_type", "code"),
        ("scope", scope.as_str()),
        ("access_type", "offline"),
        ("prompt", "consent"),
        ("include_granted_scopes", "true"),
        ("state", state),
    ];
    if let Some(hint) = login_hint {
        params.push(("login_hint", hint));
    }

    Ok(Url::parse_with_params(AUTH_URL, &params)?.to_string())
}

/// Run the consent flow and return a fresh session.
pub async fn authorize(
    config: &GoogleAppConfig,
    scopes: &[String],
    login_hint: Option<&str>,
) -> Result<Session> {
    let state = uuid::Uuid::new_v4().to_string();
    let auth_url = consent_url(config, scopes, &state, login_hint)?;

    // Bind before opening the browser so a fast redirect isn't missed
    let listener = TcpListener::bind(config.redirect_address())
        .await
        .context("Failed to bind OAuth callback listener")?;

    eprintln!("\nOpen this URL in your browser to authenticate:\n");
    eprintln!("{}\n", auth_url);

    if open::that(&auth_url).is_err() {
        eprintln!("(Could not open browser automatically, please copy the URL above)");
    }

    let callback = wait_for_callback(&listener).await?;
    if callback.state != state {
        anyhow::bail!("OAuth state mismatch, refusing the callback");
    }

    debug!("received authorization code, exchanging for tokens");

    let mut client = Client::new(
        config.client_id.clone(),
        config.client_secret.clone(),
        config.redirect_uri(),
        String::new(),
        String::new(),
    );

    let tokens = client
        .get_access_token(&callback.code, &callback.state)
        .await
        .context("Failed to exchange authorization code for tokens")?;

    let info = token_info(&tokens.access_token).await?;

    let mut session = Session::new(
        info.email,
        info.scope,
        tokens.access_token,
        tokens.refresh_token,
        tokens.expires_in,
    );

    if session.email.is_empty() {
        session.email = primary_calendar_email(&session.client(config)).await?;
    }

    Ok(session)
}

/// What Google reports about an access token.
#[derive(Debug, Default, Deserialize)]
pub struct TokenInfo {
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub email: String,
}

pub async fn token_info(access_token: &str) -> Result<TokenInfo> {
    let response = reqwest::Client::new()
        .get(TOKENINFO_URL)
        .query(&[("access_token", access_token)])
        .send()
        .await
        .context("Failed to send tokeninfo request")?;

    if !response.status().is_success() {
        let error_text = response.text().await.unwrap_or_default();
        anyhow::bail!("Google rejected the access token: {}", error_text);
    }

    response
        .json()
        .await
        .context("Failed to parse tokeninfo response")
}

/// Revoke `token` (and with it the whole grant). Best effort.
pub async fn revoke(token: &str) {
    let result = reqwest::Client::new()
        .post(REVOKE_URL)
        .form(&[("token", token)])
        .send()
        .await;

    match result {
        Ok(response) if response.status().is_success() => debug!("revoked Google grant"),
        Ok(response) => warn!(status = %response.status(), "Google refused to revoke the token"),
        Err(e) => warn!(error = %e, "failed to reach Google to revoke the token"),
    }
}

/// The user's email, taken from their primary calendar.
async fn primary_calendar_email(client: &Client) -> Result<String> {
    let calendars = client
        .calendar_list()
        .list_all(MinAccessRole::default(), false, false)
        .await
        .context("Failed to fetch calendars")?
        .body;

    primary_email(calendars).ok_or_else(|| anyhow::anyhow!("No primary calendar found"))
}

/// The primary calendar's id is the account email; its summary can be renamed.
fn primary_email(calendars: Vec<CalendarListEntry>) -> Option<String> {
    calendars
        .into_iter()
        .find(|cal| cal.primary)
        .map(|cal| cal.id)
}

#[derive(Debug, PartialEq)]
struct Callback {
    code: String,
    state: String,
}

/// Pull `code` and `state` out of the redirect's request line.
fn parse_callback(request_line: &str) -> Result<Callback> {
    let url_part = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("Invalid HTTP request"))?;

    let url = Url::parse(&format!("http://localhost{}", url_part))?;
    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.to_string())
    };

    if let Some(error) = param("error") {
        anyhow::bail!("Authorization was not granted: {}", error);
    }

    let code = param("code").ok_or_else(|| anyhow::anyhow!("No code in callback"))?;
    let state = param("state").ok_or_else(|| anyhow::anyhow!("No state in callback"))?;

    Ok(Callback { code, state })
}

async fn wait_for_callback(listener: &TcpListener) -> Result<Callback> {
    let (stream, _) = listener
        .accept()
        .await
        .context("Failed to accept OAuth callback")?;

    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .await
        .context("Failed to read OAuth callback request line")?;

    let callback = parse_callback(&request_line);

    let body = match &callback {
        Ok(_) => "<h1>Signed in!</h1><p>You can close this window and return to the terminal.</p>",
        Err(_) => "<h1>Sign-in failed</h1><p>Return to the terminal for details.</p>",
    };
    let response = format!(
        "HTTP/1.1 200 OK\r\n\
        Content-Type: text/html\r\n\
        Connection: close\r\n\
        \r\n\
        <html><body>{body}</body></html>"
    );

    let mut stream = reader.into_inner();
    stream
        .write_all(response.as_bytes())
        .await
        .context("Failed to write OAuth callback response")?;
    stream.flush().await?;

    callback
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config() -> GoogleAppConfig {
        GoogleAppConfig {
            client_id: "id.apps.googleusercontent.com".into(),
            client_secret: "secret".into(),
            redirect_port: 9000,
            dir: PathBuf::new(),
        }
    }

    #[test]
    fn consent_url_carries_scopes_and_state() {
        let scopes = vec!["https://www.googleapis.com/auth/calendar.app.created".to_string()];
        let url = consent_url(&config(), &scopes, "abc", Some("me@example.com")).unwrap();
        let url = Url::parse(&url).unwrap();
        let get = |name: &str| {
            url.query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.to_string())
        };

        assert_eq!(
            get("scope").as_deref(),
            Some("openid email https://www.googleapis.com/auth/calendar.app.created")
        );
        assert_eq!(get("state").as_deref(), Some("abc"));
        assert_eq!(get("redirect_uri").as_deref(), Some("http://localhost:9000/callback"));
        assert_eq!(get("include_granted_scopes").as_deref(), Some("true"));
        assert_eq!(get("access_type").as_deref(), Some("offline"));
        assert_eq!(get("login_hint").as_deref(), Some("me@example.com"));
    }

    #[test]
    fn consent_url_without_hint() {
        let url = consent_url(&config(), &[], "s", None).unwrap();
        assert!(!url.contains("login_hint"));
    }

    #[test]
    fn parses_callback() {
        let line = "GET /callback?state=xyz&code=4%2F0Ab HTTP/1.1\r\n";
        assert_eq!(
            parse_callback(line).unwrap(),
            Callback {
                code: "4/0Ab".into(),
                state: "xyz".into()
            }
        );
    }

    #[test]
    fn denied_consent_is_an_error() {
        let err =
            parse_callback("GET /callback?error=access_denied&state=xyz HTTP/1.1").unwrap_err();
        assert!(err.to_string().contains("access_denied"));
    }

    #[test]
    fn malformed_request_is_an_error() {
        assert!(parse_callback("garbage").is_err());
        assert!(parse_callback("GET /callback?state=only HTTP/1.1").is_err());
    }

    #[test]
    fn tokeninfo_fields_default() {
        let info: TokenInfo = serde_json::from_str(r#"{"aud":"x"}"#).unwrap();
        assert!(info.scope.is_empty() && info.email.is_empty());
    }

    #[test]
    fn primary_email_is_the_primary_calendar_id() {
        let calendars: Vec<CalendarListEntry> = serde_json::from_str(
            r#"[
                {"id": "team@group.calendar.google.com", "summary": "Team"},
                {"id": "me@example.com", "summary": "Renamed", "primary": true}
            ]"#,
        )
        .unwrap();

        assert_eq!(primary_email(calendars).as_deref(), Some("me@example.com"));
        assert_eq!(primary_email(Vec::new()), None);
    }
}
