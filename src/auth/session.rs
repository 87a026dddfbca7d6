use crate::{Error, Result, config::AuthConfig};
use axum::http::{HeaderMap, header};
use serde_json::{Value, json};
use tracing::{debug, warn};

/// The caller's identity for one request, attached as a request extension
/// by the gate middleware.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession {
    pub user_id: Option<String>,
}

impl CurrentSession {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session counts as signed in only when the identity provider
    /// confirmed the token and named a subject.
    pub fn signed_in(&self) -> bool {
        self.user_id.is_some()
    }
}

/// Verifies session tokens against the identity provider over HTTP.
///
/// The provider is opaque to the rest of the service: handlers only ever
/// see the [`CurrentSession`] this produces.
#[derive(Clone)]
pub struct SessionVerifier {
    config: Option<AuthConfig>,
    client: reqwest::Client,
}

impl SessionVerifier {
    const VERIFY_PATH: &'static str = "/v1/sessions/verify";

    pub fn new(config: Option<AuthConfig>, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// Resolves the request's session. Never fails: a missing token skips
    /// the provider call entirely, and verification errors degrade to an
    /// anonymous session so the gate can decide what that means.
    pub async fn resolve(&self, headers: &HeaderMap) -> CurrentSession {
        let Some(auth) = self.config.as_ref() else {
            return CurrentSession::anonymous();
        };
        let Some(token) = session_token(headers, &auth.session_cookie) else {
            return CurrentSession::anonymous();
        };

        match self.verify(&token).await {
            Ok(session) => session,
            Err(error) => {
                warn!("Session verification failed: {}", error);
                CurrentSession::anonymous()
            }
        }
    }

    async fn verify(&self, token: &str) -> Result<CurrentSession> {
        let auth = self
            .config
            .as_ref()
            .ok_or_else(|| Error::config("session verification without auth configuration"))?;
        let api_base = auth
            .api_base
            .as_deref()
            .ok_or(Error::MissingConfig(vec!["AUTH_API_BASE"]))?;
        let secret_key = auth
            .secret_key
            .as_deref()
            .ok_or(Error::MissingConfig(vec!["AUTH_SECRET_KEY"]))?;

        let url = format!("{}{}", api_base.trim_end_matches('/'), Self::VERIFY_PATH);
        let response = self
            .client
            .post(&url)
            .bearer_auth(secret_key)
            .json(&json!({ "token": token }))
            .send()
            .await?;

        if !response.status().is_success() {
            debug!("Identity provider rejected session token ({})", response.status());
            return Ok(CurrentSession::anonymous());
        }

        let claims: Value = response.json().await?;
        let user_id = claims
            .get("user_id")
            .or_else(|| claims.get("sub"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(CurrentSession { user_id })
    }
}

/// Finds the session token: an `Authorization: Bearer` header wins, then
/// the configured session cookie.
fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}
