use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;

use crate::{
    Error, Result,
    config::{AuthConfig, GateMode},
    server::AppState,
};

use super::CurrentSession;

impl AuthConfig {
    /// Prefixes guarded when `protected` is left empty: the analysis
    /// endpoint when gating endpoints, the form page when gating routes.
    fn default_protected(&self) -> &'static [&'static str] {
        match self.mode {
            GateMode::ProtectRoutes => &["/generate"],
            GateMode::ProtectEndpoints => &["/api/analyze"],
        }
    }

    pub fn is_protected(&self, path: &str) -> bool {
        if self.protected.is_empty() {
            self.default_protected()
                .iter()
                .any(|prefix| path.starts_with(prefix))
        } else {
            self.protected.iter().any(|prefix| path.starts_with(prefix))
        }
    }

    pub fn sign_in_redirect(&self, path: &str) -> String {
        format!("{}?redirect_url={}", self.sign_in_url, path)
    }
}

/// Middleware that resolves the caller's session exactly once per request
/// and attaches it as an extension. In `protect_routes` mode it also
/// redirects anonymous requests for protected pages to the sign-in URL
/// before any handler runs.
pub async fn gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let session = state.verifier.resolve(request.headers()).await;

    if let Some(auth) = state.config.auth.as_ref() {
        let path = request.uri().path();
        if auth.mode == GateMode::ProtectRoutes && auth.is_protected(path) && !session.signed_in()
        {
            let target = auth.sign_in_redirect(path);
            debug!("Redirecting anonymous request for {} to {}", path, target);
            return Redirect::temporary(&target).into_response();
        }
    }

    request.extensions_mut().insert(session);
    next.run(request).await
}

/// Endpoint-side guard for `protect_endpoints` mode. Handlers call this
/// after parsing the request body, so malformed input reports as 400 even
/// to anonymous callers.
pub fn require_session(
    auth: Option<&AuthConfig>,
    path: &str,
    session: &CurrentSession,
) -> Result<()> {
    let Some(auth) = auth else {
        return Ok(());
    };

    if auth.mode == GateMode::ProtectEndpoints && auth.is_protected(path) && !session.signed_in() {
        return Err(Error::SignInRequired {
            sign_in_url: auth.sign_in_redirect(path),
        });
    }

    Ok(())
}
