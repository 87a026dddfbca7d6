mod handlers;
mod types;

pub use handlers::{ANALYZE_PATH, AppState, COMPUTE_PATH};
pub use types::{BirthQuery, Gender, SessionResponse};

use crate::{
    Result, auth,
    auth::SessionVerifier,
    config::Config,
    upstream::{ComputeClient, LlmClient},
};
use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Builds the service router. One HTTP client is shared by all three
/// upstreams, and every route runs behind the session gate.
pub fn router(config: Arc<Config>) -> Router {
    let client = reqwest::Client::new();
    let state = AppState {
        compute: ComputeClient::new(config.compute.clone(), client.clone()),
        llm: LlmClient::new(config.llm.clone(), client.clone()),
        verifier: SessionVerifier::new(config.auth.clone(), client),
        config,
    };

    Router::new()
        .route("/", get(handlers::form_page))
        .route("/generate", get(handlers::form_page))
        .route("/api/session", get(handlers::session))
        .route(COMPUTE_PATH, post(handlers::compute))
        .route(ANALYZE_PATH, post(handlers::analyze))
        .layer(middleware::from_fn_with_state(state.clone(), auth::gate))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run(config: Config) -> Result<()> {
    // Misconfigured auth still boots: sessions then never verify, so the
    // gate treats every caller as anonymous.
    if let Some(auth) = config.auth.as_ref() {
        if auth.api_base.is_none() || auth.secret_key.is_none() {
            warn!("Auth gate enabled without AUTH_API_BASE/AUTH_SECRET_KEY; all sessions resolve anonymous");
        }
    }

    let config = Arc::new(config);
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let app = router(config);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
