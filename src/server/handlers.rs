use super::types::SessionResponse;
use crate::{
    Error, Result,
    auth::{CurrentSession, SessionVerifier, require_session},
    config::Config,
    upstream::{ComputeClient, LlmClient, extract_text},
};
use axum::{
    Extension,
    extract::State,
    response::{Html, IntoResponse, Json, Response},
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

pub const COMPUTE_PATH: &str = "/api/bazi";
pub const ANALYZE_PATH: &str = "/api/analyze";

static FORM_PAGE: &str = include_str!("../../assets/form.html");

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub compute: ComputeClient,
    pub llm: LlmClient,
    pub verifier: SessionVerifier,
}

/// Serves the birth-data form. The page is self-contained; everything
/// dynamic goes through the JSON endpoints.
pub async fn form_page() -> Html<&'static str> {
    Html(FORM_PAGE)
}

/// Reports whether the caller is signed in, for the form's account widget.
pub async fn session(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> Json<SessionResponse> {
    Json(SessionResponse {
        signed_in: current.signed_in(),
        user_id: current.user_id,
        sign_in_url: state
            .config
            .auth
            .as_ref()
            .map(|auth| auth.sign_in_url.clone()),
    })
}

/// Transparent relay to the compute backend: the caller's JSON goes up
/// unchanged, the backend's status, content-type and body come back
/// unchanged, success or not.
pub async fn compute(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    Json(body): Json<Value>,
) -> Result<Response> {
    require_session(state.config.auth.as_ref(), COMPUTE_PATH, &current)?;

    let missing = state.config.compute.missing();
    if !missing.is_empty() {
        return Err(Error::MissingConfig(missing));
    }

    info!("Relaying compute request");

    let reply = match state.compute.forward(&body).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("Compute relay failed: {}", e);
            return Err(e);
        }
    };
    if !reply.is_success() {
        warn!("Compute upstream answered {}", reply.status);
    }

    Ok(reply.into_response())
}

/// Compound endpoint: run the compute call, feed its result to the LLM,
/// and answer with the compute fields plus an `analysis` string.
///
/// A failed compute call is relayed with the upstream's own status and the
/// LLM is never contacted; a failed LLM call is a 500 carrying the
/// provider's payload, never a partial analysis.
pub async fn analyze(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    Json(body): Json<Value>,
) -> Result<Response> {
    require_session(state.config.auth.as_ref(), ANALYZE_PATH, &current)?;

    let mut missing = state.config.compute.missing();
    missing.extend(state.config.llm.missing());
    if !missing.is_empty() {
        return Err(Error::MissingConfig(missing));
    }

    info!("Running compute and analysis");

    let reply = match state.compute.forward(&body).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("Compute call failed: {}", e);
            return Err(e);
        }
    };
    if !reply.is_success() {
        warn!("Compute upstream answered {}; relaying its reply", reply.status);
        return Err(Error::ComputeUpstream(reply));
    }

    let bazi: Value = serde_json::from_slice(&reply.body).map_err(Error::ComputeDecode)?;

    let llm_response = match state.llm.interpret(&bazi).await {
        Ok(response) => response,
        Err(e) => {
            error!("Analysis call failed: {}", e);
            return Err(e);
        }
    };
    let analysis = extract_text(&llm_response);
    if analysis.is_empty() {
        warn!("LLM response contained no extractable text");
    }

    // The compute result's own top-level fields stay at the top level of
    // the answer; a non-object result is nested under "bazi" instead.
    let mut fields = match bazi {
        Value::Object(fields) => fields,
        other => {
            let mut fields = Map::new();
            fields.insert("bazi".to_string(), other);
            fields
        }
    };
    fields.insert("analysis".to_string(), Value::String(analysis));
    if state.config.llm.include_raw {
        fields.insert("raw_llm".to_string(), llm_response);
    }

    Ok(Json(Value::Object(fields)).into_response())
}
