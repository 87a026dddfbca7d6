#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use bazi_relay::config::{AuthConfig, ComputeConfig, Config, LlmConfig};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

/// Config pointing the compute relay at a stub upstream.
pub fn relay_config(compute_base: &str) -> Config {
    Config {
        compute: ComputeConfig {
            api_base: Some(compute_base.to_string()),
            api_token: Some("compute-token".to_string()),
        },
        ..Config::default()
    }
}

/// Config pointing both the compute relay and the LLM at stub upstreams.
pub fn analyze_config(compute_base: &str, llm_base: &str) -> Config {
    Config {
        llm: LlmConfig {
            api_base: llm_base.to_string(),
            api_key: Some("llm-key".to_string()),
            ..LlmConfig::default()
        },
        ..relay_config(compute_base)
    }
}

/// Adds an auth gate (default mode and protected set) backed by a stub
/// identity provider.
pub fn gated(config: Config, auth_base: &str) -> Config {
    Config {
        auth: Some(AuthConfig {
            api_base: Some(auth_base.to_string()),
            secret_key: Some("auth-secret".to_string()),
            ..AuthConfig::default()
        }),
        ..config
    }
}

pub fn app(config: Config) -> Router {
    bazi_relay::server::router(Arc::new(config))
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    post_json_with(app, uri, body, &[]).await
}

/// POST a JSON body with extra request headers (authorization, cookies).
pub async fn post_json_with(
    app: Router,
    uri: &str,
    body: Value,
    headers: &[(&str, &str)],
) -> Response<Body> {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        request = request.header(*name, *value);
    }

    app.oneshot(request.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    get_with(app, uri, &[]).await
}

pub async fn get_with(app: Router, uri: &str, headers: &[(&str, &str)]) -> Response<Body> {
    let mut request = Request::builder().method("GET").uri(uri);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }

    app.oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
