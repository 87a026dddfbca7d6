use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::upstream::UpstreamReply;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("missing configuration: {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),

    #[error("compute upstream answered {}", .0.status)]
    ComputeUpstream(UpstreamReply),

    #[error("compute response was not valid JSON: {0}")]
    ComputeDecode(#[source] serde_json::Error),

    #[error("llm upstream answered {status}")]
    LlmUpstream { status: u16, detail: serde_json::Value },

    #[error("llm response was not valid JSON: {0}")]
    LlmDecode(#[source] serde_json::Error),

    #[error("sign-in required")]
    SignInRequired { sign_in_url: String },

    #[error("upstream request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] axum::http::Error),

    #[error("address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Maps the error taxonomy to HTTP in one place. Compute upstream errors are
/// relayed verbatim (the caller needs the third party's exact diagnostic);
/// everything else becomes a JSON error body.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::MissingConfig(missing) => {
                let message = format!("missing configuration: {}", missing.join(", "));
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": message, "missing": missing })),
                )
                    .into_response()
            }
            Error::ComputeUpstream(reply) => reply.into_response(),
            Error::LlmUpstream { status, detail } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "llm request failed",
                    "status": status,
                    "detail": detail,
                })),
            )
                .into_response(),
            Error::SignInRequired { sign_in_url } => (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "sign-in required",
                    "signInUrl": sign_in_url,
                })),
            )
                .into_response(),
            Error::Upstream(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "upstream request failed",
                    "detail": e.to_string(),
                })),
            )
                .into_response(),
            Error::ComputeDecode(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "compute response was not valid JSON",
                    "detail": e.to_string(),
                })),
            )
                .into_response(),
            Error::LlmDecode(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "llm response was not valid JSON",
                    "detail": e.to_string(),
                })),
            )
                .into_response(),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": other.to_string() })),
            )
                .into_response(),
        }
    }
}
