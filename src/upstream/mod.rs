mod compute;
mod llm;

pub use compute::ComputeClient;
pub use llm::{LlmClient, extract_text};

use axum::{
    body::Body,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// What an upstream answered, captured without interpretation so the relay
/// can republish it verbatim: same status, same content type, same bytes.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl UpstreamReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl IntoResponse for UpstreamReply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::BAD_GATEWAY);
        let content_type = self
            .content_type
            .unwrap_or_else(|| "text/plain".to_string());

        match Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(self.body))
        {
            Ok(response) => response,
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to rebuild upstream reply: {}", e),
            )
                .into_response(),
        }
    }
}
