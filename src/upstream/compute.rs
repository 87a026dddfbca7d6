use super::UpstreamReply;
use crate::{Error, Result, config::ComputeConfig};
use serde_json::Value;
use tracing::debug;

/// Forwards birth queries to the external BaZi compute backend.
///
/// The backend owns validation, calendar conversion and the result shape;
/// this client only moves JSON and captures whatever comes back.
#[derive(Clone)]
pub struct ComputeClient {
    config: ComputeConfig,
    client: reqwest::Client,
}

impl ComputeClient {
    /// Endpoint path on the compute backend, fixed by that service.
    const COMPUTE_PATH: &'static str = "/bazi/compute";

    pub fn new(config: ComputeConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    pub fn compute_url(&self) -> Result<String> {
        let base = self
            .config
            .api_base
            .as_deref()
            .ok_or(Error::MissingConfig(vec!["BAZI_API_BASE"]))?;
        Ok(format!(
            "{}{}",
            base.trim_end_matches('/'),
            Self::COMPUTE_PATH
        ))
    }

    /// Sends the caller's JSON body unchanged as an authenticated POST and
    /// captures the reply verbatim, success or failure alike.
    pub async fn forward(&self, body: &Value) -> Result<UpstreamReply> {
        let url = self.compute_url()?;
        let token = self
            .config
            .api_token
            .as_deref()
            .ok_or(Error::MissingConfig(vec!["BAZI_API_TOKEN"]))?;

        debug!("Forwarding birth query to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        debug!("Compute upstream answered {} ({} bytes)", status, body.len());

        Ok(UpstreamReply {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client(base: Option<&str>) -> ComputeClient {
        ComputeClient::new(
            ComputeConfig {
                api_base: base.map(str::to_string),
                api_token: Some("token".to_string()),
            },
            reqwest::Client::new(),
        )
    }

    #[test]
    fn test_compute_url_trims_trailing_slashes() {
        let client = client(Some("https://bazi.example.com///"));
        assert_eq!(
            client.compute_url().unwrap(),
            "https://bazi.example.com/bazi/compute"
        );
    }

    #[test]
    fn test_compute_url_without_base_names_the_variable() {
        let client = client(None);
        match client.compute_url() {
            Err(Error::MissingConfig(missing)) => assert_eq!(missing, vec!["BAZI_API_BASE"]),
            other => panic!("expected missing config, got {:?}", other.map(|_| ())),
        }
    }
}
