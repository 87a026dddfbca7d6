use crate::{Error, Result, config::LlmConfig};
use serde_json::{Value, json};
use tracing::debug;

/// Instructional template used when the deployment does not configure its
/// own. `{notes}` and `{bazi_json}` are substituted per request.
const DEFAULT_PROMPT_TEMPLATE: &str = "\
You are a BaZi (八字) analyst. Use the user's BaZi computation JSON plus my private notes.
If you use outside facts, be explicit what you searched and why.

Return:
1) Summary (plain English + Chinese)
2) Key pillars / ten gods / elements balance (based on provided JSON fields)
3) Career / study / timing insights (no medical/legal claims)
4) If uncertain due to missing fields, say what's missing.

=== My private notes ===
{notes}

=== BaZi JSON output ===
{bazi_json}
";

/// Client for the interpretation upstream, a completions-style HTTP API.
///
/// Responses are handled as raw JSON on purpose: the provider's response
/// shape has drifted across its own versions, and [`extract_text`] is the
/// one place that absorbs the drift.
#[derive(Clone)]
pub struct LlmClient {
    config: LlmConfig,
    client: reqwest::Client,
}

impl LlmClient {
    const RESPONSES_PATH: &'static str = "/v1/responses";

    pub fn new(config: LlmConfig, client: reqwest::Client) -> Self {
        Self { config, client }
    }

    /// Builds the analysis prompt: the instructional template with the
    /// operator's notes and the compute result pretty-printed into it.
    pub fn build_prompt(&self, bazi: &Value) -> String {
        let template = self
            .config
            .prompt_template
            .as_deref()
            .unwrap_or(DEFAULT_PROMPT_TEMPLATE);
        let notes = self.config.notes.as_deref().unwrap_or("");
        let pretty = serde_json::to_string_pretty(bazi).unwrap_or_else(|_| bazi.to_string());

        template
            .replace("{notes}", notes)
            .replace("{bazi_json}", &pretty)
    }

    fn request_body(&self, prompt: String) -> Value {
        let mut request = json!({
            "model": self.config.model,
            "input": prompt,
        });
        if self.config.web_search {
            request["tools"] = json!([{ "type": "web_search" }]);
            request["include"] = json!(["web_search_call.action.sources"]);
        }
        request
    }

    /// Submits the compute result for interpretation and returns the
    /// provider's JSON. Non-2xx answers become [`Error::LlmUpstream`]
    /// carrying the provider's payload; they are never turned into a
    /// partial analysis.
    pub async fn interpret(&self, bazi: &Value) -> Result<Value> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(Error::MissingConfig(vec!["OPENAI_API_KEY"]))?;
        let url = format!(
            "{}{}",
            self.config.api_base.trim_end_matches('/'),
            Self::RESPONSES_PATH
        );
        let request = self.request_body(self.build_prompt(bazi));

        debug!("Requesting analysis from {} (model {})", url, self.config.model);

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let raw = response.text().await?;

        if !(200..300).contains(&status) {
            let detail = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
            return Err(Error::LlmUpstream { status, detail });
        }

        serde_json::from_str(&raw).map_err(Error::LlmDecode)
    }
}

/// Pulls display text out of an LLM response, tolerating shape drift.
///
/// Strategies are tried in order and the first that yields text wins:
/// 1. the top-level `output_text` convenience string, used even when empty;
/// 2. every `output[*].content[*].text` fragment in document order, joined
///    with newlines;
/// 3. the empty string: a missing analysis degrades instead of failing the
///    request.
///
/// Provider shape changes land here and nowhere else.
pub fn extract_text(response: &Value) -> String {
    flattened_text(response)
        .or_else(|| collected_fragments(response))
        .unwrap_or_default()
}

fn flattened_text(response: &Value) -> Option<String> {
    response.get("output_text")?.as_str().map(str::to_string)
}

fn collected_fragments(response: &Value) -> Option<String> {
    let blocks = response.get("output")?.as_array()?;

    let fragments: Vec<&str> = blocks
        .iter()
        .filter_map(|block| block.get("content").and_then(Value::as_array))
        .flatten()
        .filter_map(|item| item.get("text").and_then(Value::as_str))
        .collect();

    if fragments.is_empty() {
        None
    } else {
        Some(fragments.join("\n"))
    }
}
