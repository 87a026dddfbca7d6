use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub compute: ComputeConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    /// Identity-provider settings. Absent means no gate: every request is
    /// anonymous and nothing is protected.
    #[serde(default)]
    pub auth: Option<AuthConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub logs: LogsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// BaZi compute backend. Base URL and bearer token are required before any
/// request can be forwarded, but deliberately optional here: relay handlers
/// check them per request and answer 500 naming what is missing, instead of
/// refusing to boot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComputeConfig {
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Overrides the built-in instructional template. `{notes}` and
    /// `{bazi_json}` are substituted at request time.
    #[serde(default)]
    pub prompt_template: Option<String>,
    /// Operator's private interpretation notes, embedded into the prompt.
    #[serde(default)]
    pub notes: Option<String>,
    /// Allow the provider's web-search tool during interpretation.
    #[serde(default)]
    pub web_search: bool,
    /// Attach the raw LLM response to the analyze envelope for debugging.
    #[serde(default)]
    pub include_raw: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default)]
    pub mode: GateMode,
    /// Path prefixes the gate applies to. Empty means the mode's
    /// conventional default (`/api/analyze` for endpoints, `/generate` for
    /// routes).
    #[serde(default)]
    pub protected: Vec<String>,
    #[serde(default = "default_sign_in_url")]
    pub sign_in_url: String,
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,
}

/// The two historical gating policies, as one configuration switch.
/// `ProtectEndpoints` keeps pages public and lets the paid endpoint answer a
/// structured 401; `ProtectRoutes` blocks the whole matched tree at the edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateMode {
    ProtectRoutes,
    #[default]
    ProtectEndpoints,
}

impl ComputeConfig {
    /// Names of required settings that are absent, by their environment
    /// variable names so the 500 body tells operators exactly what to fix.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.api_base.is_none() {
            missing.push("BAZI_API_BASE");
        }
        if self.api_token.is_none() {
            missing.push("BAZI_API_TOKEN");
        }
        missing
    }
}

impl LlmConfig {
    pub fn missing(&self) -> Vec<&'static str> {
        if self.api_key.is_none() {
            vec!["OPENAI_API_KEY"]
        } else {
            Vec::new()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            logs: LogsConfig::default(),
        }
    }
}

impl Default for LogsConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: default_llm_api_base(),
            api_key: None,
            model: default_model(),
            prompt_template: None,
            notes: None,
            web_search: false,
            include_raw: false,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            secret_key: None,
            mode: GateMode::default(),
            protected: Vec::new(),
            sign_in_url: default_sign_in_url(),
            session_cookie: default_session_cookie(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_llm_api_base() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_sign_in_url() -> String {
    "/sign-in".to_string()
}

fn default_session_cookie() -> String {
    "__session".to_string()
}
