mod types;

pub use types::*;

use crate::Result;
use std::env;
use std::path::Path;
use tracing::debug;

/// Loads configuration from `CONFIG_PATH` (default `config.yaml`) when the
/// file exists, otherwise starts from defaults, then applies environment
/// overrides. Secrets are environment-provided and never committed, so a
/// missing file is not an error.
pub async fn load() -> Result<Config> {
    let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

    let mut config = if Path::new(&config_path).exists() {
        read_file(Path::new(&config_path)).await?
    } else {
        debug!("No configuration file at {}, using defaults", config_path);
        Config::default()
    };

    apply_env_overrides(&mut config, |key| env::var(key).ok());
    Ok(config)
}

/// Loads from an explicit path, still honoring environment overrides.
pub async fn load_from(path: &Path) -> Result<Config> {
    let mut config = read_file(path).await?;
    apply_env_overrides(&mut config, |key| env::var(key).ok());
    Ok(config)
}

async fn read_file(path: &Path) -> Result<Config> {
    debug!("Loading configuration from: {}", path.display());

    let config_str = tokio::fs::read_to_string(path).await?;
    let config: Config = serde_yaml::from_str(&config_str)?;

    Ok(config)
}

/// Environment wins over the file for upstream endpoints and secrets.
/// Setting either AUTH_* variable enables the gate even without an `auth`
/// section in the file.
fn apply_env_overrides(config: &mut Config, get: impl Fn(&str) -> Option<String>) {
    if let Some(base) = get("BAZI_API_BASE") {
        config.compute.api_base = Some(base);
    }
    if let Some(token) = get("BAZI_API_TOKEN") {
        config.compute.api_token = Some(token);
    }
    if let Some(key) = get("OPENAI_API_KEY") {
        config.llm.api_key = Some(key);
    }
    if let Some(base) = get("OPENAI_API_BASE") {
        config.llm.api_base = base;
    }
    if let Some(base) = get("AUTH_API_BASE") {
        config.auth.get_or_insert_with(AuthConfig::default).api_base = Some(base);
    }
    if let Some(secret) = get("AUTH_SECRET_KEY") {
        config.auth.get_or_insert_with(AuthConfig::default).secret_key = Some(secret);
    }
}
