use bazi_relay::config::{self, GateMode};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

#[tokio::test]
async fn test_yaml_file_is_loaded_and_gaps_are_defaulted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(
        &path,
        r#"
server:
  host: "127.0.0.1"
  port: 9102
compute:
  api_base: "https://bazi.example.com"
  api_token: "token-1"
"#,
    )
    .unwrap();

    let config = config::load_from(&path).await.unwrap();

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 9102);
    assert_eq!(config.server.logs.level, "info");
    assert_eq!(
        config.compute.api_base.as_deref(),
        Some("https://bazi.example.com")
    );
    // Everything the file does not mention keeps its default.
    assert_eq!(config.llm.model, "gpt-4o-mini");
    assert_eq!(config.llm.api_base, "https://api.openai.com");
    assert!(config.auth.is_none());
}

#[tokio::test]
async fn test_auth_section_is_parsed_with_its_mode_and_prefixes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(
        &path,
        r#"
auth:
  api_base: "https://id.example.com"
  secret_key: "sk_test_1"
  mode: protect_routes
  protected:
    - "/generate"
    - "/app"
  sign_in_url: "/login"
"#,
    )
    .unwrap();

    let config = config::load_from(&path).await.unwrap();
    let auth = config.auth.unwrap();

    assert_eq!(auth.mode, GateMode::ProtectRoutes);
    assert_eq!(auth.protected, vec!["/generate", "/app"]);
    assert_eq!(auth.sign_in_url, "/login");
    assert_eq!(auth.session_cookie, "__session");
}

#[tokio::test]
async fn test_unreadable_file_is_an_error() {
    let dir = TempDir::new().unwrap();

    let result = config::load_from(&dir.path().join("nope.yaml")).await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_malformed_yaml_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "server: [not, a, mapping").unwrap();

    let result = config::load_from(&path).await;

    assert!(result.is_err());
}
