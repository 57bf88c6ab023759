//! Server configuration loader for chatkeep.
//!
//! Reads `chatkeep.toml` from the working directory (or the path given with
//! `--config`) into [`ServerConfig`], then applies environment overrides.
//! A missing or malformed default file falls back to defaults; an explicit
//! file that cannot be read or parsed is an error.

use std::path::{Path, PathBuf};

use chatkeep_types::config::ServerConfig;
use chatkeep_types::error::ConfigError;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "chatkeep.toml";

/// Load configuration and apply overrides from the process environment.
pub async fn load_server_config(explicit: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    let config = match explicit {
        Some(path) => load_from(path, true).await?,
        None => load_from(Path::new(DEFAULT_CONFIG_FILE), false).await?,
    };
    Ok(apply_env_overrides(config, |key| std::env::var(key).ok()))
}

/// Load `path`. When `required` is false, read and parse failures degrade to
/// [`ServerConfig::default()`] with a log line.
pub async fn load_from(path: &Path, required: bool) -> Result<ServerConfig, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No {} found, using defaults", path.display());
            return Ok(ServerConfig::default());
        }
        Err(err) if !required => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return Ok(ServerConfig::default());
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                message: err.to_string(),
            });
        }
    };

    match toml::from_str::<ServerConfig>(&content) {
        Ok(config) => Ok(drop_blank_admin_token(config)),
        Err(err) if !required => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            Ok(ServerConfig::default())
        }
        Err(err) => Err(ConfigError::Parse {
            path: path.display().to_string(),
            message: err.to_string(),
        }),
    }
}

/// A blank `admin_token` means no token is configured.
fn drop_blank_admin_token(mut config: ServerConfig) -> ServerConfig {
    if config.auth.admin_token.as_deref().is_some_and(|t| t.trim().is_empty()) {
        tracing::warn!("ignoring blank admin_token in config file");
        config.auth.admin_token = None;
    }
    config
}

/// Apply environment overrides. `lookup` returns the value of a variable.
///
/// Blank values are ignored. An unparsable `PORT` is logged and ignored.
pub fn apply_env_overrides(
    mut config: ServerConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ServerConfig {
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(port) = var("PORT") {
        match port.trim().parse::<u16>() {
            Ok(port) => config.port = port,
            Err(err) => tracing::warn!(value = %port, error = %err, "ignoring invalid PORT"),
        }
    }
    if let Some(host) = var("CHATKEEP_HOST") {
        config.host = host;
    }
    if let Some(dir) = var("CHATKEEP_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }
    if let Some(dir) = var("CHATKEEP_WEB_DIR") {
        config.web_dir = PathBuf::from(dir);
    }
    if let Some(env) = var("CHATKEEP_ENV") {
        config.production = env.trim().eq_ignore_ascii_case("production");
    }
    if let Some(token) = var("CHATKEEP_ADMIN_TOKEN") {
        config.auth.admin_token = Some(token);
    }
    if let Some(url) = var("OPENAI_BASE_URL") {
        config.llm.base_url = url;
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[tokio::test]
    async fn missing_default_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_from(&tmp.path().join("chatkeep.toml"), false)
            .await
            .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.llm.model, "gpt-4o");
    }

    #[tokio::test]
    async fn missing_explicit_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_from(&tmp.path().join("custom.toml"), true)
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[tokio::test]
    async fn valid_toml_is_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("chatkeep.toml");
        tokio::fs::write(
            &path,
            r#"
port = 8080
data_dir = "/srv/chatkeep"

[llm]
max_completion_tokens = 1000
"#,
        )
        .await
        .unwrap();

        let config = load_from(&path, true).await.unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_dir, PathBuf::from("/srv/chatkeep"));
        assert_eq!(config.llm.max_completion_tokens, 1000);
        assert_eq!(config.llm.model, "gpt-4o");
    }

    #[tokio::test]
    async fn invalid_default_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("chatkeep.toml");
        tokio::fs::write(&path, "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_from(&path, false).await.unwrap();
        assert_eq!(config.port, 3000);
    }

    #[tokio::test]
    async fn invalid_explicit_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("custom.toml");
        tokio::fs::write(&path, "port = \"not a number\"").await.unwrap();

        let err = load_from(&path, true).await.unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[tokio::test]
    async fn blank_admin_token_in_file_is_unset() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("chatkeep.toml");
        tokio::fs::write(&path, "[auth]\nadmin_token = \"  \"\n")
            .await
            .unwrap();

        let config = load_from(&path, true).await.unwrap();
        assert!(config.auth.admin_token.is_none());
    }

    #[test]
    fn env_overrides_apply() {
        let config = apply_env_overrides(
            ServerConfig::default(),
            env(&[
                ("PORT", "4000"),
                ("CHATKEEP_HOST", "0.0.0.0"),
                ("CHATKEEP_DATA_DIR", "/data"),
                ("CHATKEEP_ENV", "production"),
                ("CHATKEEP_ADMIN_TOKEN", "hunter2"),
                ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
            ]),
        );
        assert_eq!(config.port, 4000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.chats_dir(), PathBuf::from("/data/chats"));
        assert!(config.production);
        assert_eq!(config.auth.admin_token.as_deref(), Some("hunter2"));
        assert_eq!(config.llm.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn invalid_port_and_blank_values_are_ignored() {
        let config = apply_env_overrides(
            ServerConfig::default(),
            env(&[("PORT", "eighty"), ("CHATKEEP_ADMIN_TOKEN", "  ")]),
        );
        assert_eq!(config.port, 3000);
        assert!(config.auth.admin_token.is_none());
    }

    #[test]
    fn non_production_env_value_disables_production() {
        let base = ServerConfig {
            production: true,
            ..ServerConfig::default()
        };
        let config = apply_env_overrides(base, env(&[("CHATKEEP_ENV", "development")]));
        assert!(!config.production);
    }
}
