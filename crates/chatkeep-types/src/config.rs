//! Server configuration types for chatkeep.
//!
//! `ServerConfig` represents the optional `chatkeep.toml`. Every field has a
//! default so an empty (or absent) file yields a runnable development setup.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Base directory for persisted state (`chats/`, `api_key.txt`).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory of static UI assets served as a fallback, if it exists.
    #[serde(default = "default_web_dir")]
    pub web_dir: PathBuf,

    /// File holding the system instruction injected into every completion.
    #[serde(default = "default_system_prompt_path")]
    pub system_prompt_path: PathBuf,

    /// Production mode disables writing the API key to disk.
    #[serde(default)]
    pub production: bool,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Directory holding one JSON file per conversation.
    pub fn chats_dir(&self) -> PathBuf {
        self.data_dir.join("chats")
    }

    /// File the API key is persisted to outside production.
    pub fn api_key_path(&self) -> PathBuf {
        self.data_dir.join("api_key.txt")
    }

    /// Bind address in `host:port` form.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            web_dir: default_web_dir(),
            system_prompt_path: default_system_prompt_path(),
            production: false,
            llm: LlmConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_web_dir() -> PathBuf {
    PathBuf::from("public")
}

fn default_system_prompt_path() -> PathBuf {
    PathBuf::from("system_prompt.txt")
}

/// Completion service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_completion_tokens")]
    pub max_completion_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            max_completion_tokens: default_max_completion_tokens(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_max_completion_tokens() -> u32 {
    6000
}

/// Access control for administrative routes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret required on admin routes. Routes are open when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_token: Option<String>,
}
