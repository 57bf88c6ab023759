//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and REST API.
//! Services are generic over repository/provider traits, but AppState pins
//! them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use chatkeep_core::chat::gateway::ChatGateway;
use chatkeep_core::llm::box_provider::BoxCompletionProvider;
use chatkeep_core::llm::proxy::CompletionProxy;
use chatkeep_infra::llm::create_provider;
use chatkeep_infra::llm::prompt::load_system_prompt;
use chatkeep_infra::secret::{API_KEY_ENV, ApiKeyStore};
use chatkeep_infra::storage::FileChatStore;
use chatkeep_types::config::ServerConfig;

use crate::http::extractors::auth::hash_token;

pub type ConcreteChatGateway = ChatGateway<FileChatStore>;

pub type ConcreteCompletionProxy = CompletionProxy<BoxCompletionProvider>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub chat_gateway: Arc<ConcreteChatGateway>,
    pub completion: Arc<ConcreteCompletionProxy>,
    pub api_keys: Arc<ApiKeyStore>,
    /// SHA-256 hex of the admin token; admin routes are open when `None`.
    pub admin_token_hash: Option<String>,
    pub web_dir: PathBuf,
}

impl AppState {
    /// Load conversations from disk, seed the API key and wire services.
    pub async fn init(config: &ServerConfig) -> anyhow::Result<Self> {
        let store = FileChatStore::new(config.chats_dir());
        let report = store.initialize().await?;
        if !report.skipped.is_empty() {
            tracing::warn!(
                skipped = report.skipped.len(),
                "some conversation files could not be loaded and were left in place"
            );
        }

        // Production never writes the key to disk.
        let persist_path = (!config.production).then(|| config.api_key_path());
        let api_keys = Arc::new(ApiKeyStore::load(std::env::var(API_KEY_ENV).ok(), persist_path).await);

        let system_prompt = load_system_prompt(&config.system_prompt_path).await;
        let provider = create_provider(&config.llm, api_keys.clone());

        Ok(Self::from_parts(store, provider, system_prompt, api_keys, config))
    }

    /// Assemble state from already-built parts.
    pub fn from_parts(
        store: FileChatStore,
        provider: BoxCompletionProvider,
        system_prompt: String,
        api_keys: Arc<ApiKeyStore>,
        config: &ServerConfig,
    ) -> Self {
        let completion = CompletionProxy::new(
            provider,
            system_prompt,
            config.llm.model.clone(),
            config.llm.max_completion_tokens,
        );

        Self {
            chat_gateway: Arc::new(ChatGateway::new(store)),
            completion: Arc::new(completion),
            api_keys,
            admin_token_hash: config
                .auth
                .admin_token
                .as_deref()
                .filter(|token| !token.trim().is_empty())
                .map(hash_token),
            web_dir: config.web_dir.clone(),
        }
    }
}
