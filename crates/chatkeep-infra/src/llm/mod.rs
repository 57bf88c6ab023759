//! Completion provider implementations and prompt loading.
//!
//! [`create_provider`] wires the OpenAI provider to the shared key store and
//! boxes it for the completion proxy.

pub mod openai;
pub mod prompt;

use std::sync::Arc;

use chatkeep_core::llm::box_provider::BoxCompletionProvider;
use chatkeep_types::config::LlmConfig;

use crate::secret::ApiKeyStore;

use self::openai::OpenAiProvider;

/// Build the boxed provider used by the HTTP layer.
pub fn create_provider(config: &LlmConfig, keys: Arc<ApiKeyStore>) -> BoxCompletionProvider {
    BoxCompletionProvider::new(OpenAiProvider::new(keys, config.base_url.clone()))
}
