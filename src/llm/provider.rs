use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use crate::types::{AppError, AppResult, LLMProvider, LLMRequest, LLMResponse};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

/// Configuration for an LLM provider
pub struct LLMProviderConfig {
    pub name: String,
    pub api_key: String,
    pub api_base: Option<String>,
    pub timeout: Option<Duration>,
}

pub struct LLM {
    adapter: Arc<dyn LLMAdapter>,
    provider: LLMProvider,
}

impl LLM {
    pub fn new(config: LLMProviderConfig) -> AppResult<Self> {
        let provider: LLMProvider = config.name.parse()?;
        if config.api_key.trim().is_empty() {
            return Err(AppError::InvalidRequest(format!("{} API key is empty", provider)));
        }

        let adapter: Arc<dyn LLMAdapter> = match provider {
            LLMProvider::OpenAI => {
                let adapter = match &config.api_base {
                    Some(base) => crate::llm::openai::OpenAIAdapter::new_with_api_base(&config.api_key, base),
                    None => crate::llm::openai::OpenAIAdapter::new(&config.api_key),
                };
                let adapter = match config.timeout {
                    Some(timeout) => adapter.with_timeout(timeout)?,
                    None => adapter,
                };
                Arc::new(adapter)
            }
        };

        Ok(Self { adapter, provider })
    }

    pub fn provider(&self) -> LLMProvider {
        self.provider
    }

    /// Shared handle to the underlying adapter, for components that hold it across requests.
    pub fn adapter(&self) -> Arc<dyn LLMAdapter> {
        Arc::clone(&self.adapter)
    }
}
