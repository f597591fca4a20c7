//! In-process `LLMAdapter` used by tests so nothing reaches the network.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::llm::{AppResult, LLMAdapter, LLMRequest, LLMResponse, TokenUsage};

type Responder = Box<dyn Fn(&LLMRequest) -> AppResult<String> + Send + Sync>;

pub struct StubLLM {
    responder: Responder,
    delay: Option<Duration>,
    requests: Mutex<Vec<LLMRequest>>,
}

impl StubLLM {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&LLMRequest) -> AppResult<String> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `content`.
    pub fn fixed(content: impl Into<String>) -> Self {
        let content = content.into();
        Self::new(move |_| Ok(content.clone()))
    }

    /// Answer with a JSON object keyed by `fields`, each value set to the user message.
    pub fn echo_fields(fields: Vec<String>) -> Self {
        Self::new(move |request| {
            let text = request
                .messages
                .iter()
                .rev()
                .find(|m| m.role == "user")
                .map(|m| m.content.trim().to_string())
                .unwrap_or_default();
            let map: serde_json::Map<String, serde_json::Value> = fields
                .iter()
                .map(|f| (f.clone(), serde_json::Value::String(text.clone())))
                .collect();
            Ok(serde_json::Value::Object(map).to_string())
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<LLMRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LLMAdapter for StubLLM {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        Ok(LLMResponse {
            content: (self.responder)(request)?,
            finish_reason: "stop".to_string(),
            usage: TokenUsage::default(),
        })
    }
}
