use std::time::Duration;

use crate::llm::{AppResult, LLMAdapter, LLMRequest, LLMResponse, ResponseFormat};
use crate::types::{AppError, LLMMessage, TokenUsage};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs, ResponseFormat as OpenAIResponseFormat,
};
use async_openai::Client;
use async_trait::async_trait;

pub struct OpenAIAdapter {
    client: Client<OpenAIConfig>,
    config: OpenAIConfig,
}

impl OpenAIAdapter {
    pub fn new(api_key: &str) -> Self {
        Self::from_config(OpenAIConfig::new().with_api_key(api_key))
    }

    /// Adapter for an OpenAI-compatible endpoint (gateways, local proxies, test servers).
    pub fn new_with_api_base(api_key: &str, api_base: &str) -> Self {
        Self::from_config(
            OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base(api_base.trim_end_matches('/')),
        )
    }

    fn from_config(config: OpenAIConfig) -> Self {
        Self {
            client: Client::with_config(config.clone()),
            config,
        }
    }

    /// Bound every HTTP exchange with the provider by `timeout`.
    pub fn with_timeout(self, timeout: Duration) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client: Client::with_config(self.config.clone()).with_http_client(http_client),
            config: self.config,
        })
    }

    fn convert_message(msg: &LLMMessage) -> AppResult<ChatCompletionRequestMessage> {
        let message: ChatCompletionRequestMessage = match msg.role.as_str() {
            "system" => ChatCompletionRequestSystemMessageArgs::default()
                .content(msg.content.clone())
                .build()?
                .into(),
            "user" => ChatCompletionRequestUserMessageArgs::default()
                .content(msg.content.clone())
                .build()?
                .into(),
            "assistant" => ChatCompletionRequestAssistantMessageArgs::default()
                .content(msg.content.clone())
                .build()?
                .into(),
            other => {
                return Err(AppError::InvalidRequest(format!("Unknown message role: {}", other)));
            }
        };
        Ok(message)
    }
}

#[async_trait]
impl LLMAdapter for OpenAIAdapter {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        let messages = request
            .messages
            .iter()
            .map(Self::convert_message)
            .collect::<AppResult<Vec<_>>>()?;

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(request.model.clone()).messages(messages);
        if let Some(max_tokens) = request.max_tokens {
            args.max_tokens(max_tokens);
        }
        if let Some(temperature) = request.temperature {
            args.temperature(temperature);
        }
        if request.response_format == ResponseFormat::JsonObject {
            args.response_format(OpenAIResponseFormat::JsonObject);
        }

        let response = self.client.chat().create(args.build()?).await?;

        let choice = response
            .choices
            .first()
            .ok_or_else(|| AppError::LLMApi("OpenAI returned no choices".to_string()))?;

        let usage = response
            .usage
            .as_ref()
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        Ok(LLMResponse {
            content: choice.message.content.clone().unwrap_or_default(),
            finish_reason: choice
                .finish_reason
                .as_ref()
                .map(|reason| format!("{:?}", reason).to_lowercase())
                .unwrap_or_else(|| "unknown".to_string()),
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn completion_body(content: &str) -> String {
        serde_json::json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "gpt-4-0125-preview",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop",
                "logprobs": null
            }],
            "usage": { "prompt_tokens": 42, "completion_tokens": 7, "total_tokens": 49 }
        })
        .to_string()
    }

    fn extraction_request() -> LLMRequest {
        LLMRequest {
            model: "gpt-4-0125-preview".to_string(),
            messages: vec![
                LLMMessage::system("Extrae la informacion del documento"),
                LLMMessage::user("PODER GENERAL PARA PLEITOS Y COBRANZAS"),
            ],
            max_tokens: None,
            temperature: Some(0.0),
            response_format: ResponseFormat::JsonObject,
        }
    }

    #[tokio::test]
    async fn test_chat_completion_requests_json_mode() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer sk-test")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "gpt-4-0125-preview",
                "temperature": 0.0,
                "response_format": { "type": "json_object" }
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body(r#"{"Apoderado":"Juan Pérez"}"#))
            .create_async()
            .await;

        let adapter = OpenAIAdapter::new_with_api_base("sk-test", &server.url());
        let response = adapter.create_chat_completion(&extraction_request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.content, r#"{"Apoderado":"Juan Pérez"}"#);
        assert_eq!(response.finish_reason, "stop");
        assert_eq!(response.usage.total_tokens, 49);
    }

    #[tokio::test]
    async fn test_chat_completion_sends_both_messages() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#""content":"Extrae la informacion del documento""#.to_string()),
                Matcher::Regex(r#""content":"PODER GENERAL PARA PLEITOS Y COBRANZAS""#.to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(completion_body("{}"))
            .create_async()
            .await;

        let adapter = OpenAIAdapter::new_with_api_base("sk-test", &server.url());
        adapter.create_chat_completion(&extraction_request()).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error","param":null,"code":"invalid_api_key"}}"#)
            .create_async()
            .await;

        let adapter = OpenAIAdapter::new_with_api_base("sk-wrong", &server.url());
        let err = adapter.create_chat_completion(&extraction_request()).await.unwrap_err();

        assert!(matches!(err, AppError::LLMApi(_)));
        assert!(err.to_string().contains("Incorrect API key"));
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let result = OpenAIAdapter::convert_message(&LLMMessage::new("tool", "x"));
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }
}
