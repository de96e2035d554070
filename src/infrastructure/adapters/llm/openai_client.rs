//! OpenAI Client - OpenAI 兼容的 Chat Completions 接口
//!
//! POST {base_url}/chat/completions
//! Authorization: Bearer {api_key}

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{error_from_response, map_send_error, ProviderSettings};
use crate::application::ports::{
    GenerationError, GenerationRequest, GenerationResponse, ProviderKind, TextGeneratorPort,
};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    stop: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    total_tokens: u64,
}

fn build_body<'a>(model: &'a str, request: &'a GenerationRequest) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![ChatMessage {
            role: "user",
            content: &request.prompt,
        }],
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        top_p: request.top_p,
        stop: &request.stop_sequences,
    }
}

fn parse_response(response: ChatResponse) -> Result<GenerationResponse, GenerationError> {
    let tokens_used = response.usage.map_or(0, |u| u.total_tokens);
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::InvalidResponse("No response choice available".to_string()))?;

    Ok(GenerationResponse {
        content: choice.message.and_then(|m| m.content).unwrap_or_default(),
        tokens_used,
        finish_reason: choice.finish_reason.unwrap_or_else(|| "unknown".to_string()),
    })
}

/// OpenAI 兼容客户端
pub struct OpenAiClient {
    client: Client,
    settings: ProviderSettings,
}

impl OpenAiClient {
    pub fn new(settings: ProviderSettings) -> Result<Self, GenerationError> {
        settings.validate(ProviderKind::OpenAi)?;
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GenerationError::NetworkError(e.to_string()))?;

        Ok(Self { client, settings })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url())
    }
}

#[async_trait]
impl TextGeneratorPort for OpenAiClient {
    fn name(&self) -> &str {
        &self.settings.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn models(&self) -> &[String] {
        &self.settings.models
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        tracing::debug!(url = %self.completions_url(), model = model, "Sending chat completion request");

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.settings.api_key)
            .json(&build_body(model, request))
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        parse_response(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body() {
        let request = GenerationRequest::new("续写下一段");
        let body = serde_json::to_value(build_body("gpt-4o-mini", &request)).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "续写下一段");
        assert_eq!(body["max_tokens"], 1000);
        assert!(body.get("stop").is_none());

        let request = GenerationRequest {
            stop_sequences: vec!["\n\n".to_string()],
            ..GenerationRequest::new("x")
        };
        let body = serde_json::to_value(build_body("m", &request)).unwrap();
        assert_eq!(body["stop"], json!(["\n\n"]));
    }

    #[test]
    fn test_parse_response() {
        let raw = json!({
            "choices": [{"message": {"content": "夜色渐深。"}, "finish_reason": "stop"}],
            "usage": {"total_tokens": 42}
        });
        let response = parse_response(serde_json::from_value(raw).unwrap()).unwrap();
        assert_eq!(response.content, "夜色渐深。");
        assert_eq!(response.tokens_used, 42);
        assert_eq!(response.finish_reason, "stop");
    }

    #[test]
    fn test_parse_response_without_choices() {
        let response: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(
            parse_response(response),
            Err(GenerationError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_requires_api_key() {
        let settings = ProviderSettings::new("local", "http://localhost:8080/v1", "", vec![]);
        assert!(matches!(
            OpenAiClient::new(settings),
            Err(GenerationError::InvalidConfig(_))
        ));
    }
}
