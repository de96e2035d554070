//! Gemini Client - Google Generative Language 接口
//!
//! POST {base_url}/v1beta/models/{model}:generateContent?key={api_key}

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{error_from_response, map_send_error, ProviderSettings};
use crate::application::ports::{
    GenerationError, GenerationRequest, GenerationResponse, ProviderKind, TextGeneratorPort,
};

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    max_output_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    stop_sequences: &'a [String],
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

const SAFETY_SETTINGS: [SafetySetting; 2] = [
    SafetySetting {
        category: "HARM_CATEGORY_DANGEROUS_CONTENT",
        threshold: "BLOCK_MEDIUM_AND_ABOVE",
    },
    SafetySetting {
        category: "HARM_CATEGORY_HARASSMENT",
        threshold: "BLOCK_NONE",
    },
];

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
    safety_settings: &'static [SafetySetting],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    total_token_count: u64,
}

fn build_body(request: &GenerationRequest) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: &request.prompt,
            }],
        }],
        generation_config: GenerationConfig {
            max_output_tokens: request.max_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
            top_k: request.top_k,
            stop_sequences: &request.stop_sequences,
        },
        safety_settings: &SAFETY_SETTINGS,
    }
}

fn parse_response(response: GenerateContentResponse) -> Result<GenerationResponse, GenerationError> {
    let tokens_used = response.usage_metadata.map_or(0, |u| u.total_token_count);
    let candidate = response.candidates.into_iter().next().ok_or_else(|| {
        GenerationError::InvalidResponse("No response candidate available".to_string())
    })?;

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Err(GenerationError::Blocked);
    }

    let content = candidate
        .content
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .unwrap_or_default();

    Ok(GenerationResponse {
        content,
        tokens_used,
        finish_reason: candidate.finish_reason.unwrap_or_else(|| "unknown".to_string()),
    })
}

/// Gemini 客户端
pub struct GeminiClient {
    client: Client,
    settings: ProviderSettings,
}

impl GeminiClient {
    pub fn new(settings: ProviderSettings) -> Result<Self, GenerationError> {
        settings.validate(ProviderKind::Gemini)?;
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GenerationError::NetworkError(e.to_string()))?;

        Ok(Self { client, settings })
    }

    fn generate_url(&self, model: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/v1beta/models/{}:generateContent", self.settings.base_url(), model)
    }
}

#[async_trait]
impl TextGeneratorPort for GeminiClient {
    fn name(&self) -> &str {
        &self.settings.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn models(&self) -> &[String] {
        &self.settings.models
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let url = self.generate_url(model);
        tracing::debug!(url = %url, model = model, "Sending generateContent request");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.settings.api_key.as_str())])
            .json(&build_body(request))
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        parse_response(body)
    }
}
