//! Text Generator Port - 文本生成服务抽象
//!
//! 定义 "给定模型和提示词生成内容" 的统一接口，具体实现在 infrastructure/adapters/llm

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 文本生成错误
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Invalid provider config: {0}")]
    InvalidConfig(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("API error: HTTP {status} - {message}")]
    ServiceError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Response was blocked by safety filters")]
    Blocked,

    #[error("Provider not found: {0}")]
    ProviderNotFound(String),

    #[error("Model not found: {model} in provider: {provider}")]
    ModelNotFound { provider: String, model: String },
}

/// 提供商类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "OpenAI", alias = "openai")]
    OpenAi,
    #[serde(rename = "Gemini", alias = "gemini")]
    Gemini,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Gemini => "Gemini",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 生成请求
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    /// 仅 Gemini 使用
    pub top_k: u32,
    pub stop_sequences: Vec<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            prompt: String::new(),
            max_tokens: 1000,
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            stop_sequences: Vec::new(),
        }
    }
}

/// 生成响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResponse {
    pub content: String,
    pub tokens_used: u64,
    pub finish_reason: String,
}

/// Text Generator Port
#[async_trait]
pub trait TextGeneratorPort: Send + Sync {
    /// 配置中的提供商名称
    fn name(&self) -> &str;

    fn kind(&self) -> ProviderKind;

    /// 可用模型列表
    fn models(&self) -> &[String];

    /// 生成内容
    async fn generate(
        &self,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError>;
}
