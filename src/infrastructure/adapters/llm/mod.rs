//! LLM Adapters - 文本生成 HTTP 客户端
//!
//! 根据配置中的提供商类型创建 OpenAI 或 Gemini 客户端

mod gemini_client;
mod openai_client;

pub use gemini_client::GeminiClient;
pub use openai_client::OpenAiClient;

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use crate::application::ports::{GenerationError, ProviderKind, TextGeneratorPort};
use crate::config::{LlmConfig, LlmProviderConfig};

/// 单个提供商的连接参数
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub name: String,
    pub base_url: String,
    pub api_key: String,
    pub models: Vec<String>,
    pub timeout: Duration,
}

impl ProviderSettings {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        models: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            models,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn from_config(config: &LlmProviderConfig, timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::new(
                config.name.clone(),
                config.base_url.clone(),
                config.api_key.clone(),
                config.models.clone(),
            )
        }
    }

    /// 去掉末尾斜杠的基础 URL
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    fn validate(&self, kind: ProviderKind) -> Result<(), GenerationError> {
        if self.api_key.trim().is_empty() {
            return Err(GenerationError::InvalidConfig(format!(
                "{kind} provider requires API key"
            )));
        }
        if self.base_url.trim().is_empty() {
            return Err(GenerationError::InvalidConfig(format!(
                "{kind} provider requires base URL"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

fn map_send_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout
    } else if e.is_connect() {
        GenerationError::NetworkError(format!("Cannot connect to LLM service: {e}"))
    } else {
        GenerationError::NetworkError(e.to_string())
    }
}

/// 非 2xx 响应转换为 ServiceError，尽量取出 `error.message`
async fn error_from_response(response: reqwest::Response) -> GenerationError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&text)
        .ok()
        .and_then(|body| body.error)
        .and_then(|detail| detail.message)
        .unwrap_or_else(|| {
            if text.is_empty() {
                "Unknown error".to_string()
            } else {
                text
            }
        });

    GenerationError::ServiceError {
        status: status.as_u16(),
        message,
    }
}

/// 按配置创建所有提供商；配置无效的提供商被跳过并记录警告
pub fn build_text_generators(config: &LlmConfig) -> Vec<Arc<dyn TextGeneratorPort>> {
    let timeout = Duration::from_secs(config.timeout_secs);
    config
        .providers
        .iter()
        .filter_map(|provider| {
            let settings = ProviderSettings::from_config(provider, timeout);
            let built: Result<Arc<dyn TextGeneratorPort>, GenerationError> = match provider.kind {
                ProviderKind::OpenAi => OpenAiClient::new(settings).map(|c| Arc::new(c) as _),
                ProviderKind::Gemini => GeminiClient::new(settings).map(|c| Arc::new(c) as _),
            };
            match built {
                Ok(generator) => Some(generator),
                Err(e) => {
                    tracing::warn!(provider = %provider.name, error = %e, "Skipping LLM provider");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(name: &str, kind: ProviderKind, api_key: &str) -> LlmProviderConfig {
        LlmProviderConfig {
            name: name.to_string(),
            kind,
            base_url: "https://api.example.com/v1/".to_string(),
            api_key: api_key.to_string(),
            models: vec!["m1".to_string()],
        }
    }

    #[test]
    fn test_build_skips_invalid_providers() {
        let config = LlmConfig {
            timeout_secs: 10,
            providers: vec![
                provider("a", ProviderKind::OpenAi, "key"),
                provider("b", ProviderKind::Gemini, ""),
                provider("c", ProviderKind::Gemini, "key"),
            ],
        };

        let generators = build_text_generators(&config);
        let names: Vec<(&str, ProviderKind)> = generators.iter().map(|g| (g.name(), g.kind())).collect();
        assert_eq!(names, vec![("a", ProviderKind::OpenAi), ("c", ProviderKind::Gemini)]);
        assert_eq!(generators[0].models(), ["m1".to_string()]);
    }

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let settings = ProviderSettings::new("a", "http://localhost/v1/", "k", vec![]);
        assert_eq!(settings.base_url(), "http://localhost/v1");
    }
}
