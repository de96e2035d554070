//! LLM Service - 文本生成提供商注册表

use dashmap::DashMap;
use std::sync::Arc;

use crate::application::ports::{
    GenerationError, GenerationRequest, GenerationResponse, TextGeneratorPort,
};

/// 提供商注册表
///
/// key 为 `{name}_{kind}`，按 key 前缀或名称查找
pub struct LlmService {
    providers: DashMap<String, Arc<dyn TextGeneratorPort>>,
}

impl LlmService {
    pub fn new() -> Self {
        Self {
            providers: DashMap::new(),
        }
    }

    pub fn register(&self, provider: Arc<dyn TextGeneratorPort>) {
        let key = format!("{}_{}", provider.name(), provider.kind());
        tracing::info!(
            provider = provider.name(),
            kind = %provider.kind(),
            models = provider.models().len(),
            "LLM provider registered"
        );
        self.providers.insert(key, provider);
    }

    /// 已注册提供商的 key（排序）
    pub fn providers(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.providers.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn find_provider(&self, provider: &str) -> Option<Arc<dyn TextGeneratorPort>> {
        if let Some(found) = self.providers.get(provider) {
            return Some(found.value().clone());
        }

        let prefix = format!("{provider}_");
        let mut matches: Vec<(String, Arc<dyn TextGeneratorPort>)> = self
            .providers
            .iter()
            .filter(|e| e.key().starts_with(&prefix) || e.value().name() == provider)
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        matches.sort_by(|a, b| a.0.cmp(&b.0));
        matches.into_iter().next().map(|(_, p)| p)
    }

    pub fn provider_models(&self, provider: &str) -> Result<Vec<String>, GenerationError> {
        self.find_provider(provider)
            .map(|p| p.models().to_vec())
            .ok_or_else(|| GenerationError::ProviderNotFound(provider.to_string()))
    }

    /// 生成内容，模型必须在提供商的模型列表中
    pub async fn generate(
        &self,
        provider: &str,
        model: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let generator = self
            .find_provider(provider)
            .ok_or_else(|| GenerationError::ProviderNotFound(provider.to_string()))?;

        let listed = generator
            .models()
            .iter()
            .any(|m| m == model || m.strip_prefix("models/") == Some(model));
        if !listed {
            return Err(GenerationError::ModelNotFound {
                provider: provider.to_string(),
                model: model.to_string(),
            });
        }

        tracing::debug!(
            provider = generator.name(),
            model = model,
            prompt_chars = request.prompt.chars().count(),
            "Generating text"
        );
        let response = generator.generate(model, request).await?;
        tracing::info!(
            provider = generator.name(),
            model = model,
            tokens_used = response.tokens_used,
            finish_reason = %response.finish_reason,
            "Text generated"
        );
        Ok(response)
    }
}

impl Default for LlmService {
    fn default() -> Self {
        Self::new()
    }
}
