//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::application::ports::ProviderKind;
use crate::application::services::AutosavePolicy;
use crate::infrastructure::persistence::json::{platform_data_dir, DEFAULT_FILE_NAME};

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 自动保存配置
    #[serde(default)]
    pub autosave: AutosaveConfig,

    /// 界面语言
    #[serde(default)]
    pub i18n: I18nConfig,

    /// 文本生成配置
    #[serde(default)]
    pub llm: LlmConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 覆盖平台默认数据目录
    #[serde(default)]
    pub default_dir: Option<PathBuf>,

    /// 启动时使用的自定义目录
    #[serde(default)]
    pub custom_dir: Option<PathBuf>,

    /// 数据文件名
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

fn default_file_name() -> String {
    DEFAULT_FILE_NAME.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            default_dir: None,
            custom_dir: None,
            file_name: default_file_name(),
        }
    }
}

impl StorageConfig {
    /// 默认目录：配置覆盖 > 平台数据目录 > 当前目录下的 data
    pub fn resolve_default_dir(&self) -> PathBuf {
        self.default_dir
            .clone()
            .or_else(platform_data_dir)
            .unwrap_or_else(|| PathBuf::from("data"))
    }
}

/// 自动保存配置
#[derive(Debug, Clone, Deserialize)]
pub struct AutosaveConfig {
    /// 防抖时间（毫秒）
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// 兜底保存周期（秒）
    #[serde(default = "default_backstop_secs")]
    pub backstop_secs: u64,
}

fn default_debounce_ms() -> u64 {
    2000
}

fn default_backstop_secs() -> u64 {
    30
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            backstop_secs: default_backstop_secs(),
        }
    }
}

impl AutosaveConfig {
    pub fn policy(&self) -> AutosavePolicy {
        AutosavePolicy {
            debounce: Duration::from_millis(self.debounce_ms),
            backstop: Duration::from_secs(self.backstop_secs),
        }
    }
}

/// 语言配置
#[derive(Debug, Clone, Deserialize)]
pub struct I18nConfig {
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_locale() -> String {
    "zh".to_string()
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
        }
    }
}

/// 文本生成配置
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// 请求超时时间（秒）
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub providers: Vec<LlmProviderConfig>,
}

fn default_llm_timeout() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_llm_timeout(),
            providers: Vec::new(),
        }
    }
}

/// 单个文本生成提供商
#[derive(Clone, Deserialize)]
pub struct LlmProviderConfig {
    pub name: String,
    pub kind: ProviderKind,
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub models: Vec<String>,
}

impl std::fmt::Debug for LlmProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmProviderConfig")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("models", &self.models)
            .finish()
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否输出 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.storage.file_name, "novels.json");
        assert_eq!(config.autosave.policy(), AutosavePolicy::default());
        assert_eq!(config.i18n.locale, "zh");
        assert_eq!(config.llm.timeout_secs, 60);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_default_dir_override() {
        let config = StorageConfig {
            default_dir: Some(PathBuf::from("/srv/novels")),
            ..Default::default()
        };
        assert_eq!(config.resolve_default_dir(), PathBuf::from("/srv/novels"));
    }

    #[test]
    fn test_provider_debug_hides_api_key() {
        let provider = LlmProviderConfig {
            name: "local".to_string(),
            kind: ProviderKind::OpenAi,
            base_url: "http://localhost".to_string(),
            api_key: "sk-secret".to_string(),
            models: vec![],
        };
        assert!(!format!("{provider:?}").contains("sk-secret"));
    }
}
