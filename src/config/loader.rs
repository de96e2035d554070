//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::types::AppConfig;
use crate::infrastructure::i18n;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "NOVELBOX";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `NOVELBOX_`，层级分隔符 `__`）
/// 2. 配置文件（config.toml 或 config.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `NOVELBOX_STORAGE__CUSTOM_DIR=/data/novels`
/// - `NOVELBOX_AUTOSAVE__DEBOUNCE_MS=1500`
/// - `NOVELBOX_I18N__LOCALE=en`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("storage.file_name", "novels.json")?
        .set_default("autosave.debounce_ms", 2000)?
        .set_default("autosave.backstop_secs", 30)?
        .set_default("i18n.locale", "zh")?
        .set_default("llm.timeout_secs", 60)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级），例如 NOVELBOX_LOG__LEVEL=debug
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 自动保存周期上限
const MAX_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.storage.file_name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Storage file name cannot be empty".to_string(),
        ));
    }

    if config.autosave.debounce_ms == 0 || config.autosave.backstop_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Autosave intervals cannot be 0".to_string(),
        ));
    }

    let policy = config.autosave.policy();
    if policy.debounce > MAX_AUTOSAVE_INTERVAL || policy.backstop > MAX_AUTOSAVE_INTERVAL {
        return Err(ConfigError::ValidationError(format!(
            "Autosave intervals cannot exceed {}s",
            MAX_AUTOSAVE_INTERVAL.as_secs()
        )));
    }

    if policy.backstop <= policy.debounce {
        return Err(ConfigError::ValidationError(
            "Autosave backstop must be longer than debounce".to_string(),
        ));
    }

    if !i18n::is_supported(&config.i18n.locale) {
        return Err(ConfigError::ValidationError(format!(
            "Unsupported locale: {} (expected one of {:?})",
            config.i18n.locale,
            i18n::SUPPORTED_LOCALES
        )));
    }

    for provider in &config.llm.providers {
        if provider.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "LLM provider name cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Default Directory: {:?}", config.storage.resolve_default_dir());
    if let Some(dir) = &config.storage.custom_dir {
        tracing::info!("Custom Directory: {:?}", dir);
    }
    tracing::info!("Data File: {}", config.storage.file_name);
    tracing::info!(
        "Autosave: debounce {}ms, backstop {}s",
        config.autosave.debounce_ms,
        config.autosave.backstop_secs
    );
    tracing::info!("Locale: {}", config.i18n.locale);
    tracing::info!("LLM Providers: {}", config.llm.providers.len());
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
