//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::application::ports::{GenerationError, StorageError};
use crate::domain::novel::NovelError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误（空字段、超长等）
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 业务规则违反
    #[error("Business rule violation: {0}")]
    BusinessRuleViolation(String),

    /// 状态无效
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// 目录或文件访问失败
    #[error("IO error: {0}")]
    IoError(String),

    /// 持久化文件损坏
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 外部服务错误
    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// 创建业务规则违反错误
    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::BusinessRuleViolation(message.into())
    }

    /// 创建状态无效错误
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }
}

impl From<StorageError> for ApplicationError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Io { .. } => Self::IoError(err.to_string()),
            StorageError::Parse { .. } => Self::ParseError(err.to_string()),
            StorageError::Encode { .. } => Self::InvalidState(err.to_string()),
        }
    }
}

impl From<NovelError> for ApplicationError {
    fn from(err: NovelError) -> Self {
        match err {
            NovelError::LastChapter => Self::BusinessRuleViolation(err.to_string()),
            _ => Self::ValidationError(err.to_string()),
        }
    }
}

impl From<GenerationError> for ApplicationError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::InvalidConfig(message) => Self::ValidationError(message),
            GenerationError::ProviderNotFound(name) => Self::not_found("Provider", name),
            GenerationError::ModelNotFound { .. } => Self::ValidationError(err.to_string()),
            _ => Self::ExternalServiceError(err.to_string()),
        }
    }
}
