//! Novel Storage Port - 草稿持久化抽象
//!
//! 整个小说集合作为一个 JSON 文档读写，具体实现在 infrastructure 层

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::novel::Novel;

/// 存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error at {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Invalid data in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Failed to encode novels: {message}")]
    Encode { message: String },
}

impl StorageError {
    pub fn io(path: impl AsRef<Path>, err: impl ToString) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            message: err.to_string(),
        }
    }

    pub fn parse(path: impl AsRef<Path>, err: impl ToString) -> Self {
        Self::Parse {
            path: path.as_ref().to_path_buf(),
            message: err.to_string(),
        }
    }

    pub fn encode(err: impl ToString) -> Self {
        Self::Encode {
            message: err.to_string(),
        }
    }
}

/// 当前生效的存储位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    /// 平台默认的用户数据目录
    Default(PathBuf),
    /// 用户选择的目录
    Custom(PathBuf),
}

impl StorageLocation {
    pub fn path(&self) -> &Path {
        match self {
            StorageLocation::Default(path) | StorageLocation::Custom(path) => path,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, StorageLocation::Custom(_))
    }
}

/// Novel Storage Port
///
/// 写入是整文件替换；同一文件的多进程写入以最后一次为准
#[async_trait]
pub trait NovelStoragePort: Send + Sync {
    /// 读取全部小说，文件不存在时返回空集合
    async fn load_novels(&self) -> Result<Vec<Novel>, StorageError>;

    /// 写入全部小说
    async fn save_novels(&self, novels: &[Novel]) -> Result<(), StorageError>;

    /// 当前存储位置
    fn location(&self) -> StorageLocation;

    /// 当前存储目录
    fn current_directory(&self) -> PathBuf {
        self.location().path().to_path_buf()
    }

    /// 交互式选择存储目录，取消时返回 None
    async fn select_directory(&self) -> Result<Option<PathBuf>, StorageError>;

    /// 恢复默认存储目录
    async fn reset_to_default(&self) -> PathBuf;
}
