//! Storage Context - 存储目录解析
//!
//! 默认目录来自平台的用户数据目录，用户可以切换到自定义目录。
//! 切换目录不会迁移已有文件。

use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use crate::application::ports::StorageLocation;

pub const DEFAULT_FILE_NAME: &str = "novels.json";

/// 平台默认数据目录（如 `~/.local/share/novelbox`）
pub fn platform_data_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "novelbox", "NovelBox").map(|dirs| dirs.data_dir().to_path_buf())
}

/// 每个进程一个的存储上下文
#[derive(Debug)]
pub struct StorageContext {
    default_dir: PathBuf,
    custom_dir: RwLock<Option<PathBuf>>,
    file_name: String,
}

impl StorageContext {
    pub fn new(default_dir: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            default_dir: default_dir.into(),
            custom_dir: RwLock::new(None),
            file_name: file_name.into(),
        }
    }

    pub fn with_custom_dir(self, custom_dir: Option<PathBuf>) -> Self {
        *self.custom_dir.write().unwrap_or_else(PoisonError::into_inner) = custom_dir;
        self
    }

    pub fn default_dir(&self) -> &Path {
        &self.default_dir
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// 当前生效的存储位置
    pub fn location(&self) -> StorageLocation {
        match self
            .custom_dir
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            Some(dir) => StorageLocation::Custom(dir.clone()),
            None => StorageLocation::Default(self.default_dir.clone()),
        }
    }

    /// 自定义目录优先，否则默认目录
    pub fn resolve_storage_directory(&self) -> PathBuf {
        self.location().path().to_path_buf()
    }

    /// 数据文件完整路径
    pub fn data_file_path(&self) -> PathBuf {
        self.resolve_storage_directory().join(&self.file_name)
    }

    pub fn set_custom_dir(&self, dir: PathBuf) {
        *self.custom_dir.write().unwrap_or_else(PoisonError::into_inner) = Some(dir);
    }

    /// 清除自定义目录，返回默认目录
    pub fn reset_to_default(&self) -> PathBuf {
        *self.custom_dir.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.default_dir.clone()
    }
}
