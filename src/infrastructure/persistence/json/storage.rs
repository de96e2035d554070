//! JSON File Storage - 单文件 JSON 存储
//!
//! 整个小说集合写成一个格式化的 JSON 数组。写入先落到同目录的临时文件再重命名，
//! 目标文件要么是旧内容要么是新内容。

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use uuid::Uuid;

use super::context::StorageContext;
use crate::application::ports::{
    DirectoryPickerPort, NovelStoragePort, StorageError, StorageLocation,
};
use crate::domain::novel::Novel;

/// 确保目录存在（幂等）
pub async fn ensure_directory(path: &Path) -> Result<(), StorageError> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| StorageError::io(path, e))
}

/// 整体替换写入集合
pub async fn write_collection(path: &Path, novels: &[Novel]) -> Result<(), StorageError> {
    let content = serde_json::to_string_pretty(novels).map_err(StorageError::encode)?;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp_path = dir.join(format!(".novels-{}.tmp", Uuid::new_v4()));

    if let Err(e) = replace_file(&tmp_path, path, content.as_bytes()).await {
        // 写入中途失败也可能留下不完整的临时文件
        let _ = fs::remove_file(&tmp_path).await;
        return Err(e);
    }

    tracing::debug!(
        path = %path.display(),
        count = novels.len(),
        size = content.len(),
        "Collection written"
    );
    Ok(())
}

async fn replace_file(tmp_path: &Path, path: &Path, content: &[u8]) -> Result<(), StorageError> {
    fs::write(tmp_path, content)
        .await
        .map_err(|e| StorageError::io(tmp_path, e))?;
    fs::rename(tmp_path, path)
        .await
        .map_err(|e| StorageError::io(path, e))
}

/// 读取集合，文件不存在时返回空集合
pub async fn read_collection(path: &Path) -> Result<Vec<Novel>, StorageError> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "Data file not found, starting empty");
            return Ok(Vec::new());
        }
        Err(e) => return Err(StorageError::io(path, e)),
    };

    serde_json::from_str(&content).map_err(|e| StorageError::parse(path, e))
}

/// JSON 文件存储
pub struct JsonFileStorage {
    context: StorageContext,
    picker: Arc<dyn DirectoryPickerPort>,
}

impl JsonFileStorage {
    pub fn new(context: StorageContext, picker: Arc<dyn DirectoryPickerPort>) -> Self {
        Self { context, picker }
    }

    pub fn context(&self) -> &StorageContext {
        &self.context
    }

    pub fn data_file_path(&self) -> PathBuf {
        self.context.data_file_path()
    }

    /// 让用户选择目录；取消时不改变当前位置
    pub async fn select_directory_interactive(&self) -> Result<Option<PathBuf>, StorageError> {
        let Some(dir) = self.picker.pick_directory().await else {
            tracing::debug!("Directory selection cancelled");
            return Ok(None);
        };

        ensure_directory(&dir).await?;
        self.context.set_custom_dir(dir.clone());
        tracing::info!(path = %dir.display(), "Storage directory changed");
        Ok(Some(dir))
    }
}

#[async_trait]
impl NovelStoragePort for JsonFileStorage {
    async fn load_novels(&self) -> Result<Vec<Novel>, StorageError> {
        read_collection(&self.context.data_file_path()).await
    }

    async fn save_novels(&self, novels: &[Novel]) -> Result<(), StorageError> {
        let dir = self.context.resolve_storage_directory();
        ensure_directory(&dir).await?;
        write_collection(&dir.join(self.context.file_name()), novels).await
    }

    fn location(&self) -> StorageLocation {
        self.context.location()
    }

    async fn select_directory(&self) -> Result<Option<PathBuf>, StorageError> {
        self.select_directory_interactive().await
    }

    async fn reset_to_default(&self) -> PathBuf {
        let dir = self.context.reset_to_default();
        tracing::info!(path = %dir.display(), "Storage directory reset to default");
        dir
    }
}
