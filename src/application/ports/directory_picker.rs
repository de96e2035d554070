//! Directory Picker Port - 目录选择器

use async_trait::async_trait;
use std::path::PathBuf;

/// 由宿主环境提供的目录选择能力（文件对话框、终端提示等）
#[async_trait]
pub trait DirectoryPickerPort: Send + Sync {
    /// 返回用户选择的目录，取消时返回 None
    async fn pick_directory(&self) -> Option<PathBuf>;
}
