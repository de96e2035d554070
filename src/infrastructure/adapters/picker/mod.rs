//! Directory Pickers
//!
//! - StdinDirectoryPicker: 终端中读取一行路径
//! - FixedDirectoryPicker: 预设结果（命令行参数、测试）

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::application::ports::DirectoryPickerPort;

/// 从标准输入读取目录，空行或 EOF 视为取消
pub struct StdinDirectoryPicker {
    prompt: String,
}

impl StdinDirectoryPicker {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }
}

impl Default for StdinDirectoryPicker {
    fn default() -> Self {
        Self::new("Storage directory (empty to cancel): ")
    }
}

#[async_trait]
impl DirectoryPickerPort for StdinDirectoryPicker {
    async fn pick_directory(&self) -> Option<PathBuf> {
        let mut stdout = tokio::io::stdout();
        if stdout.write_all(self.prompt.as_bytes()).await.is_err() {
            return None;
        }
        let _ = stdout.flush().await;

        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        match reader.read_line(&mut line).await {
            Ok(0) => None,
            Ok(_) => parse_answer(&line),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read directory from stdin");
                None
            }
        }
    }
}

fn parse_answer(line: &str) -> Option<PathBuf> {
    let answer = line.trim();
    (!answer.is_empty()).then(|| PathBuf::from(answer))
}

/// 返回预设结果的选择器
#[derive(Debug, Clone, Default)]
pub struct FixedDirectoryPicker {
    answer: Option<PathBuf>,
}

impl FixedDirectoryPicker {
    pub fn new(answer: Option<PathBuf>) -> Self {
        Self { answer }
    }

    pub fn cancelled() -> Self {
        Self { answer: None }
    }
}

#[async_trait]
impl DirectoryPickerPort for FixedDirectoryPicker {
    async fn pick_directory(&self) -> Option<PathBuf> {
        self.answer.clone()
    }
}
