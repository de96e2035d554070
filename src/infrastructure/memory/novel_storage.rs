//! In-Memory Novel Storage
//!
//! 不落盘的 NovelStoragePort 实现，记录写入次数，可模拟读写失败

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::application::ports::{NovelStoragePort, StorageError, StorageLocation};
use crate::domain::novel::Novel;

const MEMORY_PATH: &str = ":memory:";

/// 内存存储
#[derive(Default)]
pub struct InMemoryNovelStorage {
    novels: Mutex<Vec<Novel>>,
    writes: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryNovelStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置数据（不计入写入次数）
    pub fn with_novels(novels: Vec<Novel>) -> Self {
        Self {
            novels: Mutex::new(novels),
            ..Self::default()
        }
    }

    /// 成功写入的次数
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// 最近一次写入的内容
    pub fn stored(&self) -> Vec<Novel> {
        self.novels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl NovelStoragePort for InMemoryNovelStorage {
    async fn load_novels(&self) -> Result<Vec<Novel>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::io(MEMORY_PATH, "simulated read failure"));
        }
        Ok(self.stored())
    }

    async fn save_novels(&self, novels: &[Novel]) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::io(MEMORY_PATH, "simulated write failure"));
        }
        *self.novels.lock().unwrap_or_else(PoisonError::into_inner) = novels.to_vec();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> StorageLocation {
        StorageLocation::Default(PathBuf::from(MEMORY_PATH))
    }

    async fn select_directory(&self) -> Result<Option<PathBuf>, StorageError> {
        Ok(None)
    }

    async fn reset_to_default(&self) -> PathBuf {
        PathBuf::from(MEMORY_PATH)
    }
}
