//! Draft Repository - 内存中的小说集合
//!
//! 所有修改都在内存中同步完成，随后通过 `persist` 把整个集合写入存储端口。
//! `persist` 只读取状态；同一进程内同时只有一个写入在进行。

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::application::commands::{CreateNovel, NovelPatch};
use crate::application::error::ApplicationError;
use crate::application::ports::{keys, LocalizerPort, NovelStoragePort};
use crate::domain::novel::{AuthorName, Description, Novel, NovelId, NovelName};

/// 可被自动保存调度器触发的持久化目标
#[async_trait]
pub trait Persister: Send + Sync {
    async fn persist(&self) -> Result<(), ApplicationError>;
}

#[derive(Debug, Default)]
struct DraftState {
    novels: Vec<Novel>,
    active: Option<NovelId>,
}

/// 草稿仓储
pub struct DraftRepository {
    state: RwLock<DraftState>,
    storage: Arc<dyn NovelStoragePort>,
    localizer: Arc<dyn LocalizerPort>,
    /// 串行化写入
    save_lock: Mutex<()>,
}

impl DraftRepository {
    pub fn new(storage: Arc<dyn NovelStoragePort>, localizer: Arc<dyn LocalizerPort>) -> Self {
        Self {
            state: RwLock::new(DraftState::default()),
            storage,
            localizer,
            save_lock: Mutex::new(()),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn storage(&self) -> &Arc<dyn NovelStoragePort> {
        &self.storage
    }

    pub fn localizer(&self) -> &Arc<dyn LocalizerPort> {
        &self.localizer
    }

    /// 第 N 章的默认标题
    pub fn chapter_title(&self, number: usize) -> String {
        self.localizer
            .translate(keys::NEW_CHAPTER_TITLE, &[("number", &number.to_string())])
    }

    /// 从存储加载集合
    ///
    /// 文件不存在视为空集合；IO/解析失败时返回错误并保留当前内存状态
    pub async fn load(&self) -> Result<usize, ApplicationError> {
        let mut novels = self.storage.load_novels().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to load novels, keeping in-memory state");
            ApplicationError::from(e)
        })?;

        let default_title = self.chapter_title(1);
        for novel in novels.iter_mut() {
            if novel.ensure_chapter(default_title.as_str()) {
                tracing::warn!(novel_id = %novel.id(), "Novel had no chapters, added a default one");
            }
        }

        let count = novels.len();
        let mut state = self.state.write().await;
        if let Some(active) = state.active.clone() {
            if !novels.iter().any(|n| n.id() == &active) {
                state.active = None;
            }
        }
        state.novels = novels;

        tracing::info!(
            count = count,
            path = %self.storage.current_directory().display(),
            "Novels loaded"
        );
        Ok(count)
    }

    /// 所有小说（插入顺序）
    pub async fn list(&self) -> Vec<Novel> {
        self.state.read().await.novels.clone()
    }

    pub async fn get(&self, novel_id: &NovelId) -> Option<Novel> {
        self.state
            .read()
            .await
            .novels
            .iter()
            .find(|n| n.id() == novel_id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.novels.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// 创建小说（附带第一章）并持久化
    pub async fn create(&self, command: CreateNovel) -> Result<Novel, ApplicationError> {
        let name = NovelName::new(&command.name)?;
        let author = AuthorName::new(&command.author)?;
        let description = Description::parse(command.description.as_deref())?;

        let novel = Novel::new(name, author, description, self.chapter_title(1));
        self.state.write().await.novels.push(novel.clone());

        self.persist().await?;

        tracing::info!(
            novel_id = %novel.id(),
            name = %novel.name(),
            "Novel created"
        );
        Ok(novel)
    }

    /// 合并字段更新；小说不存在时返回 `Ok(false)`
    pub async fn update(&self, novel_id: &NovelId, patch: NovelPatch) -> Result<bool, ApplicationError> {
        let changes = patch.validate()?;

        {
            let mut state = self.state.write().await;
            let Some(novel) = state.novels.iter_mut().find(|n| n.id() == novel_id) else {
                tracing::debug!(novel_id = %novel_id, "Update skipped, novel not found");
                return Ok(false);
            };
            novel.apply(changes);
        }

        self.persist().await?;
        tracing::info!(novel_id = %novel_id, "Novel updated");
        Ok(true)
    }

    /// 删除小说；若为当前小说则清除当前引用
    pub async fn delete(&self, novel_id: &NovelId) -> Result<bool, ApplicationError> {
        {
            let mut state = self.state.write().await;
            let Some(index) = state.novels.iter().position(|n| n.id() == novel_id) else {
                return Ok(false);
            };
            state.novels.remove(index);
            if state.active.as_ref() == Some(novel_id) {
                state.active = None;
            }
        }

        self.persist().await?;
        tracing::info!(novel_id = %novel_id, "Novel deleted");
        Ok(true)
    }

    /// 设置当前编辑的小说，不影响持久化
    pub async fn set_active(&self, novel_id: &NovelId) -> bool {
        let mut state = self.state.write().await;
        if state.novels.iter().any(|n| n.id() == novel_id) {
            state.active = Some(novel_id.clone());
            true
        } else {
            state.active = None;
            false
        }
    }

    pub async fn clear_active(&self) {
        self.state.write().await.active = None;
    }

    pub async fn active_novel_id(&self) -> Option<NovelId> {
        self.state.read().await.active.clone()
    }

    pub async fn active_novel(&self) -> Option<Novel> {
        let state = self.state.read().await;
        let active = state.active.as_ref()?;
        state.novels.iter().find(|n| n.id() == active).cloned()
    }

    /// 在写锁内修改当前小说；没有当前小说时返回 None
    pub async fn with_active_novel<R>(&self, f: impl FnOnce(&mut Novel) -> R) -> Option<R> {
        let mut state = self.state.write().await;
        let DraftState { novels, active } = &mut *state;
        let active = active.as_ref()?;
        novels.iter_mut().find(|n| n.id() == active).map(f)
    }

    /// 把整个集合写入存储
    pub async fn persist(&self) -> Result<(), ApplicationError> {
        let _guard = self.save_lock.lock().await;
        let snapshot = self.state.read().await.novels.clone();

        self.storage.save_novels(&snapshot).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to persist novels");
            ApplicationError::from(e)
        })?;

        tracing::debug!(count = snapshot.len(), "Novels persisted");
        Ok(())
    }
}

#[async_trait]
impl Persister for DraftRepository {
    async fn persist(&self) -> Result<(), ApplicationError> {
        DraftRepository::persist(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::i18n::StaticLocalizer;
    use crate::infrastructure::memory::InMemoryNovelStorage;

    fn repository() -> (Arc<InMemoryNovelStorage>, DraftRepository) {
        let storage = Arc::new(InMemoryNovelStorage::new());
        let localizer = Arc::new(StaticLocalizer::new("en"));
        let repo = DraftRepository::new(storage.clone(), localizer);
        (storage, repo)
    }

    #[tokio::test]
    async fn test_create_novel() {
        let (storage, repo) = repository();

        let novel = repo.create(CreateNovel::new("Dune", "Herbert")).await.unwrap();

        assert_eq!(repo.len().await, 1);
        assert_eq!(novel.chapter_count(), 1);
        assert_eq!(novel.chapters()[0].title(), "Chapter 1");
        assert_eq!(novel.chapters()[0].word_count(), 0);
        assert_eq!(storage.write_count(), 1);
        assert_eq!(storage.stored().len(), 1);
    }

    #[tokio::test]
    async fn test_create_uses_locale_for_first_chapter() {
        let storage = Arc::new(InMemoryNovelStorage::new());
        let repo = DraftRepository::new(storage, Arc::new(StaticLocalizer::new("zh")));

        let novel = repo.create(CreateNovel::new("沙丘", "赫伯特")).await.unwrap();
        assert_eq!(novel.chapters()[0].title(), "第1章");
    }

    #[tokio::test]
    async fn test_create_rejects_blank_fields_before_mutation() {
        let (storage, repo) = repository();

        let result = repo.create(CreateNovel::new("   ", "Herbert")).await;
        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));

        let result = repo.create(CreateNovel::new("Dune", "")).await;
        assert!(matches!(result, Err(ApplicationError::ValidationError(_))));

        assert!(repo.is_empty().await);
        assert_eq!(storage.write_count(), 0);
    }

    #[tokio::test]
    async fn test_update_unknown_novel_returns_false() {
        let (storage, repo) = repository();

        let patch = NovelPatch {
            name: Some("x".to_string()),
            ..Default::default()
        };
        assert!(!repo.update(&NovelId::from("missing"), patch).await.unwrap());
        assert_eq!(storage.write_count(), 0);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let (storage, repo) = repository();
        let novel = repo
            .create(CreateNovel::new("Dune", "Herbert").with_description("Spice"))
            .await
            .unwrap();

        let patch = NovelPatch {
            name: Some("Dune Messiah".to_string()),
            ..Default::default()
        };
        assert!(repo.update(novel.id(), patch).await.unwrap());

        let updated = repo.get(novel.id()).await.unwrap();
        assert_eq!(updated.name().as_str(), "Dune Messiah");
        assert_eq!(updated.author().as_str(), "Herbert");
        assert_eq!(updated.description().unwrap().as_str(), "Spice");
        assert_eq!(storage.write_count(), 2);
    }

    #[tokio::test]
    async fn test_delete_clears_active() {
        let (_storage, repo) = repository();
        let novel = repo.create(CreateNovel::new("Dune", "Herbert")).await.unwrap();

        assert!(repo.set_active(novel.id()).await);
        assert_eq!(repo.active_novel_id().await.as_ref(), Some(novel.id()));

        assert!(repo.delete(novel.id()).await.unwrap());
        assert!(repo.active_novel().await.is_none());
        assert!(!repo.delete(novel.id()).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_active_unknown() {
        let (_storage, repo) = repository();
        assert!(!repo.set_active(&NovelId::from("missing")).await);
        assert!(repo.active_novel_id().await.is_none());
    }

    #[tokio::test]
    async fn test_load_keeps_memory_on_failure() {
        let (storage, repo) = repository();
        repo.create(CreateNovel::new("Dune", "Herbert")).await.unwrap();

        storage.fail_reads(true);
        assert!(repo.load().await.is_err());
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_load_replaces_memory() {
        let (storage, repo) = repository();
        let other = DraftRepository::new(storage.clone(), Arc::new(StaticLocalizer::new("en")));
        other.create(CreateNovel::new("A", "B")).await.unwrap();
        other.create(CreateNovel::new("C", "D")).await.unwrap();

        assert_eq!(repo.load().await.unwrap(), 2);
        let names: Vec<String> = repo.list().await.iter().map(|n| n.name().to_string()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[tokio::test]
    async fn test_persist_failure_is_surfaced() {
        let (storage, repo) = repository();
        storage.fail_writes(true);

        let result = repo.create(CreateNovel::new("Dune", "Herbert")).await;
        assert!(matches!(result, Err(ApplicationError::IoError(_))));
        // 内存中的修改保留，等待下一次持久化
        assert_eq!(repo.len().await, 1);
    }
}
