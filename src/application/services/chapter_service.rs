//! Chapter Service - 当前小说的章节操作
//!
//! 负责打开/关闭章节，并为当前打开的章节维护一个自动保存任务。
//!
//! 锁顺序：先 `open`，再仓储内部锁；持有仓储锁时从不等待 `open`。

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::application::commands::ReorderChapters;
use crate::application::error::ApplicationError;
use crate::application::ports::{keys, LocalizerPort, Notification, NotificationSinkPort};
use crate::application::services::autosave::{
    AutosaveHandle, AutosavePolicy, AutosaveScheduler, AutosaveStatus, CloseOutcome,
};
use crate::application::services::DraftRepository;
use crate::domain::novel::{Chapter, ChapterId, NovelError, NovelId};

struct OpenChapter {
    chapter_id: ChapterId,
    autosave: AutosaveHandle,
}

/// 章节服务
pub struct ChapterService {
    repo: Arc<DraftRepository>,
    notifier: Arc<dyn NotificationSinkPort>,
    localizer: Arc<dyn LocalizerPort>,
    policy: AutosavePolicy,
    open: Mutex<Option<OpenChapter>>,
}

impl ChapterService {
    pub fn new(
        repo: Arc<DraftRepository>,
        notifier: Arc<dyn NotificationSinkPort>,
        policy: AutosavePolicy,
    ) -> Self {
        let localizer = repo.localizer().clone();
        Self {
            repo,
            notifier,
            localizer,
            policy,
            open: Mutex::new(None),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn repository(&self) -> &Arc<DraftRepository> {
        &self.repo
    }

    /// 当前小说的章节（没有当前小说时为空）
    pub async fn chapters(&self) -> Vec<Chapter> {
        self.repo
            .active_novel()
            .await
            .map(|novel| novel.chapters().to_vec())
            .unwrap_or_default()
    }

    /// 切换当前小说并打开它的第一章
    pub async fn open_novel(&self, novel_id: &NovelId) -> Result<bool, ApplicationError> {
        self.close_chapter().await;
        if !self.repo.set_active(novel_id).await {
            tracing::debug!(novel_id = %novel_id, "Open skipped, novel not found");
            return Ok(false);
        }

        if let Some(first) = self.chapters().await.into_iter().next() {
            self.open_chapter(first.id()).await?;
        }
        tracing::info!(novel_id = %novel_id, "Novel opened");
        Ok(true)
    }

    /// 关闭当前章节并清除当前小说
    pub async fn close_novel(&self) {
        self.close_chapter().await;
        self.repo.clear_active().await;
    }

    /// 打开章节
    ///
    /// 已打开的章节先停止自动保存并持久化；持久化失败只通知，不阻止切换
    pub async fn open_chapter(&self, chapter_id: &ChapterId) -> Result<bool, ApplicationError> {
        let mut open = self.open.lock().await;

        let exists = self
            .repo
            .active_novel()
            .await
            .is_some_and(|novel| novel.chapter(chapter_id).is_some());
        if !exists {
            tracing::debug!(chapter_id = %chapter_id, "Open skipped, chapter not found");
            return Ok(false);
        }

        if let Some(previous) = open.take() {
            self.leave(previous).await;
        }

        *open = Some(self.start(chapter_id.clone()));
        tracing::info!(chapter_id = %chapter_id, "Chapter opened");
        Ok(true)
    }

    /// 关闭当前章节（未保存的编辑会被保存）
    ///
    /// 调度器关闭时保存失败则再持久化一次，调度器退出后没有其他重试机会
    pub async fn close_chapter(&self) {
        let mut open = self.open.lock().await;
        if let Some(current) = open.take() {
            let chapter_id = current.chapter_id.clone();
            let outcome = current.autosave.stop().await;
            if outcome == CloseOutcome::Failed {
                match self.repo.persist().await {
                    Ok(()) => self.notify_success(keys::AUTO_SAVE_INDICATOR),
                    Err(e) => {
                        tracing::warn!(chapter_id = %chapter_id, error = %e, "Edits left unsaved on close");
                    }
                }
            }
            tracing::info!(chapter_id = %chapter_id, outcome = ?outcome, "Chapter closed");
        }
    }

    /// 当前打开的章节
    pub async fn current_chapter(&self) -> Option<Chapter> {
        let chapter_id = self.open.lock().await.as_ref()?.chapter_id.clone();
        self.repo.active_novel().await?.chapter(&chapter_id).cloned()
    }

    /// 追加新章节，标题为 "第 N+1 章"
    pub async fn add_chapter(&self) -> Result<Option<Chapter>, ApplicationError> {
        let repo = &self.repo;
        let created = repo
            .with_active_novel(|novel| {
                let title = repo.chapter_title(novel.chapter_count() + 1);
                novel.add_chapter(title).clone()
            })
            .await;

        let Some(chapter) = created else {
            return Ok(None);
        };

        self.repo.persist().await?;
        tracing::info!(chapter_id = %chapter.id(), title = chapter.title(), "Chapter created");
        self.notify_success(keys::CHAPTER_CREATED);
        Ok(Some(chapter))
    }

    /// 删除章节
    ///
    /// 最后一章不能删除；删除当前打开的章节后打开第一章
    pub async fn delete_chapter(&self, chapter_id: &ChapterId) -> Result<bool, ApplicationError> {
        let mut open = self.open.lock().await;

        let removed = self
            .repo
            .with_active_novel(|novel| novel.remove_chapter(chapter_id))
            .await;
        match removed {
            None | Some(Ok(false)) => return Ok(false),
            Some(Err(NovelError::LastChapter)) => {
                let message = self.localizer.text(keys::AT_LEAST_ONE_CHAPTER);
                self.notifier.notify(Notification::warning(message.clone()));
                return Err(ApplicationError::business_rule(message));
            }
            Some(Err(e)) => return Err(e.into()),
            Some(Ok(true)) => {}
        }

        if open.as_ref().is_some_and(|current| &current.chapter_id == chapter_id) {
            if let Some(previous) = open.take() {
                previous.autosave.stop().await;
            }
            let first = self
                .repo
                .active_novel()
                .await
                .and_then(|novel| novel.chapters().first().map(|c| c.id().clone()));
            if let Some(first) = first {
                *open = Some(self.start(first));
            }
        }
        drop(open);

        self.repo.persist().await?;
        tracing::info!(chapter_id = %chapter_id, "Chapter deleted");
        self.notify_success(keys::CHAPTER_DELETED);
        Ok(true)
    }

    /// 重命名章节
    pub async fn rename_chapter(
        &self,
        chapter_id: &ChapterId,
        title: &str,
    ) -> Result<bool, ApplicationError> {
        let renamed = self
            .repo
            .with_active_novel(|novel| novel.rename_chapter(chapter_id, title))
            .await
            .transpose()?
            .unwrap_or(false);
        if !renamed {
            return Ok(false);
        }

        self.repo.persist().await?;
        tracing::info!(chapter_id = %chapter_id, "Chapter title updated");
        self.notify_success(keys::CHAPTER_TITLE_UPDATED);
        Ok(true)
    }

    /// 更新当前章节正文
    ///
    /// 不直接写盘，由自动保存调度器决定何时持久化
    pub async fn update_chapter_content(
        &self,
        content: impl Into<String>,
    ) -> Result<bool, ApplicationError> {
        let open = self.open.lock().await;
        let Some(current) = open.as_ref() else {
            return Ok(false);
        };

        let content = content.into();
        let updated = self
            .repo
            .with_active_novel(|novel| novel.update_chapter_content(&current.chapter_id, content))
            .await
            .unwrap_or(false);
        if !updated {
            return Err(ApplicationError::invalid_state(format!(
                "open chapter {} is not part of the active novel",
                current.chapter_id
            )));
        }

        current.autosave.notify_edit();
        Ok(true)
    }

    /// 拖拽排序章节
    pub async fn reorder_chapters(&self, command: ReorderChapters) -> Result<bool, ApplicationError> {
        let moved = self
            .repo
            .with_active_novel(|novel| {
                novel.reorder_chapters(&command.dragged, &command.target, command.position)
            })
            .await
            .unwrap_or(false);
        if !moved {
            tracing::debug!(
                dragged = %command.dragged,
                target = %command.target,
                "Reorder skipped"
            );
            return Ok(false);
        }

        self.repo.persist().await?;
        tracing::info!(
            dragged = %command.dragged,
            target = %command.target,
            position = %command.position,
            "Chapters reordered"
        );
        self.notify_success(keys::CHAPTERS_REORDERED);
        Ok(true)
    }

    /// 当前章节的自动保存状态
    pub async fn autosave_status(&self) -> Option<AutosaveStatus> {
        self.open.lock().await.as_ref().map(|current| current.autosave.status())
    }

    /// 立即保存当前章节挂起的编辑
    pub async fn flush(&self) -> Result<(), ApplicationError> {
        match self.open.lock().await.as_ref() {
            Some(current) => current.autosave.flush().await,
            None => Ok(()),
        }
    }

    fn start(&self, chapter_id: ChapterId) -> OpenChapter {
        let autosave = AutosaveScheduler::spawn(
            chapter_id.clone(),
            self.policy,
            self.repo.clone(),
            self.notifier.clone(),
            self.localizer.clone(),
        );
        OpenChapter { chapter_id, autosave }
    }

    /// 离开章节：停止调度，未在关闭时保存则补一次持久化
    async fn leave(&self, previous: OpenChapter) {
        if previous.autosave.stop().await == CloseOutcome::Saved {
            return;
        }

        match self.repo.persist().await {
            Ok(()) => self.notify_success(keys::AUTO_SAVE_INDICATOR),
            Err(e) => {
                tracing::warn!(chapter_id = %previous.chapter_id, error = %e, "Save on chapter switch failed");
                let error = e.to_string();
                self.notifier.notify(Notification::error(
                    self.localizer
                        .translate(keys::AUTO_SAVE_FAILED, &[("error", error.as_str())]),
                ));
            }
        }
    }

    fn notify_success(&self, key: &str) {
        self.notifier
            .notify(Notification::success(self.localizer.text(key)));
    }
}
