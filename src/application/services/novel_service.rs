//! Novel Service - 小说级别的写操作
//!
//! 包装 `DraftRepository` 的创建/修改/删除并发出通知。
//! 删除当前小说前先关闭它的章节，避免自动保存任务继续写盘。

use std::sync::Arc;

use crate::application::commands::{CreateNovel, NovelPatch};
use crate::application::error::ApplicationError;
use crate::application::ports::{keys, LocalizerPort, Notification, NotificationSinkPort};
use crate::application::services::{ChapterService, DraftRepository};
use crate::domain::novel::{Novel, NovelId};

/// 小说服务
pub struct NovelService {
    chapters: Arc<ChapterService>,
    notifier: Arc<dyn NotificationSinkPort>,
    localizer: Arc<dyn LocalizerPort>,
}

impl NovelService {
    pub fn new(chapters: Arc<ChapterService>, notifier: Arc<dyn NotificationSinkPort>) -> Self {
        let localizer = chapters.repository().localizer().clone();
        Self {
            chapters,
            notifier,
            localizer,
        }
    }

    pub fn chapters(&self) -> &Arc<ChapterService> {
        &self.chapters
    }

    fn repo(&self) -> &Arc<DraftRepository> {
        self.chapters.repository()
    }

    pub async fn list(&self) -> Vec<Novel> {
        self.repo().list().await
    }

    pub async fn create(&self, command: CreateNovel) -> Result<Novel, ApplicationError> {
        let novel = self.repo().create(command).await?;
        self.notify_success(keys::NOVEL_CREATED);
        Ok(novel)
    }

    pub async fn update(&self, novel_id: &NovelId, patch: NovelPatch) -> Result<bool, ApplicationError> {
        let updated = self.repo().update(novel_id, patch).await?;
        if updated {
            self.notify_success(keys::NOVEL_UPDATED);
        }
        Ok(updated)
    }

    /// 删除小说；若为当前小说，先关闭当前章节（保存未保存的编辑）
    pub async fn delete(&self, novel_id: &NovelId) -> Result<bool, ApplicationError> {
        if self.repo().active_novel_id().await.as_ref() == Some(novel_id) {
            self.chapters.close_novel().await;
            tracing::debug!(novel_id = %novel_id, "Closed active novel before delete");
        }

        let deleted = self.repo().delete(novel_id).await?;
        if deleted {
            self.notify_success(keys::NOVEL_DELETED);
        }
        Ok(deleted)
    }

    fn notify_success(&self, key: &str) {
        self.notifier
            .notify(Notification::success(self.localizer.text(key)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::AutosavePolicy;
    use crate::domain::novel::{AuthorName, NovelName};
    use crate::infrastructure::events::NotificationPublisher;
    use crate::infrastructure::i18n::StaticLocalizer;
    use crate::infrastructure::memory::InMemoryNovelStorage;
    use std::time::Duration;
    use tokio::sync::broadcast;

    fn seeded(name: &str) -> Novel {
        Novel::new(
            NovelName::new(name).unwrap(),
            AuthorName::new("Herbert").unwrap(),
            None,
            "Chapter 1",
        )
    }

    async fn service_with(
        storage: Arc<InMemoryNovelStorage>,
        locale: &str,
    ) -> (NovelService, broadcast::Receiver<Notification>) {
        let repo = DraftRepository::new(storage, Arc::new(StaticLocalizer::new(locale))).arc();
        repo.load().await.unwrap();
        let publisher = NotificationPublisher::new().arc();
        let notifications = publisher.subscribe();
        let chapters = ChapterService::new(repo, publisher.clone(), AutosavePolicy::default()).arc();
        (NovelService::new(chapters, publisher), notifications)
    }

    fn messages(notifications: &mut broadcast::Receiver<Notification>) -> Vec<String> {
        let mut received = Vec::new();
        while let Ok(notification) = notifications.try_recv() {
            received.push(notification.message);
        }
        received
    }

    #[tokio::test]
    async fn test_create_update_delete_notify() {
        let storage = Arc::new(InMemoryNovelStorage::new());
        let (service, mut notifications) = service_with(storage.clone(), "en").await;

        let novel = service.create(CreateNovel::new("Dune", "Herbert")).await.unwrap();
        let patch = NovelPatch {
            name: Some("Dune Messiah".to_string()),
            ..Default::default()
        };
        assert!(service.update(novel.id(), patch).await.unwrap());
        assert!(!service
            .update(&NovelId::from("missing"), NovelPatch::default())
            .await
            .unwrap());
        assert!(service.delete(novel.id()).await.unwrap());
        assert!(!service.delete(novel.id()).await.unwrap());

        assert_eq!(
            messages(&mut notifications),
            vec!["Novel created", "Novel updated", "Novel deleted"]
        );
        assert!(storage.stored().is_empty());
    }

    #[tokio::test]
    async fn test_messages_follow_locale() {
        let storage = Arc::new(InMemoryNovelStorage::new());
        let (service, mut notifications) = service_with(storage, "zh").await;

        service.create(CreateNovel::new("沙丘", "赫伯特")).await.unwrap();
        assert_eq!(messages(&mut notifications), vec!["小说已创建"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_active_novel_stops_autosave() {
        let storage = Arc::new(InMemoryNovelStorage::with_novels(vec![seeded("Dune")]));
        let (service, _notifications) = service_with(storage.clone(), "en").await;
        let novel_id = service.list().await[0].id().clone();

        assert!(service.chapters().open_novel(&novel_id).await.unwrap());
        assert!(service.delete(&novel_id).await.unwrap());
        assert!(service.chapters().autosave_status().await.is_none());
        assert!(service.chapters().current_chapter().await.is_none());

        let writes = storage.write_count();
        tokio::time::sleep(Duration::from_secs(95)).await;
        assert_eq!(storage.write_count(), writes);
        assert!(storage.stored().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_other_novel_keeps_open_chapter() {
        let storage = Arc::new(InMemoryNovelStorage::with_novels(vec![
            seeded("Dune"),
            seeded("Emma"),
        ]));
        let (service, _notifications) = service_with(storage, "en").await;
        let novels = service.list().await;

        service.chapters().open_novel(novels[0].id()).await.unwrap();
        assert!(service.delete(novels[1].id()).await.unwrap());
        assert!(service.chapters().current_chapter().await.is_some());

        service.chapters().close_novel().await;
    }
}
