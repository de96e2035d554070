//! Autosave Scheduler - 自动保存状态机
//!
//! 状态: Idle / Pending / Saving
//!
//! - 编辑: 进入 Pending，重置防抖计时器
//! - 防抖到期（仅 Pending）: 保存，完成后回到 Idle
//! - 兜底定时器: 不在 Pending 时，若有未保存的编辑或最近一个周期内没有成功保存则保存
//! - 刷新 / 关闭: 有未保存的编辑时立即保存；`stop` 返回后不会再有任何计时器触发
//!
//! 每个打开的章节对应一个调度任务。编辑在成功保存之前一直算作未保存，
//! 失败的保存由下一次兜底、刷新或关闭重试。

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::application::error::ApplicationError;
use crate::application::ports::{keys, LocalizerPort, Notification, NotificationSinkPort};
use crate::application::services::Persister;
use crate::domain::novel::ChapterId;

/// 自动保存时间策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutosavePolicy {
    /// 最后一次编辑后的等待时间
    pub debounce: Duration,
    /// 兜底保存周期
    pub backstop: Duration,
}

impl Default for AutosavePolicy {
    fn default() -> Self {
        Self {
            debounce: Duration::from_secs(2),
            backstop: Duration::from_secs(30),
        }
    }
}

/// 调度器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AutosaveState {
    Idle,
    Pending,
    Saving,
}

impl AutosaveState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutosaveState::Idle => "idle",
            AutosaveState::Pending => "pending",
            AutosaveState::Saving => "saving",
        }
    }
}

/// 可观察的调度器状态快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutosaveStatus {
    pub chapter_id: ChapterId,
    pub state: AutosaveState,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub save_count: u64,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    /// 存在尚未成功保存的编辑
    pub dirty: bool,
}

impl AutosaveStatus {
    fn new(chapter_id: ChapterId) -> Self {
        Self {
            chapter_id,
            state: AutosaveState::Idle,
            last_saved_at: None,
            save_count: 0,
            consecutive_failures: 0,
            last_error: None,
            dirty: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum SaveTrigger {
    Debounce,
    Backstop,
    Flush,
    Close,
}

impl SaveTrigger {
    fn as_str(&self) -> &'static str {
        match self {
            SaveTrigger::Debounce => "debounce",
            SaveTrigger::Backstop => "backstop",
            SaveTrigger::Flush => "flush",
            SaveTrigger::Close => "close",
        }
    }
}

/// 停止调度时未保存编辑的去向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// 没有未保存的编辑
    Clean,
    /// 关闭时保存成功
    Saved,
    /// 关闭时保存失败，编辑仍只在内存中
    Failed,
}

enum AutosaveCommand {
    Edit,
    Flush(oneshot::Sender<Result<(), ApplicationError>>),
    Stop,
}

/// 调度任务的句柄
///
/// 丢弃句柄等同于 `stop`（任务在通道关闭后退出），但不会等待任务结束
pub struct AutosaveHandle {
    chapter_id: ChapterId,
    commands: mpsc::UnboundedSender<AutosaveCommand>,
    status: watch::Receiver<AutosaveStatus>,
    task: JoinHandle<CloseOutcome>,
}

impl AutosaveHandle {
    pub fn chapter_id(&self) -> &ChapterId {
        &self.chapter_id
    }

    /// 通知一次编辑
    pub fn notify_edit(&self) {
        if self.commands.send(AutosaveCommand::Edit).is_err() {
            tracing::warn!(chapter_id = %self.chapter_id, "Autosave task is gone, edit not scheduled");
        }
    }

    pub fn status(&self) -> AutosaveStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AutosaveStatus> {
        self.status.clone()
    }

    /// 立即保存未保存的编辑（包括之前保存失败的编辑）
    pub async fn flush(&self) -> Result<(), ApplicationError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(AutosaveCommand::Flush(reply))
            .map_err(|_| ApplicationError::invalid_state("autosave task stopped"))?;
        response
            .await
            .map_err(|_| ApplicationError::invalid_state("autosave task stopped"))?
    }

    /// 停止调度并等待任务结束
    pub async fn stop(self) -> CloseOutcome {
        let _ = self.commands.send(AutosaveCommand::Stop);
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(chapter_id = %self.chapter_id, error = %e, "Autosave task failed");
                CloseOutcome::Failed
            }
        }
    }
}

/// 自动保存调度器
pub struct AutosaveScheduler {
    chapter_id: ChapterId,
    policy: AutosavePolicy,
    target: Arc<dyn Persister>,
    notifier: Arc<dyn NotificationSinkPort>,
    localizer: Arc<dyn LocalizerPort>,
    status: watch::Sender<AutosaveStatus>,
    state: AutosaveState,
    dirty: bool,
    last_saved: Option<Instant>,
}

impl AutosaveScheduler {
    /// 为章节启动调度任务
    pub fn spawn(
        chapter_id: ChapterId,
        policy: AutosavePolicy,
        target: Arc<dyn Persister>,
        notifier: Arc<dyn NotificationSinkPort>,
        localizer: Arc<dyn LocalizerPort>,
    ) -> AutosaveHandle {
        let (status_tx, status_rx) = watch::channel(AutosaveStatus::new(chapter_id.clone()));
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let scheduler = Self {
            chapter_id: chapter_id.clone(),
            policy,
            target,
            notifier,
            localizer,
            status: status_tx,
            state: AutosaveState::Idle,
            dirty: false,
            last_saved: None,
        };
        let task = tokio::spawn(scheduler.run(command_rx));

        AutosaveHandle {
            chapter_id,
            commands: command_tx,
            status: status_rx,
            task,
        }
    }

    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<AutosaveCommand>) -> CloseOutcome {
        let debounce = time::sleep(self.policy.debounce);
        tokio::pin!(debounce);

        let mut backstop = time::interval_at(Instant::now() + self.policy.backstop, self.policy.backstop);
        backstop.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::debug!(
            chapter_id = %self.chapter_id,
            debounce_ms = self.policy.debounce.as_millis() as u64,
            backstop_secs = self.policy.backstop.as_secs(),
            "Autosave started"
        );

        let outcome = loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(AutosaveCommand::Edit) => {
                        debounce.as_mut().reset(Instant::now() + self.policy.debounce);
                        self.mark_dirty();
                        self.set_state(AutosaveState::Pending);
                    }
                    Some(AutosaveCommand::Flush(reply)) => {
                        let result = if self.dirty {
                            self.save(SaveTrigger::Flush).await
                        } else {
                            Ok(())
                        };
                        let _ = reply.send(result);
                    }
                    Some(AutosaveCommand::Stop) | None => {
                        if !self.dirty {
                            break CloseOutcome::Clean;
                        }
                        break match self.save(SaveTrigger::Close).await {
                            Ok(()) => CloseOutcome::Saved,
                            Err(_) => CloseOutcome::Failed,
                        };
                    }
                },
                _ = &mut debounce, if self.state == AutosaveState::Pending => {
                    let _ = self.save(SaveTrigger::Debounce).await;
                }
                _ = backstop.tick() => {
                    if self.state != AutosaveState::Pending && (self.dirty || self.backstop_due()) {
                        let _ = self.save(SaveTrigger::Backstop).await;
                    }
                }
            }
        };

        self.set_state(AutosaveState::Idle);
        tracing::debug!(chapter_id = %self.chapter_id, outcome = ?outcome, "Autosave stopped");
        outcome
    }

    fn backstop_due(&self) -> bool {
        self.last_saved
            .map_or(true, |saved| saved.elapsed() >= self.policy.backstop)
    }

    fn set_state(&mut self, state: AutosaveState) {
        self.state = state;
        tracing::trace!(chapter_id = %self.chapter_id, state = state.as_str(), "Autosave state");
        self.status.send_modify(|status| status.state = state);
    }

    fn mark_dirty(&mut self) {
        if !self.dirty {
            self.dirty = true;
            self.status.send_modify(|status| status.dirty = true);
        }
    }

    async fn save(&mut self, trigger: SaveTrigger) -> Result<(), ApplicationError> {
        self.set_state(AutosaveState::Saving);
        let result = self.target.persist().await;
        self.state = AutosaveState::Idle;

        match &result {
            Ok(()) => {
                self.dirty = false;
                self.last_saved = Some(Instant::now());
                self.status.send_modify(|status| {
                    status.state = AutosaveState::Idle;
                    status.dirty = false;
                    status.last_saved_at = Some(Utc::now());
                    status.save_count += 1;
                    status.consecutive_failures = 0;
                    status.last_error = None;
                });
                tracing::debug!(
                    chapter_id = %self.chapter_id,
                    trigger = trigger.as_str(),
                    "Autosaved"
                );
                self.notifier
                    .notify(Notification::success(self.localizer.text(keys::AUTO_SAVE_INDICATOR)));
            }
            Err(e) => {
                let message = e.to_string();
                self.status.send_modify(|status| {
                    status.state = AutosaveState::Idle;
                    status.consecutive_failures += 1;
                    status.last_error = Some(message.clone());
                });
                tracing::warn!(
                    chapter_id = %self.chapter_id,
                    trigger = trigger.as_str(),
                    error = %message,
                    "Autosave failed, edits kept for retry"
                );
                self.notifier.notify(Notification::error(
                    self.localizer
                        .translate(keys::AUTO_SAVE_FAILED, &[("error", message.as_str())]),
                ));
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::NotificationLevel;
    use crate::infrastructure::i18n::StaticLocalizer;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingTarget {
        saves: AtomicUsize,
        fail: AtomicBool,
    }

    impl CountingTarget {
        fn saves(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Persister for CountingTarget {
        async fn persist(&self) -> Result<(), ApplicationError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ApplicationError::IoError("disk full".to_string()));
            }
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        notifications: Mutex<Vec<Notification>>,
    }

    impl RecordingSink {
        fn levels(&self) -> Vec<NotificationLevel> {
            self.notifications.lock().unwrap().iter().map(|n| n.level).collect()
        }

        fn messages(&self) -> Vec<String> {
            self.notifications
                .lock()
                .unwrap()
                .iter()
                .map(|n| n.message.clone())
                .collect()
        }
    }

    impl NotificationSinkPort for RecordingSink {
        fn notify(&self, notification: Notification) {
            self.notifications.lock().unwrap().push(notification);
        }
    }

    fn start(target: &Arc<CountingTarget>, sink: &Arc<RecordingSink>) -> AutosaveHandle {
        AutosaveScheduler::spawn(
            ChapterId::from("chapter-1"),
            AutosavePolicy::default(),
            target.clone(),
            sink.clone(),
            Arc::new(StaticLocalizer::new("en")),
        )
    }

    async fn wait(duration_ms: u64) {
        time::sleep(Duration::from_millis(duration_ms)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_edits_are_debounced_into_one_save() {
        let target = Arc::new(CountingTarget::default());
        let sink = Arc::new(RecordingSink::default());
        let handle = start(&target, &sink);

        for _ in 0..5 {
            handle.notify_edit();
            wait(500).await;
        }
        assert_eq!(target.saves(), 0);
        assert_eq!(handle.status().state, AutosaveState::Pending);

        wait(2_000).await;
        assert_eq!(target.saves(), 1);

        let status = handle.status();
        assert_eq!(status.state, AutosaveState::Idle);
        assert_eq!(status.save_count, 1);
        assert!(status.last_saved_at.is_some());
        assert_eq!(sink.messages(), vec!["Auto-saved".to_string()]);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_flushes_pending_edit_and_cancels_timers() {
        let target = Arc::new(CountingTarget::default());
        let sink = Arc::new(RecordingSink::default());
        let handle = start(&target, &sink);

        handle.notify_edit();
        wait(100).await;
        assert_eq!(handle.stop().await, CloseOutcome::Saved);
        assert_eq!(target.saves(), 1);

        // 超过防抖与兜底周期后不应再有写入
        wait(5_000).await;
        assert_eq!(target.saves(), 1);
        wait(60_000).await;
        assert_eq!(target.saves(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_without_edits_writes_nothing() {
        let target = Arc::new(CountingTarget::default());
        let sink = Arc::new(RecordingSink::default());
        let handle = start(&target, &sink);

        wait(1_000).await;
        assert_eq!(handle.stop().await, CloseOutcome::Clean);

        wait(120_000).await;
        assert_eq!(target.saves(), 0);
        assert!(sink.messages().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_backstop_saves_periodically() {
        let target = Arc::new(CountingTarget::default());
        let sink = Arc::new(RecordingSink::default());
        let handle = start(&target, &sink);

        wait(29_000).await;
        assert_eq!(target.saves(), 0);
        wait(2_000).await;
        assert_eq!(target.saves(), 1);
        wait(30_000).await;
        assert_eq!(target.saves(), 2);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_backstop_skips_after_recent_edit_save() {
        let target = Arc::new(CountingTarget::default());
        let sink = Arc::new(RecordingSink::default());
        let handle = start(&target, &sink);

        // 防抖保存发生在 t=27s，t=30s 的兜底不再保存
        wait(25_000).await;
        handle.notify_edit();
        wait(6_000).await;
        assert_eq!(target.saves(), 1);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_backstop_skips_while_pending() {
        let target = Arc::new(CountingTarget::default());
        let sink = Arc::new(RecordingSink::default());
        let handle = start(&target, &sink);

        // 持续编辑跨过兜底时刻：兜底不抢先保存
        wait(29_000).await;
        for _ in 0..4 {
            handle.notify_edit();
            wait(1_000).await;
        }
        assert_eq!(target.saves(), 0);

        wait(2_000).await;
        assert_eq!(target.saves(), 1);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_save_is_reported_and_retried() {
        let target = Arc::new(CountingTarget::default());
        let sink = Arc::new(RecordingSink::default());
        let handle = start(&target, &sink);

        target.fail.store(true, Ordering::SeqCst);
        handle.notify_edit();
        wait(2_500).await;

        let status = handle.status();
        assert_eq!(status.state, AutosaveState::Idle);
        assert_eq!(status.consecutive_failures, 1);
        assert!(status.last_error.is_some());
        assert_eq!(sink.levels(), vec![NotificationLevel::Error]);
        assert!(sink.messages()[0].contains("disk full"));

        // 下一次兜底重试成功
        target.fail.store(false, Ordering::SeqCst);
        wait(30_000).await;
        assert_eq!(target.saves(), 1);
        assert_eq!(handle.status().consecutive_failures, 0);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_edit_stays_dirty_until_flushed() {
        let target = Arc::new(CountingTarget::default());
        let sink = Arc::new(RecordingSink::default());
        let handle = start(&target, &sink);

        target.fail.store(true, Ordering::SeqCst);
        handle.notify_edit();
        wait(2_500).await;
        assert!(handle.status().dirty);
        assert!(handle.flush().await.is_err());
        assert_eq!(handle.status().consecutive_failures, 2);

        target.fail.store(false, Ordering::SeqCst);
        handle.flush().await.unwrap();
        assert_eq!(target.saves(), 1);
        assert!(!handle.status().dirty);

        // 已保存后刷新不再写入
        handle.flush().await.unwrap();
        assert_eq!(target.saves(), 1);
        assert_eq!(handle.stop().await, CloseOutcome::Clean);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_retries_edit_after_failed_save() {
        let target = Arc::new(CountingTarget::default());
        let sink = Arc::new(RecordingSink::default());
        let handle = start(&target, &sink);

        target.fail.store(true, Ordering::SeqCst);
        handle.notify_edit();
        wait(2_500).await;
        assert_eq!(handle.status().state, AutosaveState::Idle);

        target.fail.store(false, Ordering::SeqCst);
        assert_eq!(handle.stop().await, CloseOutcome::Saved);
        assert_eq!(target.saves(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_reports_failed_close_save() {
        let target = Arc::new(CountingTarget::default());
        let sink = Arc::new(RecordingSink::default());
        let handle = start(&target, &sink);

        target.fail.store(true, Ordering::SeqCst);
        handle.notify_edit();
        assert_eq!(handle.stop().await, CloseOutcome::Failed);
        assert_eq!(sink.levels(), vec![NotificationLevel::Error]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_saves_pending_edit_immediately() {
        let target = Arc::new(CountingTarget::default());
        let sink = Arc::new(RecordingSink::default());
        let handle = start(&target, &sink);

        handle.flush().await.unwrap();
        assert_eq!(target.saves(), 0);

        handle.notify_edit();
        handle.flush().await.unwrap();
        assert_eq!(target.saves(), 1);
        assert_eq!(handle.status().state, AutosaveState::Idle);

        // 防抖计时器不再触发
        wait(3_000).await;
        assert_eq!(target.saves(), 1);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_task() {
        let target = Arc::new(CountingTarget::default());
        let sink = Arc::new(RecordingSink::default());
        let handle = start(&target, &sink);
        let mut status = handle.subscribe();

        drop(handle);
        // 任务退出后 watch 发送端被丢弃
        assert!(status.changed().await.is_err() || status.changed().await.is_err());
        wait(60_000).await;
        assert_eq!(target.saves(), 0);
    }
}
