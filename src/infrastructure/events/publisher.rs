//! Notification Publisher
//!
//! 通过 broadcast 通道把保存提示等通知推送给订阅者（UI、CLI、测试）

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::application::ports::{Notification, NotificationLevel, NotificationSinkPort};

const CHANNEL_CAPACITY: usize = 100;

/// 通知发布器
pub struct NotificationPublisher {
    channel: broadcast::Sender<Notification>,
}

impl NotificationPublisher {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { channel: tx }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅通知
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.channel.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.channel.receiver_count()
    }
}

impl Default for NotificationPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSinkPort for NotificationPublisher {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => tracing::error!(message = %notification.message, "Notification"),
            NotificationLevel::Warning => tracing::warn!(message = %notification.message, "Notification"),
            NotificationLevel::Info | NotificationLevel::Success => {
                tracing::info!(message = %notification.message, level = ?notification.level, "Notification")
            }
        }

        if let Err(e) = self.channel.send(notification) {
            tracing::debug!(error = %e, "Notification dropped (no receivers)");
        }
    }
}
