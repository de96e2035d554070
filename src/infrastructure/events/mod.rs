//! Events - 通知推送

mod publisher;

pub use publisher::NotificationPublisher;
