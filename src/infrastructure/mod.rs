//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现

pub mod adapters;
pub mod events;
pub mod i18n;
pub mod memory;
pub mod persistence;

pub use events::NotificationPublisher;
pub use i18n::StaticLocalizer;
pub use memory::InMemoryNovelStorage;
pub use persistence::{JsonFileStorage, StorageContext};
