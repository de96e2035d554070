//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod directory_picker;
mod localizer;
mod notification;
mod storage;
mod text_generator;

pub use directory_picker::DirectoryPickerPort;
pub use localizer::{keys, LocalizerPort};
pub use notification::{Notification, NotificationLevel, NotificationSinkPort};
pub use storage::{NovelStoragePort, StorageError, StorageLocation};
pub use text_generator::{
    GenerationError, GenerationRequest, GenerationResponse, ProviderKind, TextGeneratorPort,
};
