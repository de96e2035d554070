//! 应用服务
//!
//! - draft_repository: 内存中的小说集合与持久化
//! - chapter_service: 当前小说的章节操作
//! - autosave: 自动保存调度器
//! - novel_service: 小说的创建、修改、删除与通知
//! - llm_service: 文本生成提供商注册表

pub mod autosave;
mod chapter_service;
mod draft_repository;
mod llm_service;
mod novel_service;

pub use autosave::{
    AutosaveHandle, AutosavePolicy, AutosaveScheduler, AutosaveState, AutosaveStatus, CloseOutcome,
};
pub use chapter_service::ChapterService;
pub use draft_repository::{DraftRepository, Persister};
pub use llm_service::LlmService;
pub use novel_service::NovelService;
