//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（存储、目录选择、通知、本地化、文本生成）
//! - commands: 写操作的输入
//! - services: 草稿仓储、小说服务、章节服务、自动保存、LLM 服务
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod services;

pub use commands::{CreateNovel, NovelPatch, ReorderChapters};
pub use error::ApplicationError;
pub use services::{
    AutosavePolicy, AutosaveState, AutosaveStatus, ChapterService, CloseOutcome, DraftRepository,
    LlmService, NovelService,
};
