//! NovelBox - 小说草稿本地持久化与自动保存
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Novel Context: 小说、章节及其约束
//! - Reorder: 拖拽排序
//!
//! 应用层 (application/):
//! - Ports: 存储、目录选择、通知、本地化、文本生成
//! - Commands: 写操作输入
//! - Services: DraftRepository, NovelService, ChapterService, AutosaveScheduler, LlmService
//!
//! 基础设施层 (infrastructure/):
//! - Persistence: 单文件 JSON 存储
//! - Memory: 内存存储
//! - Adapters: 目录选择器, OpenAI / Gemini 客户端
//! - Events: 通知发布
//! - I18n: 内置 zh / en 文案

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
