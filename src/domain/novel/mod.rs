//! Novel Context - 小说限界上下文
//!
//! 职责:
//! - 小说聚合管理
//! - 章节实体（正文、字数）
//! - 名称/作者/简介校验

mod aggregate;
mod entities;
mod errors;
mod value_objects;

pub use aggregate::{Novel, NovelChanges};
pub use entities::{count_words, Chapter};
pub use errors::NovelError;
pub use value_objects::{AuthorName, ChapterId, Description, NovelId, NovelName};
