//! Domain Layer - 领域层
//!
//! - Novel Context: 小说与章节
//! - Reorder Engine: 拖拽排序

pub mod novel;

mod reorder;

pub use reorder::{reorder_by_key, DropPosition};
