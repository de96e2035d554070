//! Persistence Layer - 数据持久化
//!
//! 单文件 JSON 存储实现

pub mod json;

pub use self::json::{JsonFileStorage, StorageContext};
