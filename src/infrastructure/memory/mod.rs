//! Memory Layer - 内存实现
//!
//! 不落盘的存储端口实现，用于测试和演示

mod novel_storage;

pub use novel_storage::InMemoryNovelStorage;
