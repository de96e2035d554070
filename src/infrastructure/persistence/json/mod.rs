//! JSON 文件持久化

mod context;
mod storage;

pub use context::{platform_data_dir, StorageContext, DEFAULT_FILE_NAME};
pub use storage::{ensure_directory, read_collection, write_collection, JsonFileStorage};
