//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod llm;
pub mod picker;

pub use llm::{build_text_generators, GeminiClient, OpenAiClient, ProviderSettings};
pub use picker::{FixedDirectoryPicker, StdinDirectoryPicker};
