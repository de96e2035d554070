//! 应用层 - 命令（写操作的输入）

mod chapter_commands;
mod novel_commands;

pub use chapter_commands::*;
pub use novel_commands::*;
