//! Novel Context - Errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NovelError {
    #[error("小说名称不能为空")]
    EmptyName,

    #[error("小说名称不能超过{0}个字符")]
    NameTooLong(usize),

    #[error("作者名称不能为空")]
    EmptyAuthor,

    #[error("作者名称不能超过{0}个字符")]
    AuthorTooLong(usize),

    #[error("简介不能超过{0}个字符")]
    DescriptionTooLong(usize),

    #[error("章节标题不能为空")]
    EmptyChapterTitle,

    #[error("至少需要保留一个章节")]
    LastChapter,
}
