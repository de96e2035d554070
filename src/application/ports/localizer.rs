//! Localizer Port - 文案本地化

/// 消息 key
pub mod keys {
    pub const NEW_CHAPTER_TITLE: &str = "chapters.newChapterTitle";
    pub const CHAPTER_CREATED: &str = "chapters.created";
    pub const CHAPTER_DELETED: &str = "chapters.deleted";
    pub const CHAPTER_TITLE_UPDATED: &str = "chapters.titleUpdated";
    pub const CHAPTERS_REORDERED: &str = "chapters.reordered";
    pub const AT_LEAST_ONE_CHAPTER: &str = "chapters.atLeastOneChapter";
    pub const AUTO_SAVE_INDICATOR: &str = "editor.autoSaveIndicator";
    pub const AUTO_SAVE_FAILED: &str = "editor.autoSaveFailed";
    pub const NOVEL_CREATED: &str = "novels.created";
    pub const NOVEL_UPDATED: &str = "novels.updated";
    pub const NOVEL_DELETED: &str = "novels.deleted";
}

/// Localizer Port
///
/// 把消息 key 和参数映射为展示文本，参数以 `{name}` 占位
pub trait LocalizerPort: Send + Sync {
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String;

    /// 无参数消息
    fn text(&self, key: &str) -> String {
        self.translate(key, &[])
    }

    /// 当前语言
    fn locale(&self) -> &str;
}
