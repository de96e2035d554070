//! Novel Context - Entities

use serde::{Deserialize, Serialize};

use super::{ChapterId, NovelError};

/// 统计字数：按 Unicode 字符计数
///
/// 不是 UTF-16 码元数：BMP 以外的字符（如 emoji）算 1 个，
/// 旧文件里按 UTF-16 记录的 `wordCount` 读取时会被改写
pub fn count_words(content: &str) -> usize {
    content.chars().count()
}

/// 章节
///
/// 不变量:
/// - `word_count` 始终等于 `content` 的字符数，只能通过 `set_content` 修改内容
/// - 从磁盘读取时重新计算 `word_count`，不信任文件中的值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ChapterData")]
pub struct Chapter {
    id: ChapterId,
    title: String,
    content: String,
    word_count: usize,
}

/// 磁盘上的章节结构（wordCount 被忽略）
#[derive(Deserialize)]
struct ChapterData {
    id: ChapterId,
    title: String,
    #[serde(default)]
    content: String,
}

impl From<ChapterData> for Chapter {
    fn from(data: ChapterData) -> Self {
        let word_count = count_words(&data.content);
        Self {
            id: data.id,
            title: data.title,
            content: data.content,
            word_count,
        }
    }
}

impl Chapter {
    /// 创建空章节
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(ChapterId::new(), title)
    }

    pub fn with_id(id: ChapterId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: String::new(),
            word_count: 0,
        }
    }

    /// 替换正文并重新计算字数
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.word_count = count_words(&self.content);
    }

    /// 修改标题（去除首尾空白后不能为空）
    pub fn rename(&mut self, title: &str) -> Result<(), NovelError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(NovelError::EmptyChapterTitle);
        }
        self.title = title.to_string();
        Ok(())
    }

    pub fn id(&self) -> &ChapterId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_follows_content() {
        let mut chapter = Chapter::new("第1章");
        assert_eq!(chapter.word_count(), 0);

        chapter.set_content("Hello world");
        assert_eq!(chapter.word_count(), 11);

        chapter.set_content("你好，世界");
        assert_eq!(chapter.word_count(), 5);

        chapter.set_content("");
        assert_eq!(chapter.word_count(), 0);
    }

    #[test]
    fn test_astral_characters_count_once() {
        let content = "🐉龙";
        assert_eq!(content.encode_utf16().count(), 3);
        assert_eq!(count_words(content), 2);

        // 按 UTF-16 长度写入的旧值在加载时被替换
        let json = r#"{"id":"c1","title":"Intro","content":"🐉龙","wordCount":3}"#;
        let chapter: Chapter = serde_json::from_str(json).unwrap();
        assert_eq!(chapter.word_count(), 2);
    }

    #[test]
    fn test_rename_trims_and_rejects_blank() {
        let mut chapter = Chapter::new("old");
        chapter.rename("  序章  ").unwrap();
        assert_eq!(chapter.title(), "序章");

        assert_eq!(chapter.rename("   "), Err(NovelError::EmptyChapterTitle));
        assert_eq!(chapter.title(), "序章");
    }

    #[test]
    fn test_stale_word_count_is_recomputed_on_load() {
        let json = r#"{"id":"c1","title":"Intro","content":"abc","wordCount":999}"#;
        let chapter: Chapter = serde_json::from_str(json).unwrap();
        assert_eq!(chapter.word_count(), 3);
        assert_eq!(chapter.id().as_str(), "c1");
    }

    #[test]
    fn test_serialized_field_names() {
        let mut chapter = Chapter::with_id(ChapterId::from("c1"), "Intro");
        chapter.set_content("hi");
        let value = serde_json::to_value(&chapter).unwrap();
        assert_eq!(value["id"], "c1");
        assert_eq!(value["title"], "Intro");
        assert_eq!(value["content"], "hi");
        assert_eq!(value["wordCount"], 2);
    }
}
