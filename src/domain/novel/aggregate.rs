//! Novel Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AuthorName, Chapter, ChapterId, Description, NovelError, NovelId, NovelName};
use crate::domain::reorder::{reorder_by_key, DropPosition};

/// 已校验的小说信息变更
///
/// `description`/`cover` 使用双层 Option：外层 None 表示不修改，`Some(None)` 表示清空
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NovelChanges {
    pub name: Option<NovelName>,
    pub author: Option<AuthorName>,
    pub description: Option<Option<Description>>,
    pub cover: Option<Option<String>>,
}

impl NovelChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.author.is_none()
            && self.description.is_none()
            && self.cover.is_none()
    }
}

/// Novel 聚合根
///
/// 不变量:
/// - 至少包含一个章节
/// - ID 创建后不可变
/// - 章节顺序即 `chapters` 中的顺序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Novel {
    id: NovelId,
    name: NovelName,
    author: AuthorName,
    #[serde(default)]
    description: Option<Description>,
    #[serde(default)]
    cover: Option<String>,
    #[serde(default)]
    chapters: Vec<Chapter>,
    created_at: DateTime<Utc>,
}

impl Novel {
    /// 创建新小说，附带一个空的初始章节
    pub fn new(
        name: NovelName,
        author: AuthorName,
        description: Option<Description>,
        first_chapter_title: impl Into<String>,
    ) -> Self {
        Self {
            id: NovelId::new(),
            name,
            author,
            description,
            cover: None,
            chapters: vec![Chapter::new(first_chapter_title)],
            created_at: Utc::now(),
        }
    }

    /// 合并信息变更
    pub fn apply(&mut self, changes: NovelChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(author) = changes.author {
            self.author = author;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(cover) = changes.cover {
            self.cover = cover;
        }
    }

    /// 追加章节
    pub fn add_chapter(&mut self, title: impl Into<String>) -> &Chapter {
        self.chapters.push(Chapter::new(title));
        let last = self.chapters.len() - 1;
        &self.chapters[last]
    }

    /// 删除章节
    ///
    /// 章节不存在时返回 `Ok(false)`；删除最后一个章节返回 `NovelError::LastChapter`
    pub fn remove_chapter(&mut self, chapter_id: &ChapterId) -> Result<bool, NovelError> {
        let Some(index) = self.chapters.iter().position(|c| c.id() == chapter_id) else {
            return Ok(false);
        };
        if self.chapters.len() <= 1 {
            return Err(NovelError::LastChapter);
        }
        self.chapters.remove(index);
        Ok(true)
    }

    /// 修改章节标题
    pub fn rename_chapter(&mut self, chapter_id: &ChapterId, title: &str) -> Result<bool, NovelError> {
        if title.trim().is_empty() {
            return Err(NovelError::EmptyChapterTitle);
        }
        match self.chapter_mut(chapter_id) {
            Some(chapter) => {
                chapter.rename(title)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// 替换章节正文
    pub fn update_chapter_content(&mut self, chapter_id: &ChapterId, content: impl Into<String>) -> bool {
        match self.chapter_mut(chapter_id) {
            Some(chapter) => {
                chapter.set_content(content);
                true
            }
            None => false,
        }
    }

    /// 拖拽排序章节
    pub fn reorder_chapters(
        &mut self,
        dragged: &ChapterId,
        target: &ChapterId,
        position: DropPosition,
    ) -> bool {
        reorder_by_key(&mut self.chapters, dragged, target, position, |c| c.id())
    }

    /// 修复没有章节的小说（仅用于加载旧数据）
    pub fn ensure_chapter(&mut self, title: impl Into<String>) -> bool {
        if self.chapters.is_empty() {
            self.chapters.push(Chapter::new(title));
            return true;
        }
        false
    }

    fn chapter_mut(&mut self, chapter_id: &ChapterId) -> Option<&mut Chapter> {
        self.chapters.iter_mut().find(|c| c.id() == chapter_id)
    }

    // Getters
    pub fn id(&self) -> &NovelId {
        &self.id
    }

    pub fn name(&self) -> &NovelName {
        &self.name
    }

    pub fn author(&self) -> &AuthorName {
        &self.author
    }

    pub fn description(&self) -> Option<&Description> {
        self.description.as_ref()
    }

    pub fn cover(&self) -> Option<&str> {
        self.cover.as_deref()
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter(&self, chapter_id: &ChapterId) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id() == chapter_id)
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    /// 全书字数
    pub fn total_word_count(&self) -> usize {
        self.chapters.iter().map(Chapter::word_count).sum()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
