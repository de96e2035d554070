//! Novel Commands

use crate::domain::novel::{AuthorName, Description, NovelChanges, NovelError, NovelName};

/// 创建小说命令
#[derive(Debug, Clone, Default)]
pub struct CreateNovel {
    pub name: String,
    pub author: String,
    pub description: Option<String>,
}

impl CreateNovel {
    pub fn new(name: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            author: author.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// 部分更新小说信息（未设置的字段保持不变）
#[derive(Debug, Clone, Default)]
pub struct NovelPatch {
    pub name: Option<String>,
    pub author: Option<String>,
    /// `Some(None)` 清空简介
    pub description: Option<Option<String>>,
    /// `Some(None)` 清空封面
    pub cover: Option<Option<String>>,
}

impl NovelPatch {
    /// 在修改任何状态之前完成校验
    pub fn validate(self) -> Result<NovelChanges, NovelError> {
        Ok(NovelChanges {
            name: self.name.map(NovelName::new).transpose()?,
            author: self.author.map(AuthorName::new).transpose()?,
            description: self
                .description
                .map(|d| Description::parse(d.as_deref()))
                .transpose()?,
            cover: self
                .cover
                .map(|c| c.filter(|path| !path.trim().is_empty())),
        })
    }
}
