//! Novel Context - Value Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::NovelError;

/// 小说唯一标识
///
/// 新建时使用 UUID v4 文本；从磁盘读取时接受任意字符串（兼容旧数据的时间戳 ID）。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NovelId(String);

impl NovelId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NovelId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for NovelId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NovelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for NovelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 章节唯一标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChapterId(String);

impl ChapterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ChapterId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ChapterId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ChapterId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ChapterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 小说名称
///
/// 去除首尾空白后不能为空，且不超过 100 个字符
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NovelName(String);

impl NovelName {
    pub const MAX_CHARS: usize = 100;

    pub fn new(name: impl AsRef<str>) -> Result<Self, NovelError> {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(NovelError::EmptyName);
        }
        if name.chars().count() > Self::MAX_CHARS {
            return Err(NovelError::NameTooLong(Self::MAX_CHARS));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NovelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 作者名称
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorName(String);

impl AuthorName {
    pub const MAX_CHARS: usize = 50;

    pub fn new(author: impl AsRef<str>) -> Result<Self, NovelError> {
        let author = author.as_ref().trim();
        if author.is_empty() {
            return Err(NovelError::EmptyAuthor);
        }
        if author.chars().count() > Self::MAX_CHARS {
            return Err(NovelError::AuthorTooLong(Self::MAX_CHARS));
        }
        Ok(Self(author.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AuthorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 小说简介（可选）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Description(String);

impl Description {
    pub const MAX_CHARS: usize = 500;

    /// 解析可选简介，空白简介视为未填写
    pub fn parse(description: Option<&str>) -> Result<Option<Self>, NovelError> {
        let Some(description) = description else {
            return Ok(None);
        };
        if description.trim().is_empty() {
            return Ok(None);
        }
        if description.chars().count() > Self::MAX_CHARS {
            return Err(NovelError::DescriptionTooLong(Self::MAX_CHARS));
        }
        Ok(Some(Self(description.to_string())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_trimmed() {
        let name = NovelName::new("  Dune  ").unwrap();
        assert_eq!(name.as_str(), "Dune");
    }

    #[test]
    fn test_name_rejects_blank_and_long() {
        assert_eq!(NovelName::new("   "), Err(NovelError::EmptyName));
        let long = "长".repeat(NovelName::MAX_CHARS + 1);
        assert_eq!(NovelName::new(long), Err(NovelError::NameTooLong(100)));
        // 按字符计数而不是字节
        assert!(NovelName::new("长".repeat(NovelName::MAX_CHARS)).is_ok());
    }

    #[test]
    fn test_author_limits() {
        assert_eq!(AuthorName::new(""), Err(NovelError::EmptyAuthor));
        assert_eq!(
            AuthorName::new("a".repeat(51)),
            Err(NovelError::AuthorTooLong(50))
        );
        assert_eq!(AuthorName::new(" Herbert ").unwrap().as_str(), "Herbert");
    }

    #[test]
    fn test_description_parse() {
        assert_eq!(Description::parse(None), Ok(None));
        assert_eq!(Description::parse(Some("  ")), Ok(None));
        assert_eq!(
            Description::parse(Some("x".repeat(501).as_str())),
            Err(NovelError::DescriptionTooLong(500))
        );
        let parsed = Description::parse(Some("沙丘")).unwrap().unwrap();
        assert_eq!(parsed.as_str(), "沙丘");
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(NovelId::new(), NovelId::new());
        assert_ne!(ChapterId::new(), ChapterId::new());
        assert_eq!(NovelId::from("1700000000000").as_str(), "1700000000000");
    }
}
