//! Static Localizer - 内置 zh / en 文案
//!
//! 未知 key 先回退到英文，再回退到 key 本身

use crate::application::ports::{keys, LocalizerPort};

/// 支持的语言
pub const SUPPORTED_LOCALES: &[&str] = &["zh", "en"];

const FALLBACK_LOCALE: &str = "en";

const ZH: &[(&str, &str)] = &[
    (keys::NEW_CHAPTER_TITLE, "第{number}章"),
    (keys::CHAPTER_CREATED, "章节已创建"),
    (keys::CHAPTER_DELETED, "章节已删除"),
    (keys::CHAPTER_TITLE_UPDATED, "章节标题已更新"),
    (keys::CHAPTERS_REORDERED, "章节顺序已更新"),
    (keys::AT_LEAST_ONE_CHAPTER, "小说至少需要保留一个章节"),
    (keys::AUTO_SAVE_INDICATOR, "已自动保存"),
    (keys::AUTO_SAVE_FAILED, "自动保存失败：{error}"),
    (keys::NOVEL_CREATED, "小说已创建"),
    (keys::NOVEL_UPDATED, "小说信息已更新"),
    (keys::NOVEL_DELETED, "小说已删除"),
];

const EN: &[(&str, &str)] = &[
    (keys::NEW_CHAPTER_TITLE, "Chapter {number}"),
    (keys::CHAPTER_CREATED, "Chapter created"),
    (keys::CHAPTER_DELETED, "Chapter deleted"),
    (keys::CHAPTER_TITLE_UPDATED, "Chapter title updated"),
    (keys::CHAPTERS_REORDERED, "Chapters reordered"),
    (keys::AT_LEAST_ONE_CHAPTER, "A novel must have at least one chapter"),
    (keys::AUTO_SAVE_INDICATOR, "Auto-saved"),
    (keys::AUTO_SAVE_FAILED, "Auto-save failed: {error}"),
    (keys::NOVEL_CREATED, "Novel created"),
    (keys::NOVEL_UPDATED, "Novel updated"),
    (keys::NOVEL_DELETED, "Novel deleted"),
];

/// 把任意语言标签归一到支持的语言（`zh-CN` -> `zh`，未知 -> `en`）
pub fn normalize_locale(tag: &str) -> &'static str {
    let tag = tag.trim().to_ascii_lowercase();
    if tag.starts_with("zh") {
        "zh"
    } else {
        FALLBACK_LOCALE
    }
}

pub fn is_supported(locale: &str) -> bool {
    SUPPORTED_LOCALES.contains(&locale)
}

/// 内置文案的 Localizer
#[derive(Debug, Clone)]
pub struct StaticLocalizer {
    locale: &'static str,
}

impl StaticLocalizer {
    pub fn new(locale: &str) -> Self {
        Self {
            locale: normalize_locale(locale),
        }
    }

    fn bundle(locale: &str) -> &'static [(&'static str, &'static str)] {
        match locale {
            "zh" => ZH,
            _ => EN,
        }
    }

    fn lookup(locale: &str, key: &str) -> Option<&'static str> {
        Self::bundle(locale)
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }
}

impl Default for StaticLocalizer {
    fn default() -> Self {
        Self::new("zh")
    }
}

impl LocalizerPort for StaticLocalizer {
    fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        let template = Self::lookup(self.locale, key)
            .or_else(|| Self::lookup(FALLBACK_LOCALE, key))
            .unwrap_or(key);

        params
            .iter()
            .fold(template.to_string(), |text, (name, value)| {
                text.replace(&format!("{{{name}}}"), value)
            })
    }

    fn locale(&self) -> &str {
        self.locale
    }
}
