//! Reorder Engine - 列表位置变换
//!
//! 拖拽排序的核心逻辑：先移除被拖拽项，再重新定位目标项，最后插入到目标前/后。
//! 必须在移除之后重新查找目标索引，因为移除会使后续元素左移。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 放置位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    /// 放在目标之前
    Before,
    /// 放在目标之后
    After,
}

impl DropPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            DropPosition::Before => "before",
            DropPosition::After => "after",
        }
    }
}

impl fmt::Display for DropPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DropPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "before" => Ok(DropPosition::Before),
            "after" => Ok(DropPosition::After),
            other => Err(format!("invalid drop position: {}", other)),
        }
    }
}

/// 按 key 将 `dragged` 移动到 `target` 之前或之后
///
/// 返回 `false`（列表保持不变）的情况:
/// - `dragged` 与 `target` 相同
/// - 任一 key 不在列表中
pub fn reorder_by_key<T, K, F>(
    items: &mut Vec<T>,
    dragged: &K,
    target: &K,
    position: DropPosition,
    key: F,
) -> bool
where
    K: PartialEq + ?Sized,
    F: Fn(&T) -> &K,
{
    if dragged == target {
        return false;
    }

    let Some(dragged_index) = items.iter().position(|item| key(item) == dragged) else {
        return false;
    };
    if !items.iter().any(|item| key(item) == target) {
        return false;
    }

    let item = items.remove(dragged_index);

    // 移除后重新定位目标
    let Some(target_index) = items.iter().position(|i| key(i) == target) else {
        items.insert(dragged_index, item);
        return false;
    };

    let insert_at = match position {
        DropPosition::Before => target_index,
        DropPosition::After => target_index + 1,
    };
    items.insert(insert_at, item);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn reorder(items: &mut Vec<String>, dragged: &str, target: &str, position: DropPosition) -> bool {
        reorder_by_key(items, dragged, target, position, |s| s.as_str())
    }

    #[test]
    fn test_move_forward_after_target() {
        let mut items = list(&["a", "b", "c", "d"]);
        assert!(reorder(&mut items, "a", "c", DropPosition::After));
        assert_eq!(items, list(&["b", "c", "a", "d"]));
    }

    #[test]
    fn test_move_forward_before_target() {
        // 目标在被拖拽项之后，移除后目标索引左移一位
        let mut items = list(&["a", "b", "c", "d"]);
        assert!(reorder(&mut items, "a", "c", DropPosition::Before));
        assert_eq!(items, list(&["b", "a", "c", "d"]));
    }

    #[test]
    fn test_move_backward() {
        let mut items = list(&["a", "b", "c", "d"]);
        assert!(reorder(&mut items, "d", "b", DropPosition::Before));
        assert_eq!(items, list(&["a", "d", "b", "c"]));

        let mut items = list(&["a", "b", "c", "d"]);
        assert!(reorder(&mut items, "d", "a", DropPosition::After));
        assert_eq!(items, list(&["a", "d", "b", "c"]));
    }

    #[test]
    fn test_move_to_end() {
        let mut items = list(&["a", "b", "c"]);
        assert!(reorder(&mut items, "a", "c", DropPosition::After));
        assert_eq!(items, list(&["b", "c", "a"]));
    }

    #[test]
    fn test_same_id_is_noop() {
        let mut items = list(&["a", "b"]);
        assert!(!reorder(&mut items, "a", "a", DropPosition::After));
        assert_eq!(items, list(&["a", "b"]));
    }

    #[test]
    fn test_missing_ids_are_noop() {
        let mut items = list(&["a", "b", "c"]);
        assert!(!reorder(&mut items, "x", "b", DropPosition::Before));
        assert!(!reorder(&mut items, "a", "x", DropPosition::After));
        assert_eq!(items, list(&["a", "b", "c"]));
    }

    #[test]
    fn test_after_then_before_restores_relative_order() {
        let pos = |items: &Vec<String>, id: &str| items.iter().position(|s| s == id);

        for (dragged, target) in [("a", "b"), ("a", "c"), ("b", "d"), ("a", "d")] {
            let mut items = list(&["a", "b", "c", "d"]);

            assert!(reorder(&mut items, dragged, target, DropPosition::After));
            assert!(pos(&items, dragged) > pos(&items, target));

            assert!(reorder(&mut items, dragged, target, DropPosition::Before));
            // dragged 紧邻在 target 之前
            assert_eq!(pos(&items, dragged).map(|i| i + 1), pos(&items, target));
            assert_eq!(items.len(), 4);
        }
    }

    #[test]
    fn test_parse_position() {
        assert_eq!("before".parse::<DropPosition>().unwrap(), DropPosition::Before);
        assert_eq!(" AFTER ".parse::<DropPosition>().unwrap(), DropPosition::After);
        assert!("middle".parse::<DropPosition>().is_err());
    }
}
