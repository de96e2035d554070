//! Chapter Commands

use crate::domain::novel::ChapterId;
use crate::domain::DropPosition;

/// 拖拽排序章节命令
#[derive(Debug, Clone)]
pub struct ReorderChapters {
    pub dragged: ChapterId,
    pub target: ChapterId,
    pub position: DropPosition,
}

impl ReorderChapters {
    pub fn new(
        dragged: impl Into<ChapterId>,
        target: impl Into<ChapterId>,
        position: DropPosition,
    ) -> Self {
        Self {
            dragged: dragged.into(),
            target: target.into(),
            position,
        }
    }
}
