//! 细分维度迁移检测
//!
//! 比较访客上一次记录的资料快照与当前资料，判断哪些维度发生了迁移。
//! 只有新旧两侧都有值且不同才算迁移：
//! - 新增（之前无值）不算迁移，不能扣减不存在的旧分组
//! - 清空（现在无值）不算迁移，旧分组的 unique 计数保留

use super::UserProfileSnapshot;
use super::segment::Dimension;

/// 各维度的迁移结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentMigration {
    pub university: bool,
    pub country: bool,
    pub field_of_study: bool,
}

impl SegmentMigration {
    pub fn detect(previous: Option<&UserProfileSnapshot>, current: &UserProfileSnapshot) -> Self {
        let Some(previous) = previous else {
            return Self::default();
        };

        Self {
            university: Self::dimension_changed(Dimension::University, previous, current),
            country: Self::dimension_changed(Dimension::Country, previous, current),
            field_of_study: Self::dimension_changed(Dimension::FieldOfStudy, previous, current),
        }
    }

    // 大学维度比较的是组合键，仅国家变化也会触发大学迁移
    fn dimension_changed(
        dimension: Dimension,
        previous: &UserProfileSnapshot,
        current: &UserProfileSnapshot,
    ) -> bool {
        match (dimension.key_of(previous), dimension.key_of(current)) {
            (Some(old), Some(new)) => old != new,
            _ => false,
        }
    }

    pub fn changed(&self, dimension: Dimension) -> bool {
        match dimension {
            Dimension::University => self.university,
            Dimension::Country => self.country,
            Dimension::FieldOfStudy => self.field_of_study,
        }
    }

    pub fn any(&self) -> bool {
        self.university || self.country || self.field_of_study
    }
}
