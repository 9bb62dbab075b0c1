//! 统计增量构建
//!
//! 纯函数，无 I/O。给定行为类型、访客已有记录和当前资料，
//! 计算需要调整的聚合计数器及增量。
//!
//! 注意：该函数不是幂等的，同一次行为调用两次会重复计数。
//! 调用方需保证每次实际行为只调用一次（见 `services::tracking`）。

use strum::IntoEnumIterator;
use tracing::{debug, trace};

use super::delta::{CounterPath, StatsDelta};
use super::migration::SegmentMigration;
use super::segment::Dimension;
use super::{OfflineEventUserStats, StatsAction, UserProfileSnapshot};

/// 构建一次行为对应的统计增量
///
/// - 总体 total 始终 +1，首次执行该行为时 unique 也 +1
/// - 匿名访客（`current` 为 None）只影响总体计数
/// - 各维度独立处理：迁移时旧分组 unique -1，新分组 total +1，
///   首次行为或发生迁移时新分组 unique +1
/// - total 计数从不扣减
pub fn build_stats_update(
    action: StatsAction,
    existing: Option<&OfflineEventUserStats>,
    current: Option<&UserProfileSnapshot>,
) -> StatsDelta {
    let config = action.config();
    let total = config.total_field;
    let unique = config.unique_field;

    let is_first_action = existing.is_none_or(|record| !record.has_performed(action));

    let mut delta = StatsDelta::new();
    delta.increment(CounterPath::general(total));
    if is_first_action {
        delta.increment(CounterPath::general(unique));
    }

    let Some(current) = current else {
        trace!("Anonymous {} action, only general stats updated", action);
        return delta;
    };

    let previous = existing.and_then(|record| record.profile.as_ref());
    let migration = SegmentMigration::detect(previous, current);
    if migration.any() {
        debug!("Segment migration detected for {} action: {:?}", action, migration);
    }

    for dimension in Dimension::iter() {
        let changed = migration.changed(dimension);

        if changed && let Some(old_key) = previous.and_then(|p| dimension.key_of(p)) {
            delta.decrement_unique(CounterPath::segment(dimension, old_key, unique));
        }

        if let Some(new_key) = dimension.key_of(current) {
            delta.increment(CounterPath::segment(dimension, new_key.clone(), total));
            if is_first_action || changed {
                delta.increment(CounterPath::segment(dimension, new_key, unique));
            }
        }
    }

    delta
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::ActionStamp;
    use chrono::Utc;

    fn record_with(action: StatsAction, profile: UserProfileSnapshot) -> OfflineEventUserStats {
        let mut record = OfflineEventUserStats::new("event", "visitor", Utc::now());
        record.record(
            action,
            Some(profile),
            ActionStamp {
                date: Utc::now(),
                utm: None,
            },
        );
        record
    }

    #[test]
    fn test_view_record_does_not_affect_click_uniqueness() {
        let profile = UserProfileSnapshot::new(Some("TUM"), Some("DE"), Some("cs"));
        let record = record_with(StatsAction::View, profile.clone());

        let delta = build_stats_update(StatsAction::Click, Some(&record), Some(&profile));

        assert_eq!(delta.get_dotted("general.uniqueNumberOfRegisterClicks"), Some(1));
        assert_eq!(
            delta.get_dotted("university.DE_TUM.uniqueNumberOfRegisterClicks"),
            Some(1)
        );
        assert!(!delta.contains_dotted("general.uniqueNumberOfTalentReached"));
    }

    #[test]
    fn test_record_without_profile_then_profile() {
        let mut record = OfflineEventUserStats::new("event", "visitor", Utc::now());
        record.record(
            StatsAction::View,
            None,
            ActionStamp {
                date: Utc::now(),
                utm: None,
            },
        );
        let profile = UserProfileSnapshot::new(Some("TUM"), Some("DE"), None);

        let delta = build_stats_update(StatsAction::View, Some(&record), Some(&profile));

        assert_eq!(delta.get_dotted("country.DE.totalNumberOfTalentReached"), Some(1));
        assert!(!delta.contains_dotted("country.DE.uniqueNumberOfTalentReached"));
        assert!(delta.iter().all(|(_, v)| v > 0));
    }
}
