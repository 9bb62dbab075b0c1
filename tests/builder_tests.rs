//! build_stats_update 集成测试
//!
//! 覆盖首次 / 重复行为、各维度迁移、匿名访客、资料字段新增与移除，
//! 以及 total 计数永不扣减。

use chrono::Utc;

use offline_event_stats::analytics::{
    ActionStamp, Metric, OfflineEventUserStats, StatsAction, StatsDelta, UserProfileSnapshot,
    build_stats_update,
};

// =============================================================================
// 辅助函数
// =============================================================================

fn profile(university: Option<&str>, country: Option<&str>, field: Option<&str>) -> UserProfileSnapshot {
    UserProfileSnapshot::new(university, country, field)
}

fn full_profile() -> UserProfileSnapshot {
    profile(Some("TUM"), Some("DE"), Some("cs"))
}

/// 已执行过 `actions` 的访客记录，资料为 `snapshot`
fn existing(actions: &[StatsAction], snapshot: Option<UserProfileSnapshot>) -> OfflineEventUserStats {
    let mut record = OfflineEventUserStats::new("event-1", "visitor-1", Utc::now());
    for action in actions {
        record.record(
            *action,
            snapshot.clone(),
            ActionStamp {
                date: Utc::now(),
                utm: None,
            },
        );
    }
    record
}

fn assert_entries(delta: &StatsDelta, expected: &[(&str, i64)]) {
    let actual = delta.to_dotted_map();
    let expected: std::collections::BTreeMap<String, i64> = expected
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect();
    assert_eq!(actual, expected);
}

// =============================================================================
// 总体计数
// =============================================================================

#[test]
fn test_anonymous_first_view_touches_general_only() {
    let delta = build_stats_update(StatsAction::View, None, None);
    assert_entries(
        &delta,
        &[
            ("general.totalNumberOfTalentReached", 1),
            ("general.uniqueNumberOfTalentReached", 1),
        ],
    );
}

#[test]
fn test_anonymous_repeat_view_counts_total_only() {
    let record = existing(&[StatsAction::View], None);
    let delta = build_stats_update(StatsAction::View, Some(&record), None);
    assert_entries(&delta, &[("general.totalNumberOfTalentReached", 1)]);
}

#[test]
fn test_first_click_uses_register_clicks_fields() {
    let delta = build_stats_update(StatsAction::Click, None, None);
    assert_entries(
        &delta,
        &[
            ("general.totalNumberOfRegisterClicks", 1),
            ("general.uniqueNumberOfRegisterClicks", 1),
        ],
    );
}

#[test]
fn test_prior_view_does_not_make_click_repeat() {
    let record = existing(&[StatsAction::View], Some(full_profile()));
    let delta = build_stats_update(StatsAction::Click, Some(&record), Some(&full_profile()));

    assert_eq!(delta.get_dotted("general.uniqueNumberOfRegisterClicks"), Some(1));
    assert_eq!(
        delta.get_dotted("university.DE_TUM.uniqueNumberOfRegisterClicks"),
        Some(1)
    );
    assert!(!delta.contains_dotted("general.totalNumberOfTalentReached"));
}

// =============================================================================
// 细分维度
// =============================================================================

#[test]
fn test_first_view_with_full_profile() {
    let delta = build_stats_update(StatsAction::View, None, Some(&full_profile()));
    assert_entries(
        &delta,
        &[
            ("general.totalNumberOfTalentReached", 1),
            ("general.uniqueNumberOfTalentReached", 1),
            ("university.DE_TUM.totalNumberOfTalentReached", 1),
            ("university.DE_TUM.uniqueNumberOfTalentReached", 1),
            ("country.DE.totalNumberOfTalentReached", 1),
            ("country.DE.uniqueNumberOfTalentReached", 1),
            ("fieldOfStudy.cs.totalNumberOfTalentReached", 1),
            ("fieldOfStudy.cs.uniqueNumberOfTalentReached", 1),
        ],
    );
}

#[test]
fn test_repeat_view_with_same_profile_counts_totals_only() {
    let record = existing(&[StatsAction::View], Some(full_profile()));
    let delta = build_stats_update(StatsAction::View, Some(&record), Some(&full_profile()));
    assert_entries(
        &delta,
        &[
            ("general.totalNumberOfTalentReached", 1),
            ("university.DE_TUM.totalNumberOfTalentReached", 1),
            ("country.DE.totalNumberOfTalentReached", 1),
            ("fieldOfStudy.cs.totalNumberOfTalentReached", 1),
        ],
    );
}

#[test]
fn test_university_migration() {
    let before = profile(Some("LMU"), Some("DE"), Some("cs"));
    let record = existing(&[StatsAction::View], Some(before));
    let delta = build_stats_update(StatsAction::View, Some(&record), Some(&full_profile()));

    assert_entries(
        &delta,
        &[
            ("general.totalNumberOfTalentReached", 1),
            ("university.DE_LMU.uniqueNumberOfTalentReached", -1),
            ("university.DE_TUM.totalNumberOfTalentReached", 1),
            ("university.DE_TUM.uniqueNumberOfTalentReached", 1),
            ("country.DE.totalNumberOfTalentReached", 1),
            ("fieldOfStudy.cs.totalNumberOfTalentReached", 1),
        ],
    );
}

#[test]
fn test_country_migration_also_moves_university_bucket() {
    let before = profile(Some("TUM"), Some("FR"), None);
    let after = profile(Some("TUM"), Some("DE"), None);
    let record = existing(&[StatsAction::View], Some(before));
    let delta = build_stats_update(StatsAction::View, Some(&record), Some(&after));

    assert_entries(
        &delta,
        &[
            ("general.totalNumberOfTalentReached", 1),
            ("country.FR.uniqueNumberOfTalentReached", -1),
            ("country.DE.totalNumberOfTalentReached", 1),
            ("country.DE.uniqueNumberOfTalentReached", 1),
            ("university.FR_TUM.uniqueNumberOfTalentReached", -1),
            ("university.DE_TUM.totalNumberOfTalentReached", 1),
            ("university.DE_TUM.uniqueNumberOfTalentReached", 1),
        ],
    );
}

#[test]
fn test_field_of_study_migration() {
    let before = profile(Some("TUM"), Some("DE"), Some("math"));
    let record = existing(&[StatsAction::Click], Some(before));
    let delta = build_stats_update(StatsAction::Click, Some(&record), Some(&full_profile()));

    assert_eq!(
        delta.get_dotted("fieldOfStudy.math.uniqueNumberOfRegisterClicks"),
        Some(-1)
    );
    assert_eq!(
        delta.get_dotted("fieldOfStudy.cs.uniqueNumberOfRegisterClicks"),
        Some(1)
    );
    assert_eq!(
        delta.get_dotted("fieldOfStudy.cs.totalNumberOfRegisterClicks"),
        Some(1)
    );
    assert!(!delta.contains_dotted("university.DE_TUM.uniqueNumberOfRegisterClicks"));
    assert!(!delta.contains_dotted("general.uniqueNumberOfRegisterClicks"));
}

#[test]
fn test_multiple_migrations_at_once() {
    let before = profile(Some("ETH"), Some("CH"), Some("math"));
    let record = existing(&[StatsAction::View], Some(before));
    let delta = build_stats_update(StatsAction::View, Some(&record), Some(&full_profile()));

    for old in [
        "university.CH_ETH.uniqueNumberOfTalentReached",
        "country.CH.uniqueNumberOfTalentReached",
        "fieldOfStudy.math.uniqueNumberOfTalentReached",
    ] {
        assert_eq!(delta.get_dotted(old), Some(-1), "{}", old);
    }
    for new in [
        "university.DE_TUM.uniqueNumberOfTalentReached",
        "country.DE.uniqueNumberOfTalentReached",
        "fieldOfStudy.cs.uniqueNumberOfTalentReached",
    ] {
        assert_eq!(delta.get_dotted(new), Some(1), "{}", new);
    }
}

#[test]
fn test_profile_without_university() {
    let current = profile(None, Some("DE"), Some("cs"));
    let delta = build_stats_update(StatsAction::View, None, Some(&current));

    assert!(delta.iter().all(|(path, _)| !path.to_dotted().starts_with("university.")));
    assert_eq!(delta.get_dotted("country.DE.uniqueNumberOfTalentReached"), Some(1));
}

#[test]
fn test_removed_field_is_not_decremented() {
    let record = existing(&[StatsAction::View], Some(full_profile()));
    let current = profile(Some("TUM"), Some("DE"), None);
    let delta = build_stats_update(StatsAction::View, Some(&record), Some(&current));

    assert!(delta.iter().all(|(path, _)| !path.to_dotted().starts_with("fieldOfStudy.")));
    assert_eq!(delta.get_dotted("university.DE_TUM.totalNumberOfTalentReached"), Some(1));
}

#[test]
fn test_added_university_is_not_a_migration() {
    let before = profile(None, Some("DE"), Some("cs"));
    let record = existing(&[StatsAction::View], Some(before));
    let delta = build_stats_update(StatsAction::View, Some(&record), Some(&full_profile()));

    assert_eq!(
        delta.get_dotted("university.DE_TUM.totalNumberOfTalentReached"),
        Some(1)
    );
    assert!(!delta.contains_dotted("university.DE_TUM.uniqueNumberOfTalentReached"));
    assert!(delta.iter().all(|(_, amount)| amount > 0));
}

// =============================================================================
// 不变量
// =============================================================================

#[test]
fn test_stale_record_double_counts() {
    let first = build_stats_update(StatsAction::View, None, Some(&full_profile()));
    let second = build_stats_update(StatsAction::View, None, Some(&full_profile()));
    assert_eq!(first, second);

    let mut merged = first.clone();
    merged.merge(&second);
    assert_eq!(merged.get_dotted("general.uniqueNumberOfTalentReached"), Some(2));
}

#[test]
fn test_stale_migration_record_double_counts() {
    let before = profile(Some("LMU"), Some("DE"), Some("cs"));
    let record = existing(&[StatsAction::View], Some(before));

    // 同一条未更新的记录被使用两次，迁移会重复计入
    let first = build_stats_update(StatsAction::View, Some(&record), Some(&full_profile()));
    let second = build_stats_update(StatsAction::View, Some(&record), Some(&full_profile()));
    assert_eq!(first, second);

    let mut merged = first.clone();
    merged.merge(&second);
    assert_eq!(merged.get_dotted("university.DE_LMU.uniqueNumberOfTalentReached"), Some(-2));
    assert_eq!(merged.get_dotted("university.DE_TUM.uniqueNumberOfTalentReached"), Some(2));
    assert_eq!(merged.get_dotted("university.DE_TUM.totalNumberOfTalentReached"), Some(2));
    assert!(!merged.contains_dotted("general.uniqueNumberOfTalentReached"));
}

#[test]
fn test_first_click_after_view_migration_decrements_uncounted_bucket() {
    // 资料快照在浏览和点击之间共享：以 LMU 浏览后以 TUM 首次点击，
    // LMU 分组的点击 unique 会被扣减，尽管该访客从未在 LMU 下点击过
    let before = profile(Some("LMU"), Some("DE"), Some("cs"));
    let record = existing(&[StatsAction::View], Some(before));
    let delta = build_stats_update(StatsAction::Click, Some(&record), Some(&full_profile()));

    assert_entries(
        &delta,
        &[
            ("general.totalNumberOfRegisterClicks", 1),
            ("general.uniqueNumberOfRegisterClicks", 1),
            ("university.DE_LMU.uniqueNumberOfRegisterClicks", -1),
            ("university.DE_TUM.totalNumberOfRegisterClicks", 1),
            ("university.DE_TUM.uniqueNumberOfRegisterClicks", 1),
            ("country.DE.totalNumberOfRegisterClicks", 1),
            ("country.DE.uniqueNumberOfRegisterClicks", 1),
            ("fieldOfStudy.cs.totalNumberOfRegisterClicks", 1),
            ("fieldOfStudy.cs.uniqueNumberOfRegisterClicks", 1),
        ],
    );
}

#[test]
fn test_totals_never_negative() {
    let profiles = [
        None,
        Some(full_profile()),
        Some(profile(Some("LMU"), Some("DE"), Some("math"))),
        Some(profile(None, Some("FR"), None)),
        Some(profile(Some("ETH"), None, Some("bio"))),
    ];
    let histories: [&[StatsAction]; 4] = [
        &[],
        &[StatsAction::View],
        &[StatsAction::Click],
        &[StatsAction::View, StatsAction::Click],
    ];

    for action in [StatsAction::View, StatsAction::Click] {
        for history in histories {
            for before in &profiles {
                for after in &profiles {
                    let record = existing(history, before.clone());
                    let prior = (!history.is_empty()).then_some(&record);
                    let delta = build_stats_update(action, prior, after.as_ref());
                    for (path, amount) in delta.iter() {
                        if path.field.metric == Metric::Total {
                            assert_eq!(amount, 1, "{}", path);
                        } else {
                            assert!(amount == 1 || amount == -1, "{}", path);
                        }
                    }
                    assert_eq!(
                        delta.get_dotted(&format!(
                            "general.{}",
                            action.config().total_field.name()
                        )),
                        Some(1)
                    );
                }
            }
        }
    }
}
