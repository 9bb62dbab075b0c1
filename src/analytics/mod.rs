//! 线下活动统计核心
//!
//! 根据访客行为（浏览 / 点击）和访客上一次的记录，计算聚合计数器的增量：
//! - `action`: 行为类型与字段配置
//! - `segment`: 细分维度键（大学、国家、专业）
//! - `migration`: 维度迁移检测
//! - `builder`: 增量构建（核心算法）
//! - `delta`: 类型化的稀疏增量映射
//! - `aggregate`: 每个活动的聚合计数文档

pub mod action;
pub mod aggregate;
pub mod builder;
pub mod delta;
pub mod migration;
pub mod segment;

pub use action::{ActionConfig, CounterSuffix, StatsAction};
pub use aggregate::{OfflineEventStats, StatsCounters};
pub use builder::build_stats_update;
pub use delta::{CounterField, CounterPath, Metric, Scope, StatsDelta};
pub use migration::SegmentMigration;
pub use segment::Dimension;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 与细分统计相关的用户资料快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileSnapshot {
    #[serde(default)]
    pub university_code: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub field_of_study_id: Option<String>,
}

impl UserProfileSnapshot {
    pub fn new(
        university_code: Option<&str>,
        country_code: Option<&str>,
        field_of_study_id: Option<&str>,
    ) -> Self {
        Self {
            university_code: university_code.map(String::from),
            country_code: country_code.map(String::from),
            field_of_study_id: field_of_study_id.map(String::from),
        }
    }
}

/// UTM 参数
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_campaign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_content: Option<String>,
}

/// 行为发生时间及来源
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionStamp {
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub utm: Option<UtmParams>,
}

/// 访客行为（输入事件）
#[derive(Debug, Clone, PartialEq)]
pub struct VisitorAction {
    pub kind: StatsAction,
    pub visitor_id: String,
    /// 缺失表示匿名访客，只影响总体计数
    pub profile: Option<UserProfileSnapshot>,
    pub utm: Option<UtmParams>,
}

impl VisitorAction {
    pub fn new(kind: StatsAction, visitor_id: impl Into<String>) -> Self {
        Self {
            kind,
            visitor_id: visitor_id.into(),
            profile: None,
            utm: None,
        }
    }

    pub fn with_profile(mut self, profile: UserProfileSnapshot) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn with_utm(mut self, utm: Option<UtmParams>) -> Self {
        self.utm = utm;
        self
    }
}

/// 每个（活动, 访客）一条的行为记录
///
/// 首次行为时创建，之后每次行为替换资料快照并设置对应时间戳，从不删除。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineEventUserStats {
    /// 访客 ID
    pub id: String,
    pub offline_event_id: String,
    /// 最近一次行为时的资料快照（匿名为 None）
    #[serde(default)]
    pub profile: Option<UserProfileSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_seen_at: Option<ActionStamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_clicked_at: Option<ActionStamp>,
    pub created_at: DateTime<Utc>,
}

impl OfflineEventUserStats {
    pub fn new(
        offline_event_id: impl Into<String>,
        visitor_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: visitor_id.into(),
            offline_event_id: offline_event_id.into(),
            profile: None,
            last_seen_at: None,
            last_clicked_at: None,
            created_at,
        }
    }

    /// 指定行为最近一次发生的时间戳
    pub fn stamp(&self, action: StatsAction) -> Option<&ActionStamp> {
        match action {
            StatsAction::View => self.last_seen_at.as_ref(),
            StatsAction::Click => self.last_clicked_at.as_ref(),
        }
    }

    pub fn has_performed(&self, action: StatsAction) -> bool {
        self.stamp(action).is_some()
    }

    /// 记录一次行为：替换资料快照并更新时间戳，创建时间保持不变
    pub fn record(
        &mut self,
        action: StatsAction,
        profile: Option<UserProfileSnapshot>,
        stamp: ActionStamp,
    ) {
        self.profile = profile;
        match action {
            StatsAction::View => self.last_seen_at = Some(stamp),
            StatsAction::Click => self.last_clicked_at = Some(stamp),
        }
    }
}
