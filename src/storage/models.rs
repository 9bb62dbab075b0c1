use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::{
    OfflineEventUserStats, StatsAction, StatsDelta, UserProfileSnapshot, UtmParams,
};

/// 主办方公开信息（同步到其所有线下活动）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPublicData {
    pub id: String,
    pub university_name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// 线下活动
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub group: Option<GroupPublicData>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OfflineEvent {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        group: Option<GroupPublicData>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            group,
            created_at: now,
            updated_at: now,
        }
    }
}

/// 单次行为日志
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineEventAction {
    pub id: String,
    pub offline_event_id: String,
    pub visitor_id: String,
    #[serde(rename = "type")]
    pub action: StatsAction,
    #[serde(default)]
    pub profile: Option<UserProfileSnapshot>,
    #[serde(default)]
    pub utm: Option<UtmParams>,
    pub created_at: DateTime<Utc>,
}

/// 一次行为需要原子提交的全部写入
#[derive(Debug, Clone)]
pub struct ActionCommit {
    /// 更新后的访客记录（整条替换）
    pub user_stats: OfflineEventUserStats,
    /// 行为日志（关闭 `tracking.record_actions` 时为 None）
    pub action: Option<OfflineEventAction>,
    /// 以自增方式应用到聚合文档的增量
    pub delta: StatsDelta,
    pub committed_at: DateTime<Utc>,
}

impl ActionCommit {
    pub fn offline_event_id(&self) -> &str {
        &self.user_stats.offline_event_id
    }

    pub fn visitor_id(&self) -> &str {
        &self.user_stats.id
    }
}
