//! 线下活动 API 类型定义

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analytics::{UserProfileSnapshot, UtmParams};
use crate::services::TrackOutcome;
use crate::storage::GroupPublicData;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// PUT /offline-events/{event_id}
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UpsertEventRequest {
    pub title: String,
    #[serde(default)]
    pub group: Option<GroupPublicData>,
}

/// POST /offline-events/{event_id}/views | /clicks
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TrackActionRequest {
    pub visitor_id: String,
    #[serde(default)]
    pub profile: Option<UserProfileSnapshot>,
    #[serde(default)]
    pub utm: Option<UtmParams>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TrackActionResponse {
    pub first_action: bool,
    /// 点分路径 -> 增量
    pub delta: BTreeMap<String, i64>,
}

impl From<TrackOutcome> for TrackActionResponse {
    fn from(outcome: TrackOutcome) -> Self {
        Self {
            first_action: outcome.first_action,
            delta: outcome.delta.to_dotted_map(),
        }
    }
}

/// PUT /groups/{group_id}
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SyncGroupRequest {
    pub university_name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SyncGroupResponse {
    pub updated: usize,
}
