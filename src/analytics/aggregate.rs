//! 每个线下活动的聚合计数文档

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::action::CounterSuffix;
use super::delta::{CounterField, CounterPath, Metric, Scope, StatsDelta};
use super::segment::Dimension;

/// 一组计数器（总体或某个细分分组）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsCounters {
    #[serde(default)]
    pub total_number_of_talent_reached: i64,
    #[serde(default)]
    pub unique_number_of_talent_reached: i64,
    #[serde(default)]
    pub total_number_of_register_clicks: i64,
    #[serde(default)]
    pub unique_number_of_register_clicks: i64,
}

impl StatsCounters {
    pub fn get(&self, field: CounterField) -> i64 {
        match (field.metric, field.suffix) {
            (Metric::Total, CounterSuffix::TalentReached) => self.total_number_of_talent_reached,
            (Metric::Unique, CounterSuffix::TalentReached) => self.unique_number_of_talent_reached,
            (Metric::Total, CounterSuffix::RegisterClicks) => self.total_number_of_register_clicks,
            (Metric::Unique, CounterSuffix::RegisterClicks) => {
                self.unique_number_of_register_clicks
            }
        }
    }

    fn slot_mut(&mut self, field: CounterField) -> &mut i64 {
        match (field.metric, field.suffix) {
            (Metric::Total, CounterSuffix::TalentReached) => {
                &mut self.total_number_of_talent_reached
            }
            (Metric::Unique, CounterSuffix::TalentReached) => {
                &mut self.unique_number_of_talent_reached
            }
            (Metric::Total, CounterSuffix::RegisterClicks) => {
                &mut self.total_number_of_register_clicks
            }
            (Metric::Unique, CounterSuffix::RegisterClicks) => {
                &mut self.unique_number_of_register_clicks
            }
        }
    }
}

/// 线下活动聚合统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineEventStats {
    pub offline_event_id: String,
    #[serde(default)]
    pub general: StatsCounters,
    /// 键为 `{countryCode}_{universityCode}`
    #[serde(default)]
    pub university: BTreeMap<String, StatsCounters>,
    #[serde(default)]
    pub country: BTreeMap<String, StatsCounters>,
    #[serde(default)]
    pub field_of_study: BTreeMap<String, StatsCounters>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl OfflineEventStats {
    pub fn new(offline_event_id: impl Into<String>) -> Self {
        Self {
            offline_event_id: offline_event_id.into(),
            ..Default::default()
        }
    }

    pub fn segments(&self, dimension: Dimension) -> &BTreeMap<String, StatsCounters> {
        match dimension {
            Dimension::University => &self.university,
            Dimension::Country => &self.country,
            Dimension::FieldOfStudy => &self.field_of_study,
        }
    }

    fn segments_mut(&mut self, dimension: Dimension) -> &mut BTreeMap<String, StatsCounters> {
        match dimension {
            Dimension::University => &mut self.university,
            Dimension::Country => &mut self.country,
            Dimension::FieldOfStudy => &mut self.field_of_study,
        }
    }

    /// 读取某个计数器当前值（不存在的分组视为 0）
    pub fn counter(&self, path: &CounterPath) -> i64 {
        match &path.scope {
            Scope::General => self.general.get(path.field),
            Scope::Segment { dimension, key } => self
                .segments(*dimension)
                .get(key)
                .map(|c| c.get(path.field))
                .unwrap_or(0),
        }
    }

    /// 以自增方式应用增量
    pub fn apply(&mut self, delta: &StatsDelta, at: DateTime<Utc>) {
        for (path, amount) in delta.iter() {
            let counters = match &path.scope {
                Scope::General => &mut self.general,
                Scope::Segment { dimension, key } => self
                    .segments_mut(*dimension)
                    .entry(key.clone())
                    .or_default(),
            };
            let slot = counters.slot_mut(path.field);
            *slot += amount;
            let value = *slot;
            if value < 0 {
                warn!(
                    "Counter {} of offline event {} dropped below zero ({})",
                    path, self.offline_event_id, value
                );
            }
        }
        self.updated_at = Some(at);
    }

    /// 某维度下所有分组的计数之和
    pub fn segment_sum(&self, dimension: Dimension, field: CounterField) -> i64 {
        self.segments(dimension).values().map(|c| c.get(field)).sum()
    }
}
