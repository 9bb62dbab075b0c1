//! 内存存储后端
//!
//! 使用 DashMap 分片锁，聚合文档的自增在单个条目锁内完成，
//! 不同访客对同一计数器的自增可以任意交错。
//! `commit_action` 依次写入聚合、日志和访客记录三个 map，
//! 并发读取者可能看到已自增的计数而访客记录仍是旧值。

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::{debug, trace};

use crate::analytics::{OfflineEventStats, OfflineEventUserStats};
use crate::errors::Result;
use crate::storage::models::{ActionCommit, GroupPublicData, OfflineEvent, OfflineEventAction};
use crate::storage::StatsStore;

/// (活动 ID, 访客 ID)
type VisitorKey = (String, String);

fn visitor_key(event_id: &str, visitor_id: &str) -> VisitorKey {
    (event_id.to_string(), visitor_id.to_string())
}

#[derive(Default)]
pub struct MemoryStatsStore {
    events: DashMap<String, OfflineEvent>,
    user_stats: DashMap<VisitorKey, OfflineEventUserStats>,
    actions: DashMap<VisitorKey, Vec<OfflineEventAction>>,
    stats: DashMap<String, OfflineEventStats>,
}

impl MemoryStatsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatsStore for MemoryStatsStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn upsert_event(&self, mut event: OfflineEvent) -> Result<OfflineEvent> {
        if let Some(existing) = self.events.get(&event.id) {
            event.created_at = existing.created_at;
        }
        event.updated_at = Utc::now();
        self.events.insert(event.id.clone(), event.clone());
        trace!("MemoryStatsStore: upserted offline event {}", event.id);
        Ok(event)
    }

    async fn get_event(&self, event_id: &str) -> Result<Option<OfflineEvent>> {
        Ok(self.events.get(event_id).map(|e| e.clone()))
    }

    async fn sync_group(&self, group: &GroupPublicData) -> Result<usize> {
        let now = Utc::now();
        let mut updated = 0;
        for mut entry in self.events.iter_mut() {
            if entry.group.as_ref().is_some_and(|g| g.id == group.id) {
                entry.group = Some(group.clone());
                entry.updated_at = now;
                updated += 1;
            }
        }
        debug!(
            "MemoryStatsStore: synced group {} to {} offline events",
            group.id, updated
        );
        Ok(updated)
    }

    async fn get_user_stats(
        &self,
        event_id: &str,
        visitor_id: &str,
    ) -> Result<Option<OfflineEventUserStats>> {
        Ok(self
            .user_stats
            .get(&visitor_key(event_id, visitor_id))
            .map(|s| s.clone()))
    }

    async fn commit_action(&self, commit: ActionCommit) -> Result<()> {
        let event_id = commit.offline_event_id().to_string();
        let key = visitor_key(&event_id, commit.visitor_id());

        self.stats
            .entry(event_id.clone())
            .or_insert_with(|| OfflineEventStats::new(event_id.as_str()))
            .apply(&commit.delta, commit.committed_at);

        if let Some(action) = commit.action {
            self.actions.entry(key.clone()).or_default().push(action);
        }
        self.user_stats.insert(key, commit.user_stats);

        trace!(
            "MemoryStatsStore: committed {} counter updates for event {}",
            commit.delta.len(),
            event_id
        );
        Ok(())
    }

    async fn get_stats(&self, event_id: &str) -> Result<Option<OfflineEventStats>> {
        Ok(self.stats.get(event_id).map(|s| s.clone()))
    }

    async fn list_actions(
        &self,
        event_id: &str,
        visitor_id: &str,
    ) -> Result<Vec<OfflineEventAction>> {
        Ok(self
            .actions
            .get(&visitor_key(event_id, visitor_id))
            .map(|a| a.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{ActionStamp, StatsAction, build_stats_update};

    fn commit_for(visitor: &str) -> ActionCommit {
        let now = Utc::now();
        let mut user_stats = OfflineEventUserStats::new("event-1", visitor, now);
        user_stats.record(StatsAction::View, None, ActionStamp { date: now, utm: None });
        ActionCommit {
            user_stats,
            action: Some(OfflineEventAction {
                id: format!("action-{}", visitor),
                offline_event_id: "event-1".to_string(),
                visitor_id: visitor.to_string(),
                action: StatsAction::View,
                profile: None,
                utm: None,
                created_at: now,
            }),
            delta: build_stats_update(StatsAction::View, None, None),
            committed_at: now,
        }
    }

    #[tokio::test]
    async fn test_commit_is_fully_visible_after_return() {
        let store = MemoryStatsStore::new();
        store.commit_action(commit_for("v1")).await.unwrap();

        let stats = store.get_stats("event-1").await.unwrap().unwrap();
        assert_eq!(stats.general.unique_number_of_talent_reached, 1);
        let record = store.get_user_stats("event-1", "v1").await.unwrap().unwrap();
        assert!(record.has_performed(StatsAction::View));
        assert_eq!(store.list_actions("event-1", "v1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_visitor_reads_empty() {
        let store = MemoryStatsStore::new();
        assert!(store.get_user_stats("event-1", "v1").await.unwrap().is_none());
        assert!(store.list_actions("event-1", "v1").await.unwrap().is_empty());
        assert!(store.get_stats("event-1").await.unwrap().is_none());
    }
}
