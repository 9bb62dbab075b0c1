//! Offline event tracking service
//!
//! Turns visitor actions into counter increments on the event's aggregate
//! document, and keeps the per-visitor record and action log in step with it.
//! Shared by the HTTP handlers and the integration tests.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::analytics::{
    ActionStamp, OfflineEventStats, OfflineEventUserStats, StatsDelta, VisitorAction,
    build_stats_update,
};
use crate::config::TrackingConfig;
use crate::errors::{Result, StatsError};
use crate::services::visitor_locks::VisitorLocks;
use crate::storage::{
    ActionCommit, GroupPublicData, OfflineEvent, OfflineEventAction, StatsStore,
};

// ============ Result DTOs ============

/// Result of tracking a single visitor action
#[derive(Debug, Clone)]
pub struct TrackOutcome {
    /// Whether this was the visitor's first action of this kind on the event
    pub first_action: bool,
    /// Increments applied to the aggregate document
    pub delta: StatsDelta,
    /// The visitor's record after the action
    pub user_stats: OfflineEventUserStats,
}

// ============ TrackingService Implementation ============

pub struct TrackingService {
    store: Arc<dyn StatsStore>,
    locks: VisitorLocks,
    record_actions: bool,
}

impl TrackingService {
    pub fn new(store: Arc<dyn StatsStore>, config: &TrackingConfig) -> Self {
        Self {
            store,
            locks: VisitorLocks::new(),
            record_actions: config.record_actions,
        }
    }

    pub fn store(&self) -> &Arc<dyn StatsStore> {
        &self.store
    }

    /// Number of visitor locks currently held or awaited
    pub fn active_visitor_locks(&self) -> usize {
        self.locks.len()
    }

    fn require_id(kind: &str, value: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(StatsError::validation(format!("{} must not be empty", kind)));
        }
        Ok(())
    }

    async fn require_event(&self, event_id: &str) -> Result<OfflineEvent> {
        self.store.get_event(event_id).await?.ok_or_else(|| {
            StatsError::event_not_found(format!("Offline event '{}' not found", event_id))
        })
    }

    // ============ Events ============

    /// Create or update an offline event
    pub async fn register_event(
        &self,
        event_id: &str,
        title: &str,
        group: Option<GroupPublicData>,
    ) -> Result<OfflineEvent> {
        Self::require_id("Offline event id", event_id)?;
        if let Some(ref group) = group {
            Self::require_id("Group id", &group.id)?;
        }

        let event = self
            .store
            .upsert_event(OfflineEvent::new(event_id, title, group))
            .await?;
        info!("TrackingService: registered offline event '{}'", event.id);
        Ok(event)
    }

    pub async fn get_event(&self, event_id: &str) -> Result<OfflineEvent> {
        Self::require_id("Offline event id", event_id)?;
        self.require_event(event_id).await
    }

    /// Propagate a group's public data to every offline event it hosts
    pub async fn sync_group_data(&self, group: GroupPublicData) -> Result<usize> {
        Self::require_id("Group id", &group.id)?;
        let updated = self.store.sync_group(&group).await?;
        info!(
            "TrackingService: synced group '{}' to {} offline events",
            group.id, updated
        );
        Ok(updated)
    }

    // ============ Tracking ============

    /// Track a view or click on an offline event.
    ///
    /// Actions for the same visitor are processed one at a time; the delta is
    /// computed from the visitor's previous record and committed together with
    /// the updated record.
    pub async fn track_action(&self, event_id: &str, action: VisitorAction) -> Result<TrackOutcome> {
        Self::require_id("Offline event id", event_id)?;
        Self::require_id("Visitor id", &action.visitor_id)?;

        let _guard = self.locks.lock(event_id, &action.visitor_id).await;

        self.require_event(event_id).await?;

        let existing = self
            .store
            .get_user_stats(event_id, &action.visitor_id)
            .await?;
        let first_action = existing
            .as_ref()
            .is_none_or(|r| !r.has_performed(action.kind));

        let delta = build_stats_update(action.kind, existing.as_ref(), action.profile.as_ref());

        let now = Utc::now();
        let mut user_stats = existing
            .unwrap_or_else(|| OfflineEventUserStats::new(event_id, &action.visitor_id, now));
        user_stats.record(
            action.kind,
            action.profile.clone(),
            ActionStamp {
                date: now,
                utm: action.utm.clone(),
            },
        );

        let log = self.record_actions.then(|| OfflineEventAction {
            id: Uuid::new_v4().to_string(),
            offline_event_id: event_id.to_string(),
            visitor_id: action.visitor_id.clone(),
            action: action.kind,
            profile: action.profile.clone(),
            utm: action.utm.clone(),
            created_at: now,
        });

        self.store
            .commit_action(ActionCommit {
                user_stats: user_stats.clone(),
                action: log,
                delta: delta.clone(),
                committed_at: now,
            })
            .await
            .inspect_err(|e| {
                warn!(
                    "TrackingService: failed to commit {} for visitor '{}' on '{}': {}",
                    action.kind, action.visitor_id, event_id, e
                )
            })?;

        debug!(
            "TrackingService: {} by '{}' on '{}' (first: {}, {} counters)",
            action.kind,
            action.visitor_id,
            event_id,
            first_action,
            delta.len()
        );

        Ok(TrackOutcome {
            first_action,
            delta,
            user_stats,
        })
    }

    // ============ Queries ============

    /// Aggregate counters of an event; zeroed if nothing was tracked yet
    pub async fn get_stats(&self, event_id: &str) -> Result<OfflineEventStats> {
        Self::require_id("Offline event id", event_id)?;
        self.require_event(event_id).await?;
        Ok(self
            .store
            .get_stats(event_id)
            .await?
            .unwrap_or_else(|| OfflineEventStats::new(event_id)))
    }

    pub async fn get_visitor_stats(
        &self,
        event_id: &str,
        visitor_id: &str,
    ) -> Result<Option<OfflineEventUserStats>> {
        Self::require_id("Offline event id", event_id)?;
        Self::require_id("Visitor id", visitor_id)?;
        self.require_event(event_id).await?;
        self.store.get_user_stats(event_id, visitor_id).await
    }

    pub async fn list_visitor_actions(
        &self,
        event_id: &str,
        visitor_id: &str,
    ) -> Result<Vec<OfflineEventAction>> {
        Self::require_id("Offline event id", event_id)?;
        Self::require_id("Visitor id", visitor_id)?;
        self.require_event(event_id).await?;
        self.store.list_actions(event_id, visitor_id).await
    }
}
