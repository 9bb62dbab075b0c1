//! 聚合存储
//!
//! `StatsStore` 负责持久化线下活动、访客记录、行为日志和聚合计数文档。
//! 增量只以自增方式应用；同一访客的串行化由调用方（`TrackingService`）保证。

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::analytics::{OfflineEventStats, OfflineEventUserStats};
use crate::config::{StorageBackend, StorageConfig};
use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::{FileStatsStore, MemoryStatsStore};
pub use models::{ActionCommit, GroupPublicData, OfflineEvent, OfflineEventAction};

#[async_trait]
pub trait StatsStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// 创建或更新活动（保留原创建时间），返回写入后的活动
    async fn upsert_event(&self, event: OfflineEvent) -> Result<OfflineEvent>;

    async fn get_event(&self, event_id: &str) -> Result<Option<OfflineEvent>>;

    /// 将主办方公开信息同步到其所有活动，返回更新的活动数量
    async fn sync_group(&self, group: &GroupPublicData) -> Result<usize>;

    async fn get_user_stats(
        &self,
        event_id: &str,
        visitor_id: &str,
    ) -> Result<Option<OfflineEventUserStats>>;

    /// 提交一次行为：替换访客记录、追加行为日志、自增聚合计数
    ///
    /// 返回后三项写入均可见。提交过程中的并发读取可能只看到其中一部分，
    /// 读接口不提供跨文档的快照一致性；同一访客的提交由调用方串行化。
    async fn commit_action(&self, commit: ActionCommit) -> Result<()>;

    async fn get_stats(&self, event_id: &str) -> Result<Option<OfflineEventStats>>;

    /// 按时间顺序返回访客在某活动上的行为日志
    async fn list_actions(
        &self,
        event_id: &str,
        visitor_id: &str,
    ) -> Result<Vec<OfflineEventAction>>;
}

pub struct StorageFactory;

impl StorageFactory {
    pub fn create(config: &StorageConfig) -> Result<Arc<dyn StatsStore>> {
        let store: Arc<dyn StatsStore> = match config.backend {
            StorageBackend::Memory => Arc::new(MemoryStatsStore::new()),
            StorageBackend::File => Arc::new(FileStatsStore::open(&config.file_path)?),
        };
        info!("Using storage backend: {}", store.backend_name());
        Ok(store)
    }
}
