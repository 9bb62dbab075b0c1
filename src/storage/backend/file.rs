//! JSON 文件存储后端
//!
//! - `<name>.json`: 活动、访客记录和聚合文档的快照，每次写操作后整体替换
//! - `<name>.actions.jsonl`: 行为日志，只追加，每行一条
//!
//! 写操作先在副本上修改，快照写入临时文件并重命名成功后才替换内存状态。
//! 文件 I/O 在 blocking 线程池中执行。

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::analytics::{OfflineEventStats, OfflineEventUserStats};
use crate::errors::{Result, StatsError};
use crate::storage::StatsStore;
use crate::storage::models::{ActionCommit, GroupPublicData, OfflineEvent, OfflineEventAction};

/// 快照格式（活动 ID -> 访客 ID -> 数据）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreSnapshot {
    #[serde(default)]
    events: BTreeMap<String, OfflineEvent>,
    #[serde(default)]
    user_stats: BTreeMap<String, BTreeMap<String, OfflineEventUserStats>>,
    #[serde(default)]
    stats: BTreeMap<String, OfflineEventStats>,
}

/// 活动 ID -> 访客 ID -> 按时间排序的行为日志
type ActionIndex = BTreeMap<String, BTreeMap<String, Vec<OfflineEventAction>>>;

pub struct FileStatsStore {
    path: PathBuf,
    actions_path: PathBuf,
    state: RwLock<StoreSnapshot>,
    actions: RwLock<ActionIndex>,
    /// 串行化所有写操作，保证快照按提交顺序落盘
    writer: Mutex<()>,
}

impl FileStatsStore {
    /// 打开快照文件，不存在时创建空快照
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let actions_path = path.with_extension("actions.jsonl");
        let snapshot = Self::load_snapshot(&path)?;
        let actions = Self::load_actions(&actions_path)?;

        if !path.exists() {
            write_snapshot(&path, &serde_json::to_vec(&snapshot)?)?;
            info!("Created empty stats file: {}", path.display());
        }

        Ok(Self {
            path,
            actions_path,
            state: RwLock::new(snapshot),
            actions: RwLock::new(actions),
            writer: Mutex::new(()),
        })
    }

    fn load_snapshot(path: &Path) -> Result<StoreSnapshot> {
        match fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => Ok(StoreSnapshot::default()),
            Ok(content) => {
                let snapshot: StoreSnapshot = serde_json::from_str(&content).map_err(|e| {
                    error!("Failed to parse stats file {}: {}", path.display(), e);
                    StatsError::serialization(format!(
                        "Failed to parse stats file {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                info!(
                    "Loaded {} offline events and {} stats documents from {}",
                    snapshot.events.len(),
                    snapshot.stats.len(),
                    path.display()
                );
                Ok(snapshot)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(StoreSnapshot::default()),
            Err(e) => Err(StatsError::file_operation(format!(
                "Failed to read stats file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// 逐行读取行为日志，跳过无法解析的行（例如写到一半的尾行）
    fn load_actions(path: &Path) -> Result<ActionIndex> {
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ActionIndex::new()),
            Err(e) => {
                return Err(StatsError::file_operation(format!(
                    "Failed to open action log {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let mut index = ActionIndex::new();
        let mut count = 0usize;
        for (line_no, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<OfflineEventAction>(&line) {
                Ok(action) => {
                    index
                        .entry(action.offline_event_id.clone())
                        .or_default()
                        .entry(action.visitor_id.clone())
                        .or_default()
                        .push(action);
                    count += 1;
                }
                Err(e) => warn!(
                    "Skipping malformed action log line {} in {}: {}",
                    line_no + 1,
                    path.display(),
                    e
                ),
            }
        }

        debug!("Loaded {} actions from {}", count, path.display());
        Ok(index)
    }

    /// 在副本上执行修改，快照持久化成功后替换内存状态
    async fn mutate<T>(&self, f: impl FnOnce(&mut StoreSnapshot) -> T) -> Result<T> {
        let _writer = self.writer.lock().await;

        let mut next = self.state.read().clone();
        let output = f(&mut next);
        let bytes = serde_json::to_vec(&next)?;

        let path = self.path.clone();
        run_blocking(move || write_snapshot(&path, &bytes)).await?;

        *self.state.write() = next;
        Ok(output)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn actions_path(&self) -> &Path {
        &self.actions_path
    }
}

/// 先写临时文件再重命名，避免写到一半的快照
fn write_snapshot(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn append_line(path: &Path, line: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(line)?;
    Ok(())
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("FileStatsStore: blocking task failed: {}", e);
        StatsError::storage_operation(format!("Blocking file task failed: {}", e))
    })?
}

#[async_trait]
impl StatsStore for FileStatsStore {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    async fn upsert_event(&self, mut event: OfflineEvent) -> Result<OfflineEvent> {
        self.mutate(|snapshot| {
            if let Some(existing) = snapshot.events.get(&event.id) {
                event.created_at = existing.created_at;
            }
            event.updated_at = Utc::now();
            snapshot.events.insert(event.id.clone(), event.clone());
            event
        })
        .await
    }

    async fn get_event(&self, event_id: &str) -> Result<Option<OfflineEvent>> {
        Ok(self.state.read().events.get(event_id).cloned())
    }

    async fn sync_group(&self, group: &GroupPublicData) -> Result<usize> {
        let now = Utc::now();
        let updated = self
            .mutate(|snapshot| {
                let mut updated = 0;
                for event in snapshot.events.values_mut() {
                    if event.group.as_ref().is_some_and(|g| g.id == group.id) {
                        event.group = Some(group.clone());
                        event.updated_at = now;
                        updated += 1;
                    }
                }
                updated
            })
            .await?;
        debug!(
            "FileStatsStore: synced group {} to {} offline events",
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
            .state
            .read()
            .user_stats
            .get(event_id)
            .and_then(|visitors| visitors.get(visitor_id))
            .cloned())
    }

    async fn commit_action(&self, commit: ActionCommit) -> Result<()> {
        let event_id = commit.offline_event_id().to_string();
        let visitor_id = commit.visitor_id().to_string();
        let ActionCommit {
            user_stats,
            action,
            delta,
            committed_at,
        } = commit;

        // 日志先落盘；快照写入失败时只会多出一条未计数的日志
        if let Some(action) = &action {
            let mut line = serde_json::to_vec(action)?;
            line.push(b'\n');
            let actions_path = self.actions_path.clone();
            run_blocking(move || append_line(&actions_path, &line)).await?;
        }

        self.mutate(|snapshot| {
            snapshot
                .stats
                .entry(event_id.clone())
                .or_insert_with(|| OfflineEventStats::new(event_id.as_str()))
                .apply(&delta, committed_at);

            snapshot
                .user_stats
                .entry(event_id.clone())
                .or_default()
                .insert(visitor_id.clone(), user_stats);
        })
        .await?;

        if let Some(action) = action {
            self.actions
                .write()
                .entry(event_id.clone())
                .or_default()
                .entry(visitor_id)
                .or_default()
                .push(action);
        }

        debug!(
            "FileStatsStore: committed action for event {} to {}",
            event_id,
            self.path.display()
        );
        Ok(())
    }

    async fn get_stats(&self, event_id: &str) -> Result<Option<OfflineEventStats>> {
        Ok(self.state.read().stats.get(event_id).cloned())
    }

    async fn list_actions(
        &self,
        event_id: &str,
        visitor_id: &str,
    ) -> Result<Vec<OfflineEventAction>> {
        Ok(self
            .actions
            .read()
            .get(event_id)
            .and_then(|visitors| visitors.get(visitor_id))
            .cloned()
            .unwrap_or_default())
    }
}
