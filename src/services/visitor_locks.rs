//! 访客级互斥锁
//!
//! 同一（活动, 访客）的行为必须串行处理，否则两次并发行为会基于
//! 同一份旧记录计算增量，导致 unique 计数错误。
//! 锁按需创建，无人持有时回收。

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

type VisitorKey = (String, String);

#[derive(Default)]
pub struct VisitorLocks {
    locks: DashMap<VisitorKey, Arc<Mutex<()>>>,
}

impl VisitorLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取访客锁，持有返回的 guard 期间独占该访客
    pub async fn lock(&self, event_id: &str, visitor_id: &str) -> VisitorGuard<'_> {
        let key = (event_id.to_string(), visitor_id.to_string());
        // clone 必须在分片锁内完成，回收时才能依赖 strong_count 判断
        let lock = self
            .locks
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let guard = lock.lock_owned().await;
        trace!("VisitorLocks: acquired lock for {}/{}", key.0, key.1);

        VisitorGuard {
            locks: &self.locks,
            key,
            guard: Some(guard),
        }
    }

    /// 当前存活的锁数量（用于监控和测试）
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

pub struct VisitorGuard<'a> {
    locks: &'a DashMap<VisitorKey, Arc<Mutex<()>>>,
    key: VisitorKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for VisitorGuard<'_> {
    fn drop(&mut self) {
        // 先释放互斥锁（连同其持有的 Arc），再尝试回收
        self.guard.take();
        self.locks
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}
