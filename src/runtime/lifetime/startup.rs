use crate::config::get_config;
use crate::services::TrackingService;
use crate::storage::{StatsStore, StorageFactory};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

pub struct StartupContext {
    pub store: Arc<dyn StatsStore>,
    pub tracking_service: Arc<TrackingService>,
}

/// 准备服务器启动的上下文
/// 包括存储后端和追踪服务
pub async fn prepare_server_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let config = get_config();

    let store =
        StorageFactory::create(&config.storage).context("Failed to create storage backend")?;

    let tracking_service = Arc::new(TrackingService::new(store.clone(), &config.tracking));
    if !config.tracking.record_actions {
        info!("Action logging disabled, only aggregate counters will be written");
    }

    info!(
        "Pre-startup completed in {:?} (storage: {})",
        start_time.elapsed(),
        store.backend_name()
    );

    Ok(StartupContext {
        store,
        tracking_service,
    })
}
