use tokio::signal;
use tracing::{info, warn};

/// 等待 Ctrl+C 信号
///
/// 每次写操作都在返回前完成提交，关闭时没有需要刷新的缓冲。
pub async fn listen_for_shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, stopping server...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }
}
