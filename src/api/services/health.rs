use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, trace};

use crate::services::TrackingService;

use super::offline_events::success_response;

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub uptime: u32,
    pub storage_backend: String,
    pub active_visitor_locks: usize,
    pub response_time_ms: u32,
}

/// Health Service
///
/// 只报告进程存活和存储后端，不访问存储数据。
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        service: web::Data<Arc<TrackingService>>,
        app_start_time: web::Data<AppStartTime>,
    ) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let now = chrono::Utc::now();
        let uptime_seconds = (now - app_start_time.start_datetime).num_seconds().max(0) as u32;

        let health = HealthResponse {
            status: "healthy".to_string(),
            timestamp: now.to_rfc3339(),
            uptime: uptime_seconds,
            storage_backend: service.store().backend_name().to_string(),
            active_visitor_locks: service.active_visitor_locks(),
            response_time_ms: start_time.elapsed().as_millis() as u32,
        };

        info!(
            "Health check completed in {:?}, uptime: {}s",
            start_time.elapsed(),
            uptime_seconds
        );

        success_response(health)
    }

    // 活跃性检查，检查基本服务可用性
    pub async fn liveness_check() -> impl Responder {
        trace!("Received liveness check request");

        HttpResponse::NoContent().finish()
    }
}

/// Health 路由配置
pub fn health_routes() -> actix_web::Scope {
    web::scope("/health")
        .route("", web::get().to(HealthService::health_check))
        .route("", web::head().to(HealthService::health_check))
        .route("/live", web::get().to(HealthService::liveness_check))
        .route("/live", web::head().to(HealthService::liveness_check))
}
