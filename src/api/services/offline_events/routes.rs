//! API 路由配置

use actix_web::web;

use super::events::{
    get_event, get_event_stats, get_visitor, get_visitor_actions, track_click, track_view,
    upsert_event,
};
use super::groups::sync_group;
use super::helpers::json_config;

/// 线下活动路由 `/offline-events`
///
/// 包含：
/// - PUT/GET /offline-events/{event_id} - 注册 / 获取活动
/// - POST /offline-events/{event_id}/views - 记录浏览
/// - POST /offline-events/{event_id}/clicks - 记录点击
/// - GET /offline-events/{event_id}/stats - 聚合统计
/// - GET /offline-events/{event_id}/visitors/{visitor_id} - 访客记录
/// - GET /offline-events/{event_id}/visitors/{visitor_id}/actions - 访客行为日志
pub fn offline_events_routes() -> actix_web::Scope {
    web::scope("/offline-events")
        .route("/{event_id}/views", web::post().to(track_view))
        .route("/{event_id}/clicks", web::post().to(track_click))
        .route("/{event_id}/stats", web::get().to(get_event_stats))
        .route(
            "/{event_id}/visitors/{visitor_id}/actions",
            web::get().to(get_visitor_actions),
        )
        .route(
            "/{event_id}/visitors/{visitor_id}",
            web::get().to(get_visitor),
        )
        .route("/{event_id}", web::put().to(upsert_event))
        .route("/{event_id}", web::get().to(get_event))
}

/// 主办方路由 `/groups`
pub fn groups_routes() -> actix_web::Scope {
    web::scope("/groups").route("/{group_id}", web::put().to(sync_group))
}

/// `/v1` 下的全部路由
pub fn v1_routes() -> actix_web::Scope {
    web::scope("/v1")
        .app_data(json_config())
        .service(offline_events_routes())
        .service(groups_routes())
}
