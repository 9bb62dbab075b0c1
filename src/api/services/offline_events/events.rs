//! 线下活动接口：活动注册、行为追踪与统计查询

use actix_web::{Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::{info, trace};

use crate::analytics::{StatsAction, VisitorAction};
use crate::services::TrackingService;

use super::helpers::api_result;
use super::types::{TrackActionRequest, TrackActionResponse, UpsertEventRequest};

/// 创建或更新线下活动
pub async fn upsert_event(
    path: web::Path<String>,
    body: web::Json<UpsertEventRequest>,
    service: web::Data<Arc<TrackingService>>,
) -> ActixResult<impl Responder> {
    let event_id = path.into_inner();
    let body = body.into_inner();
    info!("API: upsert offline event '{}'", event_id);

    let result = service
        .register_event(&event_id, &body.title, body.group)
        .await;
    Ok(api_result(result))
}

pub async fn get_event(
    path: web::Path<String>,
    service: web::Data<Arc<TrackingService>>,
) -> ActixResult<impl Responder> {
    let event_id = path.into_inner();
    trace!("API: get offline event '{}'", event_id);
    Ok(api_result(service.get_event(&event_id).await))
}

async fn track(
    kind: StatsAction,
    event_id: String,
    body: TrackActionRequest,
    service: &TrackingService,
) -> actix_web::HttpResponse {
    trace!(
        "API: track {} on '{}' by '{}'",
        kind, event_id, body.visitor_id
    );

    let mut action = VisitorAction::new(kind, body.visitor_id).with_utm(body.utm);
    if let Some(profile) = body.profile {
        action = action.with_profile(profile);
    }

    let result = service
        .track_action(&event_id, action)
        .await
        .map(TrackActionResponse::from);
    api_result(result)
}

/// 记录浏览
pub async fn track_view(
    path: web::Path<String>,
    body: web::Json<TrackActionRequest>,
    service: web::Data<Arc<TrackingService>>,
) -> ActixResult<impl Responder> {
    Ok(track(StatsAction::View, path.into_inner(), body.into_inner(), &service).await)
}

/// 记录报名点击
pub async fn track_click(
    path: web::Path<String>,
    body: web::Json<TrackActionRequest>,
    service: web::Data<Arc<TrackingService>>,
) -> ActixResult<impl Responder> {
    Ok(track(StatsAction::Click, path.into_inner(), body.into_inner(), &service).await)
}

/// 获取活动聚合统计（尚无数据时返回全零文档）
pub async fn get_event_stats(
    path: web::Path<String>,
    service: web::Data<Arc<TrackingService>>,
) -> ActixResult<impl Responder> {
    let event_id = path.into_inner();
    trace!("API: get stats for '{}'", event_id);
    Ok(api_result(service.get_stats(&event_id).await))
}

pub async fn get_visitor(
    path: web::Path<(String, String)>,
    service: web::Data<Arc<TrackingService>>,
) -> ActixResult<impl Responder> {
    let (event_id, visitor_id) = path.into_inner();
    Ok(api_result(
        service.get_visitor_stats(&event_id, &visitor_id).await,
    ))
}

pub async fn get_visitor_actions(
    path: web::Path<(String, String)>,
    service: web::Data<Arc<TrackingService>>,
) -> ActixResult<impl Responder> {
    let (event_id, visitor_id) = path.into_inner();
    Ok(api_result(
        service.list_visitor_actions(&event_id, &visitor_id).await,
    ))
}
