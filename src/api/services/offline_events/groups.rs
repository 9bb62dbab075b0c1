//! 主办方信息同步接口

use actix_web::{Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::info;

use crate::services::TrackingService;
use crate::storage::GroupPublicData;

use super::helpers::api_result;
use super::types::{SyncGroupRequest, SyncGroupResponse};

/// 将主办方公开信息同步到其所有线下活动
pub async fn sync_group(
    path: web::Path<String>,
    body: web::Json<SyncGroupRequest>,
    service: web::Data<Arc<TrackingService>>,
) -> ActixResult<impl Responder> {
    let group_id = path.into_inner();
    let body = body.into_inner();
    info!("API: sync group '{}'", group_id);

    let group = GroupPublicData {
        id: group_id,
        university_name: body.university_name,
        logo_url: body.logo_url,
    };
    let result = service
        .sync_group_data(group)
        .await
        .map(|updated| SyncGroupResponse { updated });
    Ok(api_result(result))
}
