//! 线下活动 API 帮助函数

use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;
use tracing::{error, warn};

use crate::errors::StatsError;

use super::error_code::{ErrorCode, http_status};
use super::types::ApiResponse;

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

/// 构建错误响应
pub fn error_response(status: StatusCode, error_code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, error_code, message, None)
}

/// 从 StatsError 构建错误响应（自动映射 HTTP 状态码和 ErrorCode）
pub fn error_from_stats(err: &StatsError) -> HttpResponse {
    let status = http_status(err);
    if status.is_server_error() {
        error!("API: {}", err);
    } else {
        warn!("API: {}", err);
    }
    error_response(status, ErrorCode::from(err), err.message())
}

/// 统一 Result → HttpResponse 转换
pub fn api_result<T: Serialize>(result: crate::errors::Result<T>) -> HttpResponse {
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_from_stats(&e),
    }
}

/// JSON 请求体解析失败时返回统一格式的 400
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(64 * 1024)
        .error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            let message = format!("Invalid request body: {}", err);
            let response = error_response(StatusCode::BAD_REQUEST, ErrorCode::BadRequest, &message);
            actix_web::error::InternalError::from_response(err, response).into()
        })
}
