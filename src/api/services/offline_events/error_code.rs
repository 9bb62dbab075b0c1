//! 统一 API 错误码定义

use actix_web::http::StatusCode;
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::StatsError;

/// API 错误码枚举
///
/// 使用 serde_repr 序列化为数字，按千位分域：
/// - 0: 成功
/// - 1000-1099: 通用错误
/// - 3000-3099: 线下活动统计错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    // 成功
    Success = 0,

    // 通用错误 1000-1099
    BadRequest = 1000,
    InternalServerError = 1005,

    // 线下活动统计错误 3000-3099
    EventNotFound = 3000,
    ValidationFailed = 3001,
    StorageError = 3002,
}

impl From<&StatsError> for ErrorCode {
    fn from(err: &StatsError) -> Self {
        match err {
            StatsError::EventNotFound(_) => ErrorCode::EventNotFound,
            StatsError::Validation(_) => ErrorCode::ValidationFailed,
            StatsError::StorageOperation(_)
            | StatsError::FileOperation(_)
            | StatsError::Serialization(_) => ErrorCode::StorageError,
            StatsError::Config(_) => ErrorCode::InternalServerError,
        }
    }
}

/// StatsError 对应的 HTTP 状态码
pub fn http_status(err: &StatsError) -> StatusCode {
    match err {
        StatsError::EventNotFound(_) => StatusCode::NOT_FOUND,
        StatsError::Validation(_) => StatusCode::BAD_REQUEST,
        StatsError::StorageOperation(_)
        | StatsError::FileOperation(_)
        | StatsError::Serialization(_)
        | StatsError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
