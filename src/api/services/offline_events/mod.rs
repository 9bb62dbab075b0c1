//! 线下活动 API 服务模块
//!
//! - 活动注册与查询
//! - 浏览 / 点击追踪
//! - 聚合统计与访客记录查询
//! - 主办方信息同步

pub mod error_code;
mod events;
mod groups;
mod helpers;
pub mod routes;
mod types;

pub use error_code::ErrorCode;
pub use helpers::{api_result, error_from_stats, error_response, success_response};
pub use types::*;
