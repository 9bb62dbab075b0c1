//! HTTP API
//!
//! 线下活动统计的 actix-web 接口层，业务逻辑全部委托给 `TrackingService`。

pub mod services;
