pub mod health;
pub mod offline_events;

pub use health::{AppStartTime, HealthService, health_routes};
pub use offline_events::routes::{groups_routes, offline_events_routes, v1_routes};
pub use offline_events::{ApiResponse, ErrorCode};
