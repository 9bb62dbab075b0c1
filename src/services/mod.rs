//! Service layer for business logic
//!
//! Shared between the HTTP handlers and anything else that needs to track
//! offline event actions.

mod tracking_service;
pub mod visitor_locks;

pub use tracking_service::*;
pub use visitor_locks::{VisitorGuard, VisitorLocks};
