//! Offline event stats - talent reach and registration click aggregation
//!
//! Tracks visitor views and registration clicks on offline events and keeps
//! per-event aggregate counters (overall, and per university, country and
//! field of study) consistent as visitors' profiles change.
//!
//! # Architecture
//! - `analytics`: Counter delta computation (pure, no I/O)
//! - `storage`: Stats store trait and backends (memory, JSON file)
//! - `services`: Tracking service with per-visitor serialization
//! - `api`: HTTP services
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle and execution modes
//! - `system`: Logging setup

pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
