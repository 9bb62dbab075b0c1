//! Storage backends
//!
//! - `memory`: DashMap-based, process-local
//! - `file`: JSON snapshot rewritten after every write, append-only action log

mod file;
mod memory;

pub use file::FileStatsStore;
pub use memory::MemoryStatsStore;
