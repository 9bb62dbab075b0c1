use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use super::StaticConfig;

static CONFIG: OnceLock<ArcSwap<StaticConfig>> = OnceLock::new();

/// Get the global configuration instance
///
/// Returns an Arc pointer to the configuration, which is cheap to clone
/// and doesn't hold any locks.
pub fn get_config() -> Arc<StaticConfig> {
    CONFIG
        .get()
        .expect("Config not initialized. Call update_config() first.")
        .load_full()
}

/// Install or replace the global configuration
///
/// `main` calls this once with the result of `StaticConfig::try_load`.
///
/// # Examples
/// ```no_run
/// use offline_event_stats::config::{StaticConfig, update_config};
/// update_config(StaticConfig::default());
/// ```
pub fn update_config(config: StaticConfig) {
    match CONFIG.get() {
        Some(current) => current.store(Arc::new(config)),
        None => {
            let _ = CONFIG.set(ArcSwap::from_pointee(config));
        }
    }
}
