use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, IntoEnumIterator};

use crate::errors::{Result, StatsError};

/// 聚合存储后端类型
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageBackend {
    /// 进程内存储，重启后数据丢失
    #[default]
    Memory,
    /// JSON 快照文件
    File,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::iter()
            .find(|b| b.as_ref().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let valid: Vec<String> = Self::iter().map(|b| b.as_ref().to_string()).collect();
                format!(
                    "Invalid storage backend: '{}'. Valid: {}",
                    s,
                    valid.join(", ")
                )
            })
    }
}

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 服务器地址、端口、worker 数量
/// - storage: 聚合存储后端
/// - logging: 日志配置
/// - tracking: 行为追踪配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
}

impl StaticConfig {
    /// 默认配置文件路径
    pub const DEFAULT_PATH: &'static str = "config.toml";

    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：OES，分隔符：__
    /// 示例：OES__SERVER__PORT=9999
    pub fn try_load(path: Option<&str>) -> Result<Self> {
        use config::{Config, Environment, File};

        let path = path.unwrap_or(Self::DEFAULT_PATH);

        let settings = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖
            .add_source(
                Environment::with_prefix("OES")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: StaticConfig = settings.try_deserialize()?;
        config.validate()?;

        if std::path::Path::new(path).exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path);
        }
        Ok(config)
    }

    /// 校验配置项之间的约束
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(StatsError::config("server.port must not be 0"));
        }
        if self.server.cpu_count == 0 {
            return Err(StatsError::config("server.cpu_count must be at least 1"));
        }
        if self.storage.backend == StorageBackend::File && self.storage.file_path.trim().is_empty()
        {
            return Err(StatsError::config(
                "storage.file_path is required when storage.backend = \"file\"",
            ));
        }
        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(StatsError::config(format!(
                "Invalid logging.format: '{}'. Valid: text, json",
                self.logging.format
            )));
        }
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 聚合存储配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// file 后端的快照路径
    #[serde(default = "default_storage_file_path")]
    pub file_path: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 行为追踪配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// 是否为每次行为写入一条行为日志
    #[serde(default = "default_record_actions")]
    pub record_actions: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_storage_file_path() -> String {
    "offline-event-stats.json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    None
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_record_actions() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            file_path: default_storage_file_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            record_actions: default_record_actions(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = StaticConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(config.tracking.record_actions);
    }

    #[test]
    fn test_file_backend_requires_path() {
        let mut config = StaticConfig::default();
        config.storage.backend = StorageBackend::File;
        config.storage.file_path = " ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = StaticConfig::default();
        config.logging.format = "xml".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.message().contains("logging.format"));
    }

    #[test]
    fn test_sample_config_sections() {
        let sample = StaticConfig::generate_sample_config();
        assert!(sample.contains("[server]"));
        assert!(sample.contains("[storage]"));
        assert!(sample.contains("[tracking]"));
        assert!(sample.contains("backend = \"memory\""));
    }

    #[test]
    fn test_parse_storage_backend() {
        assert_eq!("FILE".parse::<StorageBackend>().unwrap(), StorageBackend::File);
        let err = "redis".parse::<StorageBackend>().unwrap_err();
        assert!(err.contains("memory, file"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9100\n\n[storage]\nbackend = \"file\"\nfile_path = \"stats.json\"\n",
        )
        .unwrap();

        let config = StaticConfig::try_load(path.to_str()).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.storage.file_path, "stats.json");
        assert_eq!(config.logging.level, "info");
    }
}
