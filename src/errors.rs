use std::fmt;

#[derive(Debug, Clone)]
pub enum StatsError {
    EventNotFound(String),
    Validation(String),
    StorageOperation(String),
    FileOperation(String),
    Serialization(String),
    Config(String),
}

impl StatsError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            StatsError::EventNotFound(_) => "E001",
            StatsError::Validation(_) => "E002",
            StatsError::StorageOperation(_) => "E003",
            StatsError::FileOperation(_) => "E004",
            StatsError::Serialization(_) => "E005",
            StatsError::Config(_) => "E006",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            StatsError::EventNotFound(_) => "Offline Event Not Found",
            StatsError::Validation(_) => "Validation Error",
            StatsError::StorageOperation(_) => "Storage Operation Error",
            StatsError::FileOperation(_) => "File Operation Error",
            StatsError::Serialization(_) => "Serialization Error",
            StatsError::Config(_) => "Configuration Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            StatsError::EventNotFound(msg) => msg,
            StatsError::Validation(msg) => msg,
            StatsError::StorageOperation(msg) => msg,
            StatsError::FileOperation(msg) => msg,
            StatsError::Serialization(msg) => msg,
            StatsError::Config(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式启动失败）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for StatsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for StatsError {}

// 便捷的构造函数
impl StatsError {
    pub fn event_not_found<T: Into<String>>(msg: T) -> Self {
        StatsError::EventNotFound(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        StatsError::Validation(msg.into())
    }

    pub fn storage_operation<T: Into<String>>(msg: T) -> Self {
        StatsError::StorageOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        StatsError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        StatsError::Serialization(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        StatsError::Config(msg.into())
    }
}

impl From<std::io::Error> for StatsError {
    fn from(err: std::io::Error) -> Self {
        StatsError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for StatsError {
    fn from(err: serde_json::Error) -> Self {
        StatsError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for StatsError {
    fn from(err: config::ConfigError) -> Self {
        StatsError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;
