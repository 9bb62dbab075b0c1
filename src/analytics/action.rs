//! 行为类型配置
//!
//! 将 View / Click 映射到各自的时间戳字段与计数器字段。

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter};

use super::delta::CounterField;

/// 线下活动统计行为
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StatsAction {
    /// 浏览活动页面（TalentReached）
    View,
    /// 点击报名按钮（RegisterClicks）
    Click,
}

/// 计数器后缀
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CounterSuffix {
    TalentReached,
    RegisterClicks,
}

impl CounterSuffix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TalentReached => "TalentReached",
            Self::RegisterClicks => "RegisterClicks",
        }
    }
}

/// 单个行为类型对应的字段配置
///
/// 计数字段名由 `CounterField::name` 渲染，例如 `totalNumberOfTalentReached`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionConfig {
    /// 访客记录上的时间戳字段
    pub timestamp_field: &'static str,
    pub total_field: CounterField,
    pub unique_field: CounterField,
    pub suffix: CounterSuffix,
}

impl ActionConfig {
    fn for_suffix(timestamp_field: &'static str, suffix: CounterSuffix) -> Self {
        Self {
            timestamp_field,
            total_field: CounterField::total(suffix),
            unique_field: CounterField::unique(suffix),
            suffix,
        }
    }
}

impl StatsAction {
    pub fn config(&self) -> ActionConfig {
        match self {
            Self::View => ActionConfig::for_suffix("lastSeenAt", CounterSuffix::TalentReached),
            Self::Click => ActionConfig::for_suffix("lastClickedAt", CounterSuffix::RegisterClicks),
        }
    }
}

impl std::fmt::Display for StatsAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl std::str::FromStr for StatsAction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "view" => Ok(Self::View),
            "click" => Ok(Self::Click),
            _ => Err(format!("Invalid action: '{}'. Valid: view, click", s)),
        }
    }
}
