//! 细分维度键构建
//!
//! 从用户资料快照推导每个维度的分组键（每个维度至多一个）。
//! 大学键由国家代码和大学代码拼接而成，二者缺一则不产生大学键。

use serde::{Deserialize, Serialize};
use strum::EnumIter;
use tracing::warn;

use super::UserProfileSnapshot;

/// 计数路径分隔符，分组键中不允许出现
pub const PATH_SEPARATOR: char = '.';

/// 细分统计维度
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    University,
    Country,
    FieldOfStudy,
}

impl Dimension {
    /// 聚合文档中的字段名
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::University => "university",
            Self::Country => "country",
            Self::FieldOfStudy => "fieldOfStudy",
        }
    }

    /// 从资料快照中取出该维度的分组键
    pub fn key_of(&self, profile: &UserProfileSnapshot) -> Option<String> {
        match self {
            Self::University => university_key(profile),
            Self::Country => country_key(profile),
            Self::FieldOfStudy => field_of_study_key(profile),
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 大学键：`{countryCode}_{universityCode}`
pub fn university_key(profile: &UserProfileSnapshot) -> Option<String> {
    let country = usable_value(profile.country_code.as_deref(), "countryCode")?;
    let university = usable_value(profile.university_code.as_deref(), "universityCode")?;
    Some(format!("{}_{}", country, university))
}

pub fn country_key(profile: &UserProfileSnapshot) -> Option<String> {
    usable_value(profile.country_code.as_deref(), "countryCode").map(str::to_string)
}

pub fn field_of_study_key(profile: &UserProfileSnapshot) -> Option<String> {
    usable_value(profile.field_of_study_id.as_deref(), "fieldOfStudyId").map(str::to_string)
}

/// 过滤空值和无法作为计数路径的值
///
/// 含分隔符的值会破坏点分路径，记录警告后按缺失处理。
fn usable_value<'a>(value: Option<&'a str>, field: &str) -> Option<&'a str> {
    let value = value?;
    if value.trim().is_empty() {
        return None;
    }
    if value.contains(PATH_SEPARATOR) {
        warn!(
            "Segment value for '{}' contains '{}', skipping segment: {:?}",
            field, PATH_SEPARATOR, value
        );
        return None;
    }
    Some(value)
}
