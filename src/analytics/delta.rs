//! 统计增量
//!
//! 以类型化路径（作用域 + 计数字段）表示稀疏的增量映射，
//! 只在写入聚合文档或对外输出时渲染为点分路径字符串。

use std::collections::BTreeMap;

use super::action::CounterSuffix;
use super::segment::Dimension;

/// 计数类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Total,
    Unique,
}

impl Metric {
    fn prefix(&self) -> &'static str {
        match self {
            Self::Total => "total",
            Self::Unique => "unique",
        }
    }
}

/// 计数字段，例如 `uniqueNumberOfTalentReached`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CounterField {
    pub metric: Metric,
    pub suffix: CounterSuffix,
}

impl CounterField {
    pub fn total(suffix: CounterSuffix) -> Self {
        Self {
            metric: Metric::Total,
            suffix,
        }
    }

    pub fn unique(suffix: CounterSuffix) -> Self {
        Self {
            metric: Metric::Unique,
            suffix,
        }
    }

    pub fn name(&self) -> String {
        format!("{}NumberOf{}", self.metric.prefix(), self.suffix.as_str())
    }
}

/// 计数器所在的作用域
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    General,
    Segment { dimension: Dimension, key: String },
}

/// 聚合文档中某个计数器的完整路径
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CounterPath {
    pub scope: Scope,
    pub field: CounterField,
}

impl CounterPath {
    pub fn general(field: CounterField) -> Self {
        Self {
            scope: Scope::General,
            field,
        }
    }

    pub fn segment(dimension: Dimension, key: impl Into<String>, field: CounterField) -> Self {
        Self {
            scope: Scope::Segment {
                dimension,
                key: key.into(),
            },
            field,
        }
    }

    /// 渲染为点分路径，如 `university.DE_TUM.totalNumberOfTalentReached`
    pub fn to_dotted(&self) -> String {
        match &self.scope {
            Scope::General => format!("general.{}", self.field.name()),
            Scope::Segment { dimension, key } => {
                format!("{}.{}.{}", dimension.as_str(), key, self.field.name())
            }
        }
    }
}

impl std::fmt::Display for CounterPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_dotted())
    }
}

/// 稀疏增量映射（路径 -> 有符号增量）
///
/// 调用方应将其作为原子自增操作应用到聚合文档，而不是绝对写入。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsDelta {
    entries: BTreeMap<CounterPath, i64>,
}

impl StatsDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, path: CounterPath) {
        self.add(path, 1);
    }

    /// 扣减计数，只允许作用于 unique 计数器
    pub fn decrement_unique(&mut self, path: CounterPath) {
        debug_assert_eq!(path.field.metric, Metric::Unique);
        if path.field.metric != Metric::Unique {
            tracing::warn!("Refusing to decrement non-unique counter: {}", path);
            return;
        }
        self.add(path, -1);
    }

    fn add(&mut self, path: CounterPath, amount: i64) {
        let value = self.entries.entry(path.clone()).or_insert(0);
        *value += amount;
        if *value == 0 {
            self.entries.remove(&path);
        }
    }

    pub fn get(&self, path: &CounterPath) -> Option<i64> {
        self.entries.get(path).copied()
    }

    /// 按点分路径查询，测试和调试时更直观
    pub fn get_dotted(&self, path: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(p, _)| p.to_dotted() == path)
            .map(|(_, v)| *v)
    }

    pub fn contains_dotted(&self, path: &str) -> bool {
        self.get_dotted(path).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CounterPath, i64)> {
        self.entries.iter().map(|(p, v)| (p, *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 合并另一组增量（用于批量应用）
    pub fn merge(&mut self, other: &StatsDelta) {
        for (path, amount) in other.iter() {
            self.add(path.clone(), amount);
        }
    }

    pub fn to_dotted_map(&self) -> BTreeMap<String, i64> {
        self.entries
            .iter()
            .map(|(p, v)| (p.to_dotted(), *v))
            .collect()
    }
}
