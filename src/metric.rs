//! Metric labels and the classification contract deciding how each
//! metric is reduced across the ranks of a job.
//!
//! Classification is a pure function of the label string and is
//! applied consistently everywhere a label appears. It is a closed
//! world: a label no rule matches is an error, not a silently skipped
//! column.

use std::fmt::Display;

use kstring::KString;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Name of a measured quantity, as spelled in a `perf.<rank>.csv`
/// header row, or the synthetic label of the scalar pipeline.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetricLabel(KString);

impl MetricLabel {
    pub fn new(label: &str) -> Self {
        Self(KString::from_ref(label))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for MetricLabel {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

impl Display for MetricLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for MetricLabel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for MetricLabel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(MetricLabel::new(&s))
    }
}

/// How values of one metric are combined across the ranks of a job:
/// `Latency` metrics are averaged, `Count` metrics are summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricKind {
    Latency,
    Count,
}

#[derive(Debug, thiserror::Error)]
#[error("metric label {0:?} matches no classification rule")]
pub struct UnclassifiedMetricError(pub MetricLabel);

/// One classification rule: a label containing `contains`
/// (case-insensitively) is of kind `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifyRule {
    pub contains: String,
    pub kind: MetricKind,
}

/// The classification contract: an ordered rule list, first match
/// wins. Can be read from a config file (JSON5), the default
/// reproduces the label conventions of the simulation's probe output
/// (labels mentioning "time" are latencies, labels mentioning "count"
/// are counters).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierRules(Vec<ClassifyRule>);

lazy_static! {
    pub static ref DEFAULT_CLASSIFIER_RULES: ClassifierRules = ClassifierRules(vec![
        ClassifyRule {
            contains: "time".into(),
            kind: MetricKind::Latency,
        },
        ClassifyRule {
            contains: "count".into(),
            kind: MetricKind::Count,
        },
    ]);
}

impl Default for ClassifierRules {
    fn default() -> Self {
        DEFAULT_CLASSIFIER_RULES.clone()
    }
}

impl ClassifierRules {
    pub fn classify(&self, label: &MetricLabel) -> Result<MetricKind, UnclassifiedMetricError> {
        let label_lc = label.as_str().to_lowercase();
        for ClassifyRule { contains, kind } in &self.0 {
            if label_lc.contains(&contains.to_lowercase()) {
                return Ok(*kind);
            }
        }
        Err(UnclassifiedMetricError(label.clone()))
    }
}
