//! Statistical reduction of raw samples: one job's samples to a
//! (mean, min, max) triple, and a list of such triples to their
//! componentwise average.
//!
//! These are pure functions, no state is owned here.

use serde::Serialize;

use crate::metric::MetricKind;

/// The reduced representation of one job's raw samples for one
/// metric. Holds `min <= mean <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JobStat {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl JobStat {
    /// Whether the triple is ordered as it must be. Only violated by
    /// a programming error, never by data.
    pub fn is_ordered(&self) -> bool {
        self.min <= self.mean && self.mean <= self.max
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("no samples given")]
    NoInputs,
}

/// Reduce the scalar samples of one job (all lines of its `time.out`)
/// to a triple. This is a per-job reduction: lines are repeated
/// measurements, not per-rank values.
pub fn scalar_job_stat(samples: &[f64]) -> Result<JobStat, StatsError> {
    if samples.is_empty() {
        return Err(StatsError::NoInputs);
    }
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut sum = 0.0;
    for &sample in samples {
        min = min.min(sample);
        max = max.max(sample);
        sum += sample;
    }
    Ok(JobStat {
        mean: sum / samples.len() as f64,
        min,
        max,
    })
}

/// Reduce the per-rank values of one metric within one job.
///
/// Latency metrics: arithmetic mean across ranks, with the raw rank
/// minimum and maximum as bounds. Count metrics: the sum across
/// ranks, repeated in all three components; counts have no meaningful
/// spread once summed, but downstream code wants one triple shape for
/// every metric.
///
/// The caller guarantees one value per rank; a length mismatch with
/// the process count is a logic error upstream, not re-validated
/// here. Must not be called with an empty slice.
pub fn rank_job_stat(kind: MetricKind, rank_values: &[u64]) -> JobStat {
    debug_assert!(!rank_values.is_empty());
    match kind {
        MetricKind::Latency => {
            let mut min = u64::MAX;
            let mut max = u64::MIN;
            let mut sum: u128 = 0;
            for &value in rank_values {
                min = min.min(value);
                max = max.max(value);
                sum += u128::from(value);
            }
            JobStat {
                mean: sum as f64 / rank_values.len() as f64,
                min: min as f64,
                max: max as f64,
            }
        }
        MetricKind::Count => {
            let sum: u128 = rank_values.iter().map(|v| u128::from(*v)).sum();
            let sum = sum as f64;
            JobStat {
                mean: sum,
                min: sum,
                max: sum,
            }
        }
    }
}

/// Combine the per-job triples of one (configuration, process count,
/// metric) leaf into one triple by averaging the three components
/// independently across jobs.
///
/// Deliberately NOT the min/max of the raw union: the bounds express
/// the spread of job-level results, which is what the downstream
/// error bars show. `None` when there are no jobs; such a leaf is
/// absent from the series, it is not an error.
pub fn aggregate_job_stats(stats: &[JobStat]) -> Option<JobStat> {
    if stats.is_empty() {
        return None;
    }
    let n = stats.len() as f64;
    let mut mean = 0.0;
    let mut min = 0.0;
    let mut max = 0.0;
    for stat in stats {
        mean += stat.mean;
        min += stat.min;
        max += stat.max;
    }
    Some(JobStat {
        mean: mean / n,
        min: min / n,
        max: max / n,
    })
}
