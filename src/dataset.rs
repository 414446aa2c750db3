//! The output side of the pipeline: process-count-ordered series per
//! (configuration, metric label), merged into one dataset.
//!
//! The builder is the only writer; a `Dataset` is immutable once
//! `finish` has run. Everything is kept in `BTreeMap`s so iteration
//! (and with it serialization) is deterministic.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    job_stats::JobStat,
    key::{ConfigKey, FanOut, PopulationSize, ProcessCount, SyncMode},
    metric::MetricLabel,
};

/// One aggregated point of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesEntry {
    pub process_count: ProcessCount,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

/// The aggregated statistics of one (configuration, metric label)
/// pair, strictly increasing in process count.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Series(Vec<SeriesEntry>);

#[derive(Debug, thiserror::Error)]
#[error("series has no entries")]
pub struct EmptySeriesError;

impl Series {
    fn from_leaf_stats(stats: BTreeMap<ProcessCount, JobStat>) -> Self {
        Series(
            stats
                .into_iter()
                .map(|(process_count, stat)| SeriesEntry {
                    process_count,
                    mean: stat.mean,
                    min: stat.min,
                    max: stat.max,
                })
                .collect(),
        )
    }

    pub fn entries(&self) -> &[SeriesEntry] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rescale against the entry at the smallest process count: every
    /// component value `v` becomes `t0 / v` where `t0` is the
    /// baseline mean.
    ///
    /// Dividing by a larger time yields a smaller speed-up, so the
    /// reciprocals of the (min, max) time bounds come out in reversed
    /// roles; they are re-sorted so that `min <= mean <= max` also
    /// holds for the transformed series.
    pub fn speed_up(&self) -> Result<Series, EmptySeriesError> {
        let baseline = self.0.first().ok_or(EmptySeriesError)?;
        let t0 = baseline.mean;
        Ok(Series(
            self.0
                .iter()
                .map(|entry| {
                    let bound_a = t0 / entry.min;
                    let bound_b = t0 / entry.max;
                    SeriesEntry {
                        process_count: entry.process_count,
                        mean: t0 / entry.mean,
                        min: bound_a.min(bound_b),
                        max: bound_a.max(bound_b),
                    }
                })
                .collect(),
        ))
    }
}

/// Accumulates leaf aggregates; the single writer behind a `Dataset`.
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    leaves: BTreeMap<ConfigKey, BTreeMap<MetricLabel, BTreeMap<ProcessCount, JobStat>>>,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the aggregated triple of one (configuration, process
    /// count, metric) leaf. Leaves come from distinct directory
    /// names, so inserting the same leaf twice is a logic error.
    pub fn insert_leaf(
        &mut self,
        config: ConfigKey,
        process_count: ProcessCount,
        label: MetricLabel,
        stat: JobStat,
    ) {
        let prev = self
            .leaves
            .entry(config)
            .or_default()
            .entry(label)
            .or_default()
            .insert(process_count, stat);
        debug_assert!(
            prev.is_none(),
            "duplicate leaf for process count {process_count}"
        );
    }

    pub fn finish(self) -> Dataset {
        Dataset(
            self.leaves
                .into_iter()
                .map(|(config, by_label)| {
                    (
                        config,
                        by_label
                            .into_iter()
                            .map(|(label, stats)| (label, Series::from_leaf_stats(stats)))
                            .collect(),
                    )
                })
                .collect(),
        )
    }
}

/// The final artifact: configuration → metric label → series.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset(BTreeMap<ConfigKey, BTreeMap<MetricLabel, Series>>);

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn configs(&self) -> impl Iterator<Item = &ConfigKey> {
        self.0.keys()
    }

    pub fn metrics(&self, config: &ConfigKey) -> Option<&BTreeMap<MetricLabel, Series>> {
        self.0.get(config)
    }

    pub fn series(&self, config: &ConfigKey, label: &MetricLabel) -> Option<&Series> {
        self.0.get(config)?.get(label)
    }

    pub fn iter(
        &self,
    ) -> impl Iterator<Item = (&ConfigKey, &BTreeMap<MetricLabel, Series>)> {
        self.0.iter()
    }

    /// Apply the speed-up transform to every series, keeping
    /// configurations and labels.
    pub fn speed_up(&self) -> Result<Dataset, EmptySeriesError> {
        let mut out = BTreeMap::new();
        for (config, by_label) in &self.0 {
            let mut transformed = BTreeMap::new();
            for (label, series) in by_label {
                transformed.insert(label.clone(), series.speed_up()?);
            }
            out.insert(*config, transformed);
        }
        Ok(Dataset(out))
    }
}

/// Serializes as an array of configuration groups, flat enough for a
/// renderer to consume without knowing `ConfigKey`.
impl Serialize for Dataset {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Group<'t> {
            population_size: PopulationSize,
            fan_out: FanOut,
            sync_mode: SyncMode,
            metrics: &'t BTreeMap<MetricLabel, Series>,
        }
        serializer.collect_seq(self.0.iter().map(|(config, metrics)| Group {
            population_size: config.population_size,
            fan_out: config.fan_out,
            sync_mode: config.sync_mode,
            metrics,
        }))
    }
}
