//! Walks a results tree and reduces what it finds at the leaves into
//! a `Dataset`.
//!
//! The walk itself is sequential (directory listings are cheap); the
//! per-job file reads within one leaf fan out over rayon since jobs
//! are independent. Everything is merged back on the calling thread,
//! in job order, so results are identical to a sequential run.

use std::collections::BTreeMap;

use anyhow::{anyhow, Context, Result};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::{
    dataset::{Dataset, DatasetBuilder},
    debug,
    evaluator::options::SelectionOpts,
    job_stats::{aggregate_job_stats, rank_job_stat, scalar_job_stat, JobStat},
    key::ConfigKey,
    metric::{ClassifierRules, MetricLabel},
    results_dir::{ProcCountDir, ResultsDir},
    sample_file::{read_job_perf, read_time_out},
};

/// The synthetic metric label under which the scalar (`time.out`)
/// pipeline reports its one metric.
pub const EXECUTION_TIME_LABEL: &str = "execution time";

/// Drive `on_leaf` over every (configuration, process count) leaf the
/// selection accepts. Allow-list filtering happens before descending,
/// deselected subtrees are never read.
fn for_each_leaf(
    root: &ResultsDir,
    selection: &SelectionOpts,
    mut on_leaf: impl FnMut(ConfigKey, &ProcCountDir) -> Result<()>,
) -> Result<()> {
    for population_dir in root.population_dirs()? {
        if !selection.accepts_population_size(population_dir.population_size) {
            continue;
        }
        for fan_out_dir in population_dir.fan_out_dirs()? {
            if !selection.accepts_fan_out(fan_out_dir.fan_out) {
                continue;
            }
            for mode_dir in fan_out_dir.mode_dirs()? {
                let config = ConfigKey {
                    population_size: population_dir.population_size,
                    fan_out: fan_out_dir.fan_out,
                    sync_mode: mode_dir.sync_mode,
                };
                for proc_count_dir in mode_dir.proc_count_dirs()? {
                    on_leaf(config, &proc_count_dir)?;
                }
            }
        }
    }
    Ok(())
}

/// Reduce the `time.out` execution times of every selected leaf: one
/// triple per job (over that job's sample lines), averaged
/// componentwise across the leaf's jobs. A leaf without any job
/// directories contributes nothing; a job directory without its
/// `time.out` aborts the evaluation.
pub fn evaluate_times(root: &ResultsDir, selection: &SelectionOpts) -> Result<Dataset> {
    let mut builder = DatasetBuilder::new();
    for_each_leaf(root, selection, |config, leaf| {
        let job_dirs = leaf.job_dirs()?;
        let job_stats: Vec<JobStat> = job_dirs
            .par_iter()
            .map(|job_dir| -> Result<JobStat> {
                let path = job_dir.time_out_path();
                let samples = read_time_out(&path)?;
                scalar_job_stat(&samples)
                    .with_context(|| anyhow!("reducing the samples of {path:?}"))
            })
            .collect::<Result<_>>()?;
        debug!(
            "{config}: {} jobs at {} processes",
            job_stats.len(),
            leaf.process_count
        );
        if let Some(stat) = aggregate_job_stats(&job_stats) {
            builder.insert_leaf(
                config,
                leaf.process_count,
                EXECUTION_TIME_LABEL.into(),
                stat,
            );
        }
        Ok(())
    })?;
    Ok(builder.finish())
}

/// Reduce the `perf.<rank>.csv` probe tables of every selected leaf:
/// per job, each metric's rank values collapse into one triple
/// according to its classification; per leaf, the job triples are
/// averaged componentwise, per label.
pub fn evaluate_perf(
    root: &ResultsDir,
    selection: &SelectionOpts,
    rules: &ClassifierRules,
) -> Result<Dataset> {
    let mut builder = DatasetBuilder::new();
    for_each_leaf(root, selection, |config, leaf| {
        let job_dirs = leaf.job_dirs()?;
        let per_job: Vec<Vec<(MetricLabel, JobStat)>> = job_dirs
            .par_iter()
            .map(|job_dir| -> Result<Vec<(MetricLabel, JobStat)>> {
                let data = read_job_perf(job_dir.path(), leaf.process_count)
                    .with_context(|| {
                        anyhow!("reading the rank tables of job dir {:?}", job_dir.path())
                    })?;
                let mut stats = Vec::with_capacity(data.labels.len());
                for (label, rank_values) in data.labels.into_iter().zip(data.rank_values) {
                    let kind = rules.classify(&label)?;
                    stats.push((label, rank_job_stat(kind, &rank_values)));
                }
                Ok(stats)
            })
            .collect::<Result<_>>()?;
        debug!(
            "{config}: {} jobs at {} processes",
            per_job.len(),
            leaf.process_count
        );

        // Per label, the job triples in job order. Labels may vary
        // across jobs (schemas are only required to agree *within*
        // one job); each label aggregates over the jobs reporting it.
        let mut by_label: BTreeMap<MetricLabel, Vec<JobStat>> = BTreeMap::new();
        for job_stats in per_job {
            for (label, stat) in job_stats {
                by_label.entry(label).or_default().push(stat);
            }
        }
        for (label, stats) in by_label {
            if let Some(stat) = aggregate_job_stats(&stats) {
                builder.insert_leaf(config, leaf.process_count, label, stat);
            }
        }
        Ok(())
    })?;
    Ok(builder.finish())
}

/// Execution times rescaled against each series' smallest process
/// count.
pub fn evaluate_speed_up(root: &ResultsDir, selection: &SelectionOpts) -> Result<Dataset> {
    let times = evaluate_times(root, selection)?;
    Ok(times.speed_up()?)
}
