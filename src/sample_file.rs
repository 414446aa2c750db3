//! Reading the two raw measurement forms found in a job directory:
//! the scalar `time.out` file (one floating point sample per line)
//! and the per-rank `perf.<rank>.csv` probe tables (a header row of
//! metric labels plus exactly one data row of integers).
//!
//! Everything here reads one job at a time; nothing is cached or
//! streamed, the files are small.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use itertools::Itertools;

use crate::{key::ProcessCount, metric::MetricLabel};

pub const TIME_OUT_FILE: &str = "time.out";

pub fn perf_csv_file_name(rank: u32) -> String {
    format!("perf.{rank}.csv")
}

/// A data file that the directory structure promises but that is not
/// there. Unrecoverable: a leaf with partially present data must
/// abort the whole evaluation, not degrade it.
#[derive(Debug, thiserror::Error)]
#[error("missing data file {path:?} (expected {expected})")]
pub struct MissingDataError {
    pub path: PathBuf,
    pub expected: String,
}

/// A line or cell that does not parse as the number it has to be.
#[derive(Debug, thiserror::Error)]
#[error("malformed sample at {path:?}:{line}: {reason}")]
pub struct MalformedSampleError {
    pub path: PathBuf,
    /// 1-based
    pub line: usize,
    pub reason: String,
}

/// Rank tables within one job must expose the identical ordered set
/// of metric labels.
#[derive(Debug, thiserror::Error)]
#[error("rank table {path:?} disagrees on metric labels: expected [{}], found [{}]",
        .expected.iter().join(", "), .found.iter().join(", "))]
pub struct SchemaMismatchError {
    pub path: PathBuf,
    pub expected: Vec<MetricLabel>,
    pub found: Vec<MetricLabel>,
}

fn open_data_file(path: &Path, expected: &str) -> Result<File> {
    match File::open(path) {
        Ok(file) => Ok(file),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(MissingDataError {
            path: path.to_owned(),
            expected: expected.to_owned(),
        }
        .into()),
        Err(e) => Err(e).with_context(|| anyhow!("opening data file {path:?}")),
    }
}

/// Read a scalar sample file: one floating point value per line, each
/// line one raw sample.
pub fn read_time_out(path: &Path) -> Result<Vec<f64>> {
    let input = open_data_file(path, "one floating point sample per line")?;

    let mut samples = Vec::new();
    for (index, line) in BufReader::new(input).lines().enumerate() {
        let line = line.with_context(|| anyhow!("reading {path:?}"))?;
        let value: f64 = line.trim().parse().map_err(|e| MalformedSampleError {
            path: path.to_owned(),
            line: index + 1,
            reason: format!("{e}: {:?}", line.trim()),
        })?;
        samples.push(value);
    }
    Ok(samples)
}

/// The parsed contents of one `perf.<rank>.csv` file.
#[derive(Debug, PartialEq, Eq)]
pub struct RankTable {
    pub labels: Vec<MetricLabel>,
    /// Same length and order as `labels`.
    pub values: Vec<u64>,
}

/// Read one rank's probe table: a comma-separated header row naming
/// the metrics, then exactly one comma-separated data row of
/// integers.
pub fn read_perf_csv(path: &Path) -> Result<RankTable> {
    let input = open_data_file(path, "per-rank probe table")?;

    let malformed = |line: usize, reason: String| MalformedSampleError {
        path: path.to_owned(),
        line,
        reason,
    };

    let mut lines = BufReader::new(input).lines();
    let mut next_line = |linenum: usize| -> Result<Option<String>> {
        lines
            .next()
            .transpose()
            .with_context(|| anyhow!("reading {path:?}:{linenum}"))
    };

    let header = next_line(1)?
        .ok_or_else(|| malformed(1, "missing header row".into()))?;
    let labels: Vec<MetricLabel> = header.split(',').map(|s| s.trim().into()).collect();

    let data_row = next_line(2)?
        .ok_or_else(|| malformed(2, "missing data row".into()))?;
    let values: Vec<u64> = data_row
        .split(',')
        .map(|cell| {
            let cell = cell.trim();
            cell.parse()
                .map_err(|e| malformed(2, format!("{e}: {cell:?}")))
        })
        .collect::<Result<_, _>>()?;

    if values.len() != labels.len() {
        return Err(malformed(
            2,
            format!(
                "data row has {} cells but the header names {} metrics",
                values.len(),
                labels.len()
            ),
        )
        .into());
    }

    if let Some(extra) = next_line(3)? {
        if !extra.trim().is_empty() {
            return Err(malformed(3, "expected exactly one data row".into()).into());
        }
    }

    Ok(RankTable { labels, values })
}

/// All rank tables of one job, schema-checked against each other.
#[derive(Debug, PartialEq, Eq)]
pub struct JobPerfData {
    pub labels: Vec<MetricLabel>,
    /// `rank_values[column][rank]`; column order as in `labels`, rank
    /// order `0..process_count`.
    pub rank_values: Vec<Vec<u64>>,
}

/// Read `perf.0.csv` .. `perf.<processCount - 1>.csv` from a job
/// directory. A missing rank file is a `MissingDataError`, rank
/// tables disagreeing on their labels a `SchemaMismatchError`.
pub fn read_job_perf(job_dir: &Path, process_count: ProcessCount) -> Result<JobPerfData> {
    let mut labels: Option<Vec<MetricLabel>> = None;
    let mut rank_values: Vec<Vec<u64>> = Vec::new();

    for rank in process_count.ranks() {
        let path = job_dir.join(perf_csv_file_name(rank));
        let table = read_perf_csv(&path)?;
        if let Some(labels) = &labels {
            if *labels != table.labels {
                return Err(SchemaMismatchError {
                    path,
                    expected: labels.clone(),
                    found: table.labels,
                }
                .into());
            }
            for (column, value) in table.values.into_iter().enumerate() {
                rank_values[column].push(value);
            }
        } else {
            rank_values = table.values.into_iter().map(|value| vec![value]).collect();
            labels = Some(table.labels);
        }
    }

    let labels = labels.expect("at least one rank since process count is non-zero");
    Ok(JobPerfData {
        labels,
        rank_values,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        write!(file, "{contents}").unwrap();
        path
    }

    #[test]
    fn t_read_time_out() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_file(dir.path(), TIME_OUT_FILE, "10.0\n5.5\n0.25\n");
        assert_eq!(read_time_out(&path)?, [10.0, 5.5, 0.25]);
        Ok(())
    }

    #[test]
    fn t_time_out_malformed_line() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_file(dir.path(), TIME_OUT_FILE, "10.0\nbogus\n1.0\n");
        let err = read_time_out(&path).unwrap_err();
        let err: MalformedSampleError = err.downcast()?;
        assert_eq!(err.line, 2);
        assert!(err.reason.contains("bogus"));
        Ok(())
    }

    #[test]
    fn t_time_out_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_time_out(&dir.path().join(TIME_OUT_FILE)).unwrap_err();
        assert!(err.downcast_ref::<MissingDataError>().is_some());
    }

    #[test]
    fn t_read_perf_csv() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_file(
            dir.path(),
            "perf.0.csv",
            "behavior_time,sync_count\n120,7\n",
        );
        let table = read_perf_csv(&path)?;
        assert_eq!(
            table.labels,
            ["behavior_time".into(), "sync_count".into()]
        );
        assert_eq!(table.values, [120, 7]);
        Ok(())
    }

    #[test]
    fn t_perf_csv_cell_count_mismatch() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_file(dir.path(), "perf.0.csv", "a_time,b_count\n120\n");
        let err: MalformedSampleError = read_perf_csv(&path).unwrap_err().downcast()?;
        assert_eq!(err.line, 2);
        Ok(())
    }

    #[test]
    fn t_perf_csv_second_data_row() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = write_file(dir.path(), "perf.0.csv", "a_time\n120\n130\n");
        let err: MalformedSampleError = read_perf_csv(&path).unwrap_err().downcast()?;
        assert_eq!(err.line, 3);
        Ok(())
    }

    #[test]
    fn t_job_perf_transposed_by_column() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_file(dir.path(), "perf.0.csv", "a_time,b_count\n10,1\n");
        write_file(dir.path(), "perf.1.csv", "a_time,b_count\n30,2\n");
        let data = read_job_perf(dir.path(), "2".parse()?)?;
        assert_eq!(data.labels, ["a_time".into(), "b_count".into()]);
        assert_eq!(data.rank_values, [vec![10, 30], vec![1, 2]]);
        Ok(())
    }

    #[test]
    fn t_job_perf_missing_rank() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_file(dir.path(), "perf.0.csv", "a_time\n10\n");
        write_file(dir.path(), "perf.1.csv", "a_time\n30\n");
        // declared with 4 ranks, only 2 present
        let err = read_job_perf(dir.path(), "4".parse()?).unwrap_err();
        let err: MissingDataError = err.downcast()?;
        assert!(err.path.ends_with("perf.2.csv"));
        Ok(())
    }

    #[test]
    fn t_job_perf_schema_mismatch() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write_file(dir.path(), "perf.0.csv", "a_time,b_count\n10,1\n");
        write_file(dir.path(), "perf.1.csv", "a_time,c_count\n30,2\n");
        let err = read_job_perf(dir.path(), "2".parse()?).unwrap_err();
        let err: SchemaMismatchError = err.downcast()?;
        assert!(err.path.ends_with("perf.1.csv"));
        Ok(())
    }
}
