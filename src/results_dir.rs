//! The directory structure of a results tree:
//!
//! `<root>/<populationSize>/<K>/<mode>/<processCount>/<jobId>/`
//!
//! with the measurement files inside the job directories. Each level
//! is a typed wrapper that parses its directory name; listing a level
//! yields the next one down. Non-directory entries are skipped
//! silently (trees contain stray output files), but a *directory*
//! whose name does not parse as its level's type is an error.

use std::{
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{anyhow, Context, Result};

use crate::{
    key::{FanOut, JobId, PopulationSize, ProcessCount, SyncMode},
    sample_file::{perf_csv_file_name, TIME_OUT_FILE},
    utillib::type_name_short::type_name_short,
};

/// Skips non-directory entries, but requires all directory entries to
/// be convertible to `T`.
fn typed_subdirs<T: TryFrom<PathBuf, Error = anyhow::Error>>(dir: &Path) -> Result<Vec<T>> {
    let entries = std::fs::read_dir(dir).with_context(|| anyhow!("opening dir {dir:?}"))?;
    let mut subdirs = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| anyhow!("listing dir {dir:?}"))?;
        let file_type = entry
            .file_type()
            .with_context(|| anyhow!("getting file type of {:?}", entry.path()))?;
        if file_type.is_dir() {
            subdirs.push(T::try_from(entry.path()).with_context(|| {
                anyhow!(
                    "getting {} listing for dir {dir:?}",
                    type_name_short::<T>()
                )
            })?);
        }
    }
    Ok(subdirs)
}

fn parse_dir_name<T: FromStr>(path: &Path) -> Result<T>
where
    T::Err: Display,
{
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("path {path:?} is missing a directory name"))?;
    let name = file_name
        .to_str()
        .ok_or_else(|| anyhow!("directory name is not unicode: {path:?}"))?;
    name.parse().map_err(|e| {
        anyhow!(
            "directory name {name:?} does not parse as {}: {e}",
            type_name_short::<T>()
        )
    })
}

macro_rules! impl_level_dir {
    { $T:tt, $key:ident: $Key:ty } => {
        impl TryFrom<PathBuf> for $T {
            type Error = anyhow::Error;

            fn try_from(path: PathBuf) -> Result<Self> {
                let $key: $Key = parse_dir_name(&path)?;
                Ok(Self { path, $key })
            }
        }

        impl $T {
            pub fn path(&self) -> &Path {
                &self.path
            }
        }
    }
}

/// The root of a results tree. Not parsed from anything, any
/// directory can serve.
#[derive(Debug, Clone)]
pub struct ResultsDir(PathBuf);

impl ResultsDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn population_dirs(&self) -> Result<Vec<PopulationDir>> {
        let mut dirs: Vec<PopulationDir> = typed_subdirs(self.path())?;
        dirs.sort_by_key(|dir| dir.population_size);
        Ok(dirs)
    }
}

/// First level below the root, named by the population size.
#[derive(Debug, Clone)]
pub struct PopulationDir {
    path: PathBuf,
    pub population_size: PopulationSize,
}

impl PopulationDir {
    pub fn fan_out_dirs(&self) -> Result<Vec<FanOutDir>> {
        let mut dirs: Vec<FanOutDir> = typed_subdirs(self.path())?;
        dirs.sort_by_key(|dir| dir.fan_out);
        Ok(dirs)
    }
}

/// Second level, named by the fan-out parameter K.
#[derive(Debug, Clone)]
pub struct FanOutDir {
    path: PathBuf,
    pub fan_out: FanOut,
}

impl FanOutDir {
    pub fn mode_dirs(&self) -> Result<Vec<ModeDir>> {
        let mut dirs: Vec<ModeDir> = typed_subdirs(self.path())?;
        dirs.sort_by_key(|dir| dir.sync_mode);
        Ok(dirs)
    }
}

/// Third level, named by the synchronization mode.
#[derive(Debug, Clone)]
pub struct ModeDir {
    path: PathBuf,
    pub sync_mode: SyncMode,
}

impl ModeDir {
    pub fn proc_count_dirs(&self) -> Result<Vec<ProcCountDir>> {
        let mut dirs: Vec<ProcCountDir> = typed_subdirs(self.path())?;
        dirs.sort_by_key(|dir| dir.process_count);
        Ok(dirs)
    }
}

/// Fourth level, named by the process count: one (configuration,
/// process count) leaf, containing job repetitions.
#[derive(Debug, Clone)]
pub struct ProcCountDir {
    path: PathBuf,
    pub process_count: ProcessCount,
}

impl ProcCountDir {
    pub fn job_dirs(&self) -> Result<Vec<JobDir>> {
        let mut dirs: Vec<JobDir> = typed_subdirs(self.path())?;
        dirs.sort_by_key(|dir| dir.job_id);
        Ok(dirs)
    }
}

/// Innermost level, named by the job id; holds the measurement files
/// of one run.
#[derive(Debug, Clone)]
pub struct JobDir {
    path: PathBuf,
    pub job_id: JobId,
}

impl JobDir {
    pub fn time_out_path(&self) -> PathBuf {
        self.path().join(TIME_OUT_FILE)
    }

    pub fn perf_csv_path(&self, rank: u32) -> PathBuf {
        self.path().join(perf_csv_file_name(rank))
    }
}

impl_level_dir!(PopulationDir, population_size: PopulationSize);
impl_level_dir!(FanOutDir, fan_out: FanOut);
impl_level_dir!(ModeDir, sync_mode: SyncMode);
impl_level_dir!(ProcCountDir, process_count: ProcessCount);
impl_level_dir!(JobDir, job_id: JobId);

#[cfg(test)]
mod tests {
    use std::fs::{create_dir_all, File};

    use super::*;

    #[test]
    fn t_listing_is_typed_sorted_and_skips_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        for name in ["1000", "10", "200"] {
            create_dir_all(dir.path().join(name))?;
        }
        // stray non-directory sibling, must be ignored
        File::create(dir.path().join("README"))?;

        let root = ResultsDir::new(dir.path());
        let sizes: Vec<u64> = root
            .population_dirs()?
            .iter()
            .map(|d| d.population_size.0)
            .collect();
        assert_eq!(sizes, [10, 200, 1000]);
        Ok(())
    }

    #[test]
    fn t_unparsable_dir_name_is_an_error() -> Result<()> {
        let dir = tempfile::tempdir()?;
        create_dir_all(dir.path().join("100").join("notes"))?;
        let root = ResultsDir::new(dir.path());
        let err = root.population_dirs()?[0].fan_out_dirs().unwrap_err();
        assert!(err.to_string().contains("FanOut"), "{err:#}");
        Ok(())
    }

    #[test]
    fn t_mode_dir_parsing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        create_dir_all(dir.path().join("hard_sync"))?;
        create_dir_all(dir.path().join("ghost"))?;
        let modes: Vec<ModeDir> = typed_subdirs(dir.path())?;
        let mut modes: Vec<SyncMode> = modes.iter().map(|d| d.sync_mode).collect();
        modes.sort();
        assert_eq!(modes, [SyncMode::Ghost, SyncMode::HardSync]);
        Ok(())
    }

    #[test]
    fn t_job_dir_file_paths() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let job_path = dir.path().join("123456");
        create_dir_all(&job_path)?;
        let job = JobDir::try_from(job_path.clone())?;
        assert_eq!(job.job_id, JobId(123456));
        assert_eq!(job.time_out_path(), job_path.join("time.out"));
        assert_eq!(job.perf_csv_path(3), job_path.join("perf.3.csv"));
        Ok(())
    }
}
