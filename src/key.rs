//! The typed parameters identifying one experimental variant and one
//! run of it, as parsed from the directory names of a results tree.
//!
//! All of these are parsed exactly once, while walking the tree, and
//! are immutable afterwards. They are `Ord` so that datasets built
//! from them have a stable, reproducible iteration order.

use std::{fmt::Display, num::NonZeroU32, str::FromStr};

use serde::Serialize;
use strum_macros::EnumString;

/// Number of simulated entities (the original model calls them
/// cities) in one experimental variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PopulationSize(pub u64);

/// The fan-out parameter K of one experimental variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FanOut(pub u32);

/// The synchronization mode a variant was run under. The variants
/// spell exactly like the directory names in the results tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumString, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    #[strum(serialize = "ghost")]
    Ghost,
    #[strum(serialize = "hard_sync")]
    HardSync,
}

impl SyncMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncMode::Ghost => "ghost",
            SyncMode::HardSync => "hard_sync",
        }
    }
}

impl Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One experimental variant: everything that identifies a
/// configuration except the process count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ConfigKey {
    pub population_size: PopulationSize,
    pub fan_out: FanOut,
    pub sync_mode: SyncMode,
}

impl Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ConfigKey {
            population_size,
            fan_out,
            sync_mode,
        } = self;
        write!(f, "{population_size}/{fan_out}/{sync_mode}")
    }
}

/// Number of parallel worker processes of one run. The leaves of the
/// results tree are keyed by this; also the number of `perf.<rank>.csv`
/// files expected in a job directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ProcessCount(pub NonZeroU32);

impl ProcessCount {
    pub fn get(self) -> u32 {
        self.0.get()
    }

    pub fn ranks(self) -> impl Iterator<Item = u32> {
        0..self.get()
    }
}

/// Identifies one repetition of a (configuration, process count)
/// run. Multiple jobs per leaf are independent samples of the same
/// condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct JobId(pub u64);

macro_rules! delegate_display_and_from_str {
    { $T:tt, $Inner:ty } => {
        impl Display for $T {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $T {
            type Err = <$Inner as FromStr>::Err;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }
    }
}

delegate_display_and_from_str!(PopulationSize, u64);
delegate_display_and_from_str!(FanOut, u32);
delegate_display_and_from_str!(ProcessCount, NonZeroU32);
delegate_display_and_from_str!(JobId, u64);
