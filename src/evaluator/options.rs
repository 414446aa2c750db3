//! Options parameterizing a query over a results tree (excludes
//! subcommands or similar, those remain in src/bin/*.rs).

use std::path::PathBuf;

use anyhow::Result;

use crate::{
    json5_config::load_json5_config,
    key::{FanOut, PopulationSize},
    metric::ClassifierRules,
};

/// Allow-lists restricting which configurations are read. Empty
/// means no filtering. Applied before descending into a subtree, so
/// deselected data is never read.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SelectionOpts {
    /// Population sizes to include (default: all present in the tree)
    #[clap(short = 'n', long = "population-size")]
    pub population_sizes: Vec<u64>,

    /// Fan-out (K) values to include (default: all present)
    #[clap(short = 'k', long = "fan-out")]
    pub fan_outs: Vec<u32>,
}

impl SelectionOpts {
    pub fn accepts_population_size(&self, population_size: PopulationSize) -> bool {
        self.population_sizes.is_empty() || self.population_sizes.contains(&population_size.0)
    }

    pub fn accepts_fan_out(&self, fan_out: FanOut) -> bool {
        self.fan_outs.is_empty() || self.fan_outs.contains(&fan_out.0)
    }
}

/// Where the metric classification contract comes from.
#[derive(clap::Args, Debug, Default)]
pub struct ClassifierOpts {
    /// JSON5 file with classification rules,
    /// `[{contains: "...", kind: "Latency"|"Count"}, ...]`, first
    /// match winning. Default: labels mentioning "time" are
    /// latencies, labels mentioning "count" are counters.
    #[clap(long)]
    pub classifier_rules: Option<PathBuf>,
}

impl ClassifierOpts {
    pub fn load(&self) -> Result<ClassifierRules> {
        match &self.classifier_rules {
            Some(path) => load_json5_config(path),
            None => Ok(ClassifierRules::default()),
        }
    }
}
