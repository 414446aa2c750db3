use std::{
    fs::File,
    io::{stdout, BufWriter, Write},
    path::PathBuf,
};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use simbench_evaluator::dataset::Dataset;
use simbench_evaluator::evaluator::evaluator::{
    evaluate_perf, evaluate_speed_up, evaluate_times,
};
use simbench_evaluator::evaluator::options::{ClassifierOpts, SelectionOpts};
use simbench_evaluator::get_terminal_width::get_terminal_width;
use simbench_evaluator::info;
use simbench_evaluator::results_dir::ResultsDir;
use simbench_evaluator::utillib::logging::{set_log_level, LogLevelOpt};

const PROGRAM_NAME: &str = "simbench-evaluator";

#[derive(clap::Parser, Debug)]
#[clap(next_line_help = true)]
#[clap(set_term_width = get_terminal_width())]
struct Opts {
    #[clap(flatten)]
    log_level: LogLevelOpt,

    /// The subcommand to run. Use `--help` after the sub-command to
    /// get a list of the allowed options there.
    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct QueryOpts {
    #[clap(flatten)]
    selection: SelectionOpts,

    /// Path to write the resulting dataset to as JSON (default:
    /// stdout)
    #[clap(short, long)]
    out: Option<PathBuf>,

    /// Root directory of the simulation results tree
    #[clap(default_value = ".")]
    results_dir: PathBuf,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Print version
    Version,

    /// Reduce the `time.out` execution times across the tree into
    /// per-process-count series
    Times {
        #[clap(flatten)]
        query: QueryOpts,
    },

    /// Reduce the `perf.<rank>.csv` probe tables across the tree into
    /// per-process-count series, one per metric label
    Perf {
        #[clap(flatten)]
        query: QueryOpts,

        #[clap(flatten)]
        classifier: ClassifierOpts,
    },

    /// Execution times rescaled against the smallest process count of
    /// each series
    SpeedUp {
        #[clap(flatten)]
        query: QueryOpts,
    },
}

fn write_dataset(dataset: &Dataset, out: &Option<PathBuf>) -> Result<()> {
    match out {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| anyhow!("creating output file {path:?}"))?;
            let mut file = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut file, dataset)?;
            file.write_all(b"\n")?;
            file.flush()
                .with_context(|| anyhow!("writing output file {path:?}"))?;
        }
        None => {
            let mut lock = stdout().lock();
            serde_json::to_writer_pretty(&mut lock, dataset)?;
            lock.write_all(b"\n")?;
        }
    }
    Ok(())
}

fn run_query(query: &QueryOpts, evaluate: impl FnOnce(&ResultsDir) -> Result<Dataset>) -> Result<()> {
    info!("reading data from {:?}", query.results_dir);
    let root = ResultsDir::new(&query.results_dir);
    let dataset = evaluate(&root)?;
    if dataset.is_empty() {
        info!("no data selected below {:?}", query.results_dir);
    }
    write_dataset(&dataset, &query.out)
}

fn main() -> Result<()> {
    let Opts { log_level, command } = Opts::parse();
    set_log_level((&log_level).into());

    match &command {
        Command::Version => {
            println!("{PROGRAM_NAME} {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Command::Times { query } => {
            run_query(query, |root| evaluate_times(root, &query.selection))
        }
        Command::Perf { query, classifier } => run_query(query, |root| {
            let rules = classifier.load()?;
            evaluate_perf(root, &query.selection, &rules)
        }),
        Command::SpeedUp { query } => {
            run_query(query, |root| evaluate_speed_up(root, &query.selection))
        }
    }
}
