pub mod dataset;
pub mod evaluator;
pub mod get_terminal_width;
pub mod job_stats;
pub mod json5_config;
pub mod key;
pub mod metric;
pub mod results_dir;
pub mod sample_file;
pub mod utillib;
