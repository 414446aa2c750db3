//! Logging to stderr, gated by a process-global level. Two macros
//! and an atomic are all the binaries need, no logging framework.

use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    /// Log nothing
    None = 0,
    /// Tell the user what is being done
    Info = 1,
    /// Additionally show details that only help debugging this
    /// program
    Debug = 2,
}

/// The command line surface for choosing a level.
#[derive(Debug, Clone, clap::Args)]
pub struct LogLevelOpt {
    /// Show what is being done
    #[clap(short, long)]
    verbose: bool,

    /// Show information that helps debug this program (implies
    /// `--verbose`)
    #[clap(short, long)]
    debug: bool,
}

impl From<&LogLevelOpt> for LogLevel {
    fn from(opt: &LogLevelOpt) -> Self {
        if opt.debug {
            LogLevel::Debug
        } else if opt.verbose {
            LogLevel::Info
        } else {
            LogLevel::None
        }
    }
}

static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::None as u8);

pub fn set_log_level(level: LogLevel) {
    LOG_LEVEL.store(level as u8, Ordering::Relaxed);
}

#[inline]
pub fn log_level() -> LogLevel {
    match LOG_LEVEL.load(Ordering::Relaxed) {
        1 => LogLevel::Info,
        2 => LogLevel::Debug,
        _ => LogLevel::None,
    }
}

#[macro_export]
macro_rules! info {
    { $($arg:tt)* } => {
        if $crate::utillib::logging::log_level() >= $crate::utillib::logging::LogLevel::Info {
            eprintln!($($arg)*);
        }
    }
}

#[macro_export]
macro_rules! debug {
    { $($arg:tt)* } => {
        if $crate::utillib::logging::log_level() >= $crate::utillib::logging::LogLevel::Debug {
            eprintln!($($arg)*);
        }
    }
}
