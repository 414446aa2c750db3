//! The query drivers tying the tree walk, the sample readers and the
//! reducers together. Argv handling stays in `src/bin/`; the options
//! structs here are what the subcommands flatten in.

pub mod evaluator;
pub mod options;
