//! # CLI Layer
//!
//! One client of the shoebox library. The only place that knows about
//! terminal I/O, exit codes, and argument parsing.
//!
//! - `setup`: clap definitions and log initialization
//! - `commands`: `run()` and the per-command handlers
//! - `print`: rendering of `CmdResult` values

mod commands;
mod print;
mod setup;

pub use commands::run;
