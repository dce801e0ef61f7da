//! splan command-line crate: argument parsing, config loading and terminal
//! output around the `splan-core` library.

pub mod cli;
pub mod load_config;
pub mod progress;

pub use cli::{run, Cli, Commands};
