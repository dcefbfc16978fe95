//! Tooling Layer
//!
//! Command-line access to on-disk partitions. A thin wrapper translating
//! commands into storage calls and storage results into printable output.

pub mod cli;

pub use cli::{Cli, CliContext, CommandOutput, Commands, ListFormat};
