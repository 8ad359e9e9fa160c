//! Subcommand implementations.

pub mod check;
pub mod generate;
pub mod init;
pub mod output;
pub mod process;
