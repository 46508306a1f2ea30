//! Subcommand implementations.

pub mod check;
pub mod fix;
pub mod init;
pub mod list_rules;
pub mod output;
mod setup;
