//! CLI subcommands.

pub mod check;
pub mod list_checks;
pub mod output;
