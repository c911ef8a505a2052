//! Command-line interface

pub mod args;
pub mod commands;
mod invocation;

pub use args::{Cli, Commands};
pub use invocation::parse_external;
