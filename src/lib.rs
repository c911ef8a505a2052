//! relay - a command runner whose commands live in registry packages
//!
//! Each command name maps to a package. relay resolves the package's
//! latest version, installs it into a version-keyed cache, locates its
//! entry file and runs it in a child process, handing over the parsed
//! arguments as a structured request.

pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod package;
pub mod plugin;
pub mod registry;
pub mod ui;
pub mod update;

pub use error::{RelayError, RelayResult};
