//! Plugin command execution
//!
//! Maps a command to its package, makes sure the package is installed,
//! finds its entry point and runs it in a separate process whose exit code
//! becomes relay's own.

mod executor;
pub mod launcher;
pub mod request;

pub use executor::{CommandExecutor, Stage};
pub use launcher::{Loader, LoaderTable};
pub use request::{transferable_options, CommandInvocation, ExecutionRequest, REQUEST_ENV};
