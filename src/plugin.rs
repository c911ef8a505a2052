//! Plugin side of the execution contract
//!
//! A command package written in Rust implements [`Plugin`] and calls
//! [`run`] from its `main`:
//!
//! ```rust,ignore
//! use relay::plugin::{self, Plugin, PluginRequest};
//!
//! struct Init;
//!
//! impl Plugin for Init {
//!     fn execute(&self, request: PluginRequest) -> i32 {
//!         let force = request.options.get("force").and_then(|v| v.as_bool());
//!         println!("init {:?} force={:?}", request.args.first(), force);
//!         0
//!     }
//! }
//!
//! fn main() -> std::process::ExitCode {
//!     plugin::run(&Init)
//! }
//! ```

use crate::error::{RelayError, RelayResult};
use crate::exec::launcher::process_exit_code;
use crate::exec::{ExecutionRequest, REQUEST_ENV};
use console::style;
use std::process::ExitCode;

/// What a plugin receives: positional args plus the option bag
pub type PluginRequest = ExecutionRequest;

/// A command implementation
pub trait Plugin {
    /// Run the command and return its exit code
    fn execute(&self, request: PluginRequest) -> i32;
}

impl<F> Plugin for F
where
    F: Fn(PluginRequest) -> i32,
{
    fn execute(&self, request: PluginRequest) -> i32 {
        self(request)
    }
}

/// Execute `plugin` against a serialized request
pub fn dispatch(plugin: &dyn Plugin, payload: &str) -> RelayResult<i32> {
    let request = PluginRequest::from_json(payload)?;
    Ok(plugin.execute(request))
}

/// Entry point for plugin binaries: read the request relay passed in the
/// environment and run `plugin` with it.
pub fn run(plugin: &dyn Plugin) -> ExitCode {
    run_with(plugin, std::env::var(REQUEST_ENV).ok().as_deref())
}

/// [`run`] against an explicit payload; `None` means the variable is unset
fn run_with(plugin: &dyn Plugin, payload: Option<&str>) -> ExitCode {
    let result = match payload {
        Some(payload) => dispatch(plugin, payload),
        None => Err(RelayError::InvalidRequest(format!(
            "{} is not set; run this through relay",
            REQUEST_ENV
        ))),
    };

    match result {
        Ok(code) => process_exit_code(code),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
