//! The payload handed across the process boundary
//!
//! The child receives a JSON document in [`REQUEST_ENV`]:
//!
//! ```json
//! {"command":"init","entry":"/.../index.js","args":["my-app",{"force":true}]}
//! ```
//!
//! The trailing element of `args` is always the option bag.

use crate::error::{RelayError, RelayResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Environment variable carrying the serialized request
pub const REQUEST_ENV: &str = "RELAY_EXECUTION_REQUEST";

/// Option key that refers back to the parent command
const PARENT_KEY: &str = "parent";

/// A parsed command line, as produced by the CLI layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandInvocation {
    /// Subcommand name
    pub name: String,
    /// Positional arguments
    pub args: Vec<String>,
    /// Every option the command carries, including private ones
    pub options: Map<String, Value>,
}

impl CommandInvocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, value: impl Into<String>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

/// Options safe to send to the child: no `_`-prefixed keys, no `parent`
pub fn transferable_options(options: &Map<String, Value>) -> Map<String, Value> {
    options
        .iter()
        .filter(|(key, _)| !key.starts_with('_') && key.as_str() != PARENT_KEY)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// What the child process is asked to run
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRequest {
    pub command: String,
    pub entry_file: PathBuf,
    pub args: Vec<String>,
    pub options: Map<String, Value>,
}

#[derive(Serialize, Deserialize)]
struct WirePayload {
    command: String,
    entry: PathBuf,
    args: Vec<Value>,
}

impl ExecutionRequest {
    /// Build a request for `invocation`, filtering its options
    pub fn new(invocation: &CommandInvocation, entry_file: PathBuf) -> Self {
        Self {
            command: invocation.name.clone(),
            entry_file,
            args: invocation.args.clone(),
            options: transferable_options(&invocation.options),
        }
    }

    /// Serialize to the wire format
    pub fn to_json(&self) -> RelayResult<String> {
        let mut args: Vec<Value> = self.args.iter().cloned().map(Value::String).collect();
        args.push(Value::Object(self.options.clone()));

        Ok(serde_json::to_string(&WirePayload {
            command: self.command.clone(),
            entry: self.entry_file.clone(),
            args,
        })?)
    }

    /// Parse the wire format, splitting off the trailing option bag
    pub fn from_json(json: &str) -> RelayResult<Self> {
        let payload: WirePayload = serde_json::from_str(json)
            .map_err(|e| RelayError::InvalidRequest(format!("malformed payload: {}", e)))?;

        let mut args = payload.args;
        let options = match args.pop() {
            Some(Value::Object(options)) => options,
            Some(other) => {
                return Err(RelayError::InvalidRequest(format!(
                    "trailing argument must be an option object, got {}",
                    other
                )))
            }
            None => {
                return Err(RelayError::InvalidRequest(
                    "argument list must not be empty".to_string(),
                ))
            }
        };

        let args = args
            .into_iter()
            .map(|value| match value {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();

        Ok(Self {
            command: payload.command,
            entry_file: payload.entry,
            args,
            options,
        })
    }
}
