//! Turning parsed command lines into plugin invocations

use super::args::InitArgs;
use crate::error::{RelayError, RelayResult};
use crate::exec::CommandInvocation;
use serde_json::Value;

impl InitArgs {
    /// Invocation for the `init` plugin
    pub fn into_invocation(self) -> CommandInvocation {
        let mut invocation = CommandInvocation::new("init").option("force", self.force);
        if let Some(name) = self.project_name {
            invocation = invocation.arg(name);
        }
        invocation
    }
}

/// Parse an external subcommand's raw argv (`[name, args...]`).
///
/// `--key=value` sets a string, `--flag` sets `true`, `--no-flag` sets
/// `false`, `-abc` sets `a`, `b` and `c`. Option names are camelCased.
/// Everything after `--` is positional.
pub fn parse_external(argv: Vec<String>) -> RelayResult<CommandInvocation> {
    let mut tokens = argv.into_iter();
    let name = tokens
        .next()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| RelayError::Internal("missing command name".to_string()))?;

    let mut invocation = CommandInvocation::new(name);
    let mut positional_only = false;

    for token in tokens {
        if positional_only {
            invocation.args.push(token);
            continue;
        }

        if token == "--" {
            positional_only = true;
        } else if let Some(long) = token.strip_prefix("--") {
            let (key, value) = match long.split_once('=') {
                Some((key, value)) => (key, Value::String(value.to_string())),
                None => match long.strip_prefix("no-") {
                    Some(negated) => (negated, Value::Bool(false)),
                    None => (long, Value::Bool(true)),
                },
            };
            invocation.options.insert(camel_case(key), value);
        } else if token.len() > 1 && token.starts_with('-') {
            for flag in token[1..].chars() {
                invocation.options.insert(flag.to_string(), Value::Bool(true));
            }
        } else {
            invocation.args.push(token);
        }
    }

    Ok(invocation)
}

/// `dry-run` -> `dryRun`
fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '-' && !out.is_empty() {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
