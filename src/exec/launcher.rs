//! Spawning the isolated plugin process
//!
//! The loader table maps a loader name to the program that runs an entry
//! file. The descriptor may name a loader explicitly; otherwise the entry's
//! extension decides, and anything unrecognised is executed directly.

use super::request::{ExecutionRequest, REQUEST_ENV};
use crate::error::{RelayError, RelayResult};
use crate::package::entry::EntryPoint;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Loader that executes the entry file itself
pub const NATIVE: &str = "native";

/// Resolved way of starting one entry file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loader {
    pub name: String,
    /// Interpreter; `None` runs the entry directly
    pub program: Option<String>,
}

/// Loader name to interpreter
#[derive(Debug, Clone)]
pub struct LoaderTable {
    programs: BTreeMap<String, Option<String>>,
}

impl Default for LoaderTable {
    fn default() -> Self {
        let python = if cfg!(windows) { "python" } else { "python3" };
        let programs = [
            ("node", Some("node")),
            ("python", Some(python)),
            ("shell", Some("sh")),
            (NATIVE, None),
        ]
        .into_iter()
        .map(|(name, program)| (name.to_string(), program.map(str::to_string)))
        .collect();

        Self { programs }
    }
}

impl LoaderTable {
    /// Built-in loaders with config overrides applied (overrides may add loaders)
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut table = Self::default();
        for (name, program) in overrides {
            table.programs.insert(name.clone(), Some(program.clone()));
        }
        table
    }

    /// Names of all registered loaders
    pub fn names(&self) -> Vec<&str> {
        self.programs.keys().map(String::as_str).collect()
    }

    /// Pick the loader for `entry`
    pub fn loader_for(&self, entry: &EntryPoint) -> RelayResult<Loader> {
        let name = match entry.runtime.as_deref() {
            Some(name) => name,
            None => loader_by_extension(entry),
        };

        let program = self
            .programs
            .get(name)
            .ok_or_else(|| RelayError::UnknownLoader {
                name: name.to_string(),
                entry: entry.path.clone(),
            })?;

        Ok(Loader {
            name: name.to_string(),
            program: program.clone(),
        })
    }
}

fn loader_by_extension(entry: &EntryPoint) -> &'static str {
    match entry.path.extension().and_then(|e| e.to_str()) {
        Some("js" | "cjs" | "mjs") => "node",
        Some("py") => "python",
        Some("sh") => "shell",
        _ => NATIVE,
    }
}

/// Program and argv for running `request` with `loader`.
///
/// On Windows everything is routed through `cmd /C`.
pub fn command_line(loader: &Loader, request: &ExecutionRequest) -> (String, Vec<OsString>) {
    let mut argv: Vec<OsString> = Vec::new();
    let program = match loader.program {
        Some(ref program) => {
            argv.push(request.entry_file.clone().into_os_string());
            program.clone()
        }
        None => request.entry_file.to_string_lossy().into_owned(),
    };
    argv.extend(request.args.iter().map(OsString::from));

    if cfg!(windows) {
        let mut wrapped: Vec<OsString> = vec!["/C".into(), program.into()];
        wrapped.extend(argv);
        ("cmd".to_string(), wrapped)
    } else {
        (program, argv)
    }
}

/// Spawn the plugin process with inherited stdio and wait for it.
///
/// Returns the child's exit code. Failing to start the child at all is a
/// [`RelayError::SpawnFailure`].
pub async fn launch(loader: &Loader, request: &ExecutionRequest) -> RelayResult<i32> {
    let (program, args) = command_line(loader, request);
    let payload = request.to_json()?;
    let cwd = std::env::current_dir().map_err(|e| RelayError::io("getting current directory", e))?;

    debug!("Spawning {} {:?} (loader: {})", program, args, loader.name);

    let mut child = Command::new(&program)
        .args(&args)
        .env(REQUEST_ENV, payload)
        .current_dir(cwd)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| RelayError::SpawnFailure {
            program: program.clone(),
            source: e,
        })?;

    // The terminal delivers Ctrl-C to the child too; keep waiting for its exit code.
    let mut listen = true;
    let status = loop {
        tokio::select! {
            status = child.wait() => {
                break status.map_err(|e| RelayError::io(format!("waiting for {}", program), e))?;
            }
            signal = tokio::signal::ctrl_c(), if listen => match signal {
                Ok(()) => debug!("Interrupt received, waiting for {}", program),
                Err(_) => listen = false,
            },
        }
    };

    let code = exit_code(status);
    debug!("{} exited with {}", program, code);
    Ok(code)
}

/// Exit code of a finished child. A Unix signal N becomes `128 + N`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}

/// Exit code for this process.
///
/// `ExitCode` only carries `0..=255`; wider codes (Windows) leave through
/// `process::exit` so the child's code survives unchanged.
pub fn process_exit_code(code: i32) -> std::process::ExitCode {
    match exit_code_byte(code) {
        Some(byte) => std::process::ExitCode::from(byte),
        None => std::process::exit(code),
    }
}

fn exit_code_byte(code: i32) -> Option<u8> {
    u8::try_from(code).ok()
}
