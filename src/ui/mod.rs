//! Terminal output helpers
//!
//! Spinners and status lines with automatic fallback to plain output in
//! CI or when stderr is not a terminal.

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{step_ok, step_warn_hint};
pub use progress::TaskSpinner;
