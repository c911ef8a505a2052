//! UI context for detecting interactive vs CI environments

use std::io::IsTerminal;

/// Environment variables that mark a CI run
const CI_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "CIRCLECI",
    "BUILDKITE",
    "JENKINS_URL",
    "TF_BUILD",
];

/// Decides whether relay may draw spinners.
///
/// relay's own output goes to stderr so that stdout belongs to the plugin.
#[derive(Debug, Clone, Copy)]
pub struct UiContext {
    interactive: bool,
}

impl UiContext {
    /// Detect the current environment
    pub fn detect() -> Self {
        let interactive = std::io::stderr().is_terminal()
            && !CI_VARS.iter().any(|var| std::env::var_os(var).is_some());
        Self { interactive }
    }

    /// Plain output only (tests, CI, piped stderr)
    pub fn non_interactive() -> Self {
        Self { interactive: false }
    }

    /// Whether spinners and colors should be used
    pub fn use_fancy_output(&self) -> bool {
        self.interactive
    }
}
