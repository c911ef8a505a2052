//! Integration tests for relay

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    /// relay with an isolated home and a config that never touches the network
    fn relay(temp: &TempDir) -> Command {
        let config = temp.path().join("config.toml");
        if !config.exists() {
            std::fs::write(
                &config,
                "[general]\nupdate_check = false\n\n[registry]\nurl = \"http://127.0.0.1:9\"\n\n[commands]\ninit = \"@relay-cli/init\"\nhello = \"hello-plugin\"\n",
            )
            .unwrap();
        }

        let mut cmd = cargo_bin_cmd!("relay");
        cmd.env_remove("RELAY_TARGET_PATH")
            .env("RELAY_CONFIG", &config)
            .env("RELAY_HOME", temp.path().join("home"));
        cmd
    }

    fn write_local_plugin(dir: &Path, script: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join("package.json"), r#"{"name":"hello-plugin","main":"run.sh"}"#)
            .unwrap();
        std::fs::write(dir.join("run.sh"), script).unwrap();
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        relay(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("registry packages"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        relay(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("relay"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        relay(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        relay(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[commands]").and(predicate::str::contains("hello-plugin")));
    }

    #[test]
    fn invalid_config_reports_path() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.toml"), "[general\n").unwrap();
        relay(&temp)
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn unknown_command_fails() {
        let temp = TempDir::new().unwrap();
        relay(&temp)
            .arg("publish")
            .assert()
            .failure()
            .stderr(
                predicate::str::contains("Unknown command: publish")
                    .and(predicate::str::contains("hello, init")),
            );
    }

    #[test]
    fn cache_list_empty() {
        let temp = TempDir::new().unwrap();
        relay(&temp)
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No cached packages found."));
    }

    #[test]
    fn cache_path_under_home() {
        let temp = TempDir::new().unwrap();
        relay(&temp)
            .args(["cache", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("node_modules"));
    }

    #[test]
    fn completions_generate() {
        let temp = TempDir::new().unwrap();
        relay(&temp)
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("relay"));
    }

    #[test]
    fn unreachable_registry_fails_with_hint() {
        let temp = TempDir::new().unwrap();
        relay(&temp)
            .arg("hello")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Hint:"));
    }

    #[cfg(unix)]
    #[test]
    fn local_plugin_exit_code_propagates() {
        let temp = TempDir::new().unwrap();
        let plugin = temp.path().join("hello");
        write_local_plugin(&plugin, "echo \"$RELAY_EXECUTION_REQUEST\"\nexit 3\n");

        relay(&temp)
            .arg("--target-path")
            .arg(&plugin)
            .args(["hello", "world", "--loud", "--name=relay"])
            .assert()
            .code(3)
            .stdout(
                predicate::str::contains(r#""command":"hello""#)
                    .and(predicate::str::contains(r#""loud":true"#))
                    .and(predicate::str::contains(r#""name":"relay""#))
                    .and(predicate::str::contains(r#""world""#)),
            );
    }

    #[cfg(unix)]
    #[test]
    fn init_passes_project_name_and_force() {
        let temp = TempDir::new().unwrap();
        let plugin = temp.path().join("init");
        write_local_plugin(&plugin, "echo \"$RELAY_EXECUTION_REQUEST\"\n");

        relay(&temp)
            .env("RELAY_TARGET_PATH", &plugin)
            .args(["init", "my-app", "--force"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains(r#""my-app""#)
                    .and(predicate::str::contains(r#""force":true"#)),
            );
    }
}
