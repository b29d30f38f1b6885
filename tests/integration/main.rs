//! Integration tests for nestbuild

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Command isolated from any user or project config
    fn nestbuild(temp: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("nestbuild");
        cmd.current_dir(temp.path())
            .env("NESTBUILD_CONFIG", temp.path().join("config.toml"))
            .env("NESTBUILD_CACHE_DIR", cache_dir(temp))
            .arg("--no-local");
        cmd
    }

    fn cache_dir(temp: &TempDir) -> PathBuf {
        temp.path().join("cache")
    }

    fn marker(temp: &TempDir) -> PathBuf {
        cache_dir(temp).join("built.bin")
    }

    fn run_script(temp: &TempDir, script: &str) -> assert_cmd::assert::Assert {
        nestbuild(temp)
            .args(["run", "--format", "lines", "--", "sh", "-c", script, "sh"])
            .assert()
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        nestbuild(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Cache-gated nested build runner"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        nestbuild(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("nestbuild"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        nestbuild(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        nestbuild(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"));
    }

    #[test]
    fn run_without_command_fails_with_hint() {
        let temp = TempDir::new().unwrap();
        nestbuild(&temp)
            .arg("run")
            .assert()
            .failure()
            .stderr(predicate::str::contains("No build command configured"))
            .stderr(predicate::str::contains("Hint:"));
        assert!(!marker(&temp).exists());
    }

    #[cfg(unix)]
    #[test]
    fn first_run_builds_clean_and_records_marker() {
        let temp = TempDir::new().unwrap();

        run_script(
            &temp,
            r#"echo "artifact: /out/a.jar"; echo "artifact: /out/b.jar""#,
        )
        .success()
        .stdout("/out/a.jar\n/out/b.jar\n");

        assert!(marker(&temp).is_file());
    }

    #[cfg(unix)]
    #[test]
    fn invalid_utf8_build_output_keeps_later_artifacts() {
        let temp = TempDir::new().unwrap();

        run_script(
            &temp,
            r#"echo "artifact: /out/a.jar"; printf 'note: \377\n'; echo "artifact: /out/b.jar""#,
        )
        .success()
        .stdout("/out/a.jar\n/out/b.jar\n");

        assert!(marker(&temp).is_file());
    }

    #[cfg(unix)]
    #[test]
    fn rebuild_hint_selects_tasks() {
        let temp = TempDir::new().unwrap();
        let script = r#"echo "artifact: /out/$1.jar""#;

        run_script(&temp, script)
            .success()
            .stdout("/out/clean.jar\n");
        run_script(&temp, script)
            .success()
            .stdout("/out/build.jar\n");
    }

    #[cfg(unix)]
    #[test]
    fn failed_build_leaves_no_marker() {
        let temp = TempDir::new().unwrap();

        run_script(&temp, "echo 'error: cannot find symbol' >&2; exit 1")
            .failure()
            .stderr(predicate::str::contains("Nested build failed"))
            .stderr(predicate::str::contains("cannot find symbol"));

        assert!(!marker(&temp).exists());
    }

    #[cfg(unix)]
    #[test]
    fn json_classpath_output() {
        let temp = TempDir::new().unwrap();

        nestbuild(&temp)
            .args([
                "run",
                "--format",
                "json",
                "--",
                "sh",
                "-c",
                r#"echo "artifact: /out/a.jar"; echo "artifact: /out/a.jar""#,
                "sh",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""/out/a.jar""#).count(1));
    }

    #[test]
    fn status_reports_marker_state() {
        let temp = TempDir::new().unwrap();

        nestbuild(&temp)
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("next run rebuilds from clean"));

        std::fs::create_dir_all(cache_dir(&temp)).unwrap();
        std::fs::write(marker(&temp), b"").unwrap();

        nestbuild(&temp)
            .args(["status", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""built": true"#));
    }

    #[test]
    fn invalidate_removes_marker() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(cache_dir(&temp)).unwrap();
        std::fs::write(marker(&temp), b"").unwrap();

        nestbuild(&temp)
            .arg("invalidate")
            .assert()
            .success()
            .stdout(predicate::str::contains("Cache invalidated"));

        assert!(!marker(&temp).exists());
    }

    #[test]
    fn invalidate_missing_cache_is_noop() {
        let temp = TempDir::new().unwrap();

        nestbuild(&temp)
            .arg("invalidate")
            .assert()
            .success()
            .stdout(predicate::str::contains("Nothing to invalidate"));

        assert!(!cache_dir(&temp).exists());
    }

    #[test]
    fn invalid_config_is_reported() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("config.toml"), "[cache]\nmarker_failure = \"never\"").unwrap();

        nestbuild(&temp)
            .arg("status")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }
}
