//! Integration tests for embedbin

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated cache root and config path for one test
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn cache_root(&self) -> PathBuf {
        self.dir.path().join("cache")
    }

    fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    fn write(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }
}

mod cli_tests {
    use super::*;
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use embedbin::Materializer;
    use predicates::prelude::*;

    fn embedbin(sandbox: &Sandbox) -> Command {
        let mut cmd = cargo_bin_cmd!("embedbin");
        cmd.arg("--cache-root")
            .arg(sandbox.cache_root())
            .arg("--config")
            .arg(sandbox.config_path());
        cmd
    }

    fn stdout_path(output: &std::process::Output) -> PathBuf {
        PathBuf::from(String::from_utf8_lossy(&output.stdout).trim())
    }

    #[test]
    fn help_displays() {
        cargo_bin_cmd!("embedbin")
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("content-addressed cache"));
    }

    #[test]
    fn version_displays() {
        cargo_bin_cmd!("embedbin")
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("embedbin"));
    }

    #[test]
    fn materialize_prints_canonical_path() {
        let sandbox = Sandbox::new();
        let file = sandbox.write("hello", b"payload bytes");

        let output = embedbin(&sandbox)
            .arg("materialize")
            .arg(&file)
            .output()
            .unwrap();

        assert!(output.status.success());
        let expected =
            Materializer::new(sandbox.cache_root()).canonical_path("hello", b"payload bytes");
        assert_eq!(stdout_path(&output), expected);
        assert_eq!(std::fs::read(&expected).unwrap(), b"payload bytes");
    }

    #[test]
    fn materialize_twice_is_stable() {
        let sandbox = Sandbox::new();
        let file = sandbox.write("tool.bin", b"abc");

        let first = embedbin(&sandbox).arg("materialize").arg(&file).output().unwrap();
        let second = embedbin(&sandbox)
            .args(["-v", "materialize"])
            .arg(&file)
            .output()
            .unwrap();

        assert_eq!(stdout_path(&first), stdout_path(&second));
        assert!(String::from_utf8_lossy(&second.stderr).contains("unchanged"));
    }

    #[test]
    fn path_does_not_write() {
        let sandbox = Sandbox::new();
        let file = sandbox.write("hello", b"payload");

        let output = embedbin(&sandbox)
            .args(["path", "--name", "custom"])
            .arg(&file)
            .output()
            .unwrap();

        assert!(output.status.success());
        let path = stdout_path(&output);
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("custom-"));
        assert!(!path.exists());
    }

    #[test]
    fn invalid_name_fails() {
        let sandbox = Sandbox::new();
        let file = sandbox.write("hello", b"payload");

        embedbin(&sandbox)
            .args(["materialize", "--name", "../escape"])
            .arg(&file)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid binary name"));
    }

    #[test]
    fn missing_file_fails() {
        let sandbox = Sandbox::new();

        embedbin(&sandbox)
            .args(["materialize", "does-not-exist"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("reading binary"));
    }

    #[test]
    fn cache_list_empty() {
        let sandbox = Sandbox::new();

        embedbin(&sandbox)
            .args(["cache", "list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn cache_list_reports_materialized() {
        let sandbox = Sandbox::new();
        let file = sandbox.write("hello", b"payload");
        embedbin(&sandbox).arg("materialize").arg(&file).assert().success();

        embedbin(&sandbox)
            .args(["cache", "list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"name\": \"hello\""))
            .stdout(predicate::str::contains("\"kind\": \"canonical\""));
    }

    #[test]
    fn cache_dir_is_under_root() {
        let sandbox = Sandbox::new();
        let expected = sandbox.cache_root().join("embedbin");

        embedbin(&sandbox)
            .args(["cache", "dir"])
            .assert()
            .success()
            .stdout(predicate::str::contains(expected.display().to_string()));
    }

    #[test]
    fn config_path() {
        let sandbox = Sandbox::new();

        embedbin(&sandbox)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let sandbox = Sandbox::new();

        embedbin(&sandbox)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"));
    }

    #[test]
    fn config_init_writes_file() {
        let sandbox = Sandbox::new();

        embedbin(&sandbox).args(["config", "init"]).assert().success();

        assert!(sandbox.config_path().exists());
    }

    #[cfg(unix)]
    mod run {
        use super::*;
        use serial_test::serial;

        #[test]
        #[serial]
        fn run_hello_script() {
            let sandbox = Sandbox::new();
            let file = sandbox.write("hello", b"#!/bin/sh\necho 'Hello World!'\n");

            embedbin(&sandbox)
                .arg("run")
                .arg(&file)
                .assert()
                .success()
                .stdout(predicate::str::diff("Hello World!\n"));
        }

        #[test]
        #[serial]
        fn run_passes_args_and_exit_code() {
            let sandbox = Sandbox::new();
            let file = sandbox.write("echoer", b"#!/bin/sh\necho \"$@\"\nexit 7\n");

            embedbin(&sandbox)
                .arg("run")
                .arg(&file)
                .args(["--", "one", "two"])
                .assert()
                .code(7)
                .stdout(predicate::str::contains("one two"));
        }
    }
}

#[cfg(unix)]
mod end_to_end {
    use super::*;
    use embedbin::{Launcher, Materializer};
    use serial_test::serial;
    use tokio_util::sync::CancellationToken;

    /// Compile the C hello world, or `None` when no compiler is installed
    fn compile_hello(out_dir: &Path) -> Option<Vec<u8>> {
        let source = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/testdata/helloworld.c");
        let binary = out_dir.join("helloworld");

        let status = std::process::Command::new("cc")
            .arg(&source)
            .arg("-o")
            .arg(&binary)
            .status()
            .ok()?;
        if !status.success() {
            return None;
        }
        std::fs::read(&binary).ok()
    }

    #[tokio::test]
    #[serial]
    async fn compiled_hello_world() {
        let sandbox = Sandbox::new();
        let Some(bytes) = compile_hello(sandbox.dir.path()) else {
            eprintln!("skipping: no C compiler available");
            return;
        };

        let materializer = Materializer::new(sandbox.cache_root());
        let launcher = Launcher::with_materializer("hello", bytes, materializer);
        let output = launcher
            .command(CancellationToken::new(), Vec::<String>::new())
            .unwrap()
            .output()
            .await
            .unwrap();

        assert_eq!(output.status.code(), Some(0));
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "Hello World!");
    }

    #[tokio::test]
    #[serial]
    async fn second_launcher_reuses_cached_file() {
        let sandbox = Sandbox::new();
        let script: &'static [u8] = b"#!/bin/sh\necho 'Hello World!'\n";

        let materializer = Materializer::new(sandbox.cache_root());
        let first = Launcher::with_materializer("hello", script, materializer.clone());
        let path = first.resolve().unwrap().to_path_buf();
        let mtime = std::fs::metadata(&path).unwrap().modified().unwrap();

        let second = Launcher::with_materializer("hello", script, materializer);
        assert_eq!(second.resolve().unwrap(), path);
        assert_eq!(std::fs::metadata(&path).unwrap().modified().unwrap(), mtime);

        let output = second
            .command(CancellationToken::new(), Vec::<String>::new())
            .unwrap()
            .output()
            .await
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "Hello World!");
    }
}
