//! Test environment builder for isolated AutoDeploy CLI runs.
//!
//! Every run gets its own project directory, home directory and work root,
//! and the natural-language backend is forced off so results are
//! deterministic and offline.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

use super::fixtures::write_files;

/// Result of running an AutoDeploy CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// stdout parsed as NDJSON
    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("bad JSON line {l:?}: {e}")))
            .collect()
    }
}

/// Isolated test environment with temp directories.
pub struct TestEnv {
    /// Working directory of the CLI process
    pub project_root: TempDir,
    /// Stand-in for HOME (user config, SSH keys)
    pub home_dir: TempDir,
    /// Scratch area for deployment runs
    pub work_root: TempDir,
    bin: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            project_root: TempDir::new().expect("create project dir"),
            home_dir: TempDir::new().expect("create home dir"),
            work_root: TempDir::new().expect("create work root"),
            bin: PathBuf::from(env!("CARGO_BIN_EXE_autodeploy")),
        }
    }

    /// Environment with a repository written under `<project>/repo`
    pub fn with_repo(files: &[(&str, &str)]) -> Self {
        let env = Self::new();
        write_files(&env.repo_path(), files);
        env
    }

    pub fn repo_path(&self) -> PathBuf {
        self.project_root.path().join("repo")
    }

    /// Get path relative to project root
    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    /// Run the CLI from the project root with extra env vars.
    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(self.project_root.path())
            .args(args)
            .env("AUTODEPLOY_TEST_HOME", self.home_dir.path())
            .env("XDG_CONFIG_HOME", self.home_dir.path().join(".config"))
            .env("AUTODEPLOY_WORK_DIR", self.work_root.path())
            .env("AUTODEPLOY_BACKEND", "none")
            .env_remove("OPENAI_API_KEY")
            .env_remove("ANTHROPIC_API_KEY")
            .env_remove("RUST_LOG");

        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        to_result(cmd.output().expect("Failed to execute autodeploy"))
    }

    pub fn write_project_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.project_path(relative);
        write_files(self.project_root.path(), &[(relative, content)]);
        path
    }

    pub fn read(&self, path: &Path) -> String {
        std::fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()))
    }
}

fn to_result(output: Output) -> TestResult {
    TestResult {
        success: output.status.success(),
        exit_code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}
