//! Shared helpers for the integration suite.

#![allow(dead_code)]

use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use ontograph::store::MemoryStore;

/// Temporary directory holding a store snapshot and an optional config file.
///
/// `ONTOGRAPH_CONFIG` is always pointed inside the directory so a developer's
/// own configuration never leaks into a test.
pub struct TestWorkspace {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    root: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().to_path_buf();
        Ok(Self {
            _temp_dir: temp_dir,
            root,
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn store_path(&self) -> PathBuf {
        self.root.join("graph.json")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// Snapshot `store` to [`Self::store_path`].
    pub async fn write_store(&self, store: &MemoryStore) -> Result<PathBuf> {
        let path = self.store_path();
        store.save_to(&path).await?;
        Ok(path)
    }

    /// Write a file relative to the workspace root.
    pub async fn write_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        let path = self.root.join(name);
        tokio::fs::write(&path, content).await?;
        Ok(path)
    }

    /// The `ontograph` binary, isolated from the user's configuration.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::new(env!("CARGO_BIN_EXE_ontograph"));
        cmd.current_dir(&self.root)
            .env("ONTOGRAPH_CONFIG", self.config_path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        cmd
    }

    /// The binary with `--store` pointing at the workspace snapshot.
    pub fn command_with_store(&self) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg("--store").arg(self.store_path());
        cmd
    }

    /// Run with the workspace store and capture the output.
    pub fn run(&self, args: &[&str]) -> CommandOutput {
        let output = self
            .command_with_store()
            .args(args)
            .output()
            .expect("failed to run ontograph");
        CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Captured output of one CLI run.
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    pub fn assert_success(&self) -> &Self {
        assert!(
            self.success,
            "Command failed with code {:?}\nStderr: {}",
            self.code, self.stderr
        );
        self
    }

    pub fn assert_failure(&self) -> &Self {
        assert!(!self.success, "Command unexpectedly succeeded\nStdout: {}", self.stdout);
        self
    }

    /// Parse stdout as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {}", self.stdout))
    }
}
