//! Common utilities for CLI E2E tests.
//!
//! Each [`Sandbox`] points the binary at its own temporary data directory,
//! so tests never touch the real one and can run in parallel.

#![allow(dead_code)]

use std::process::Command;

use cozy_pomodoro_core::storage::kv::{read_json, write_json};
use cozy_pomodoro_core::Database;
use tempfile::TempDir;

pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp data dir"),
        }
    }

    /// Invoke a CLI command and return (stdout, stderr, exit code).
    pub fn run(&self, args: &[&str]) -> (String, String, i32) {
        let output = Command::new(env!("CARGO_BIN_EXE_cozy-pomodoro"))
            .args(args)
            .env("COZY_POMODORO_DATA_DIR", self.dir.path())
            .env("COZY_POMODORO_LOG", "warn")
            .output()
            .expect("Failed to execute CLI command");

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let code = output.status.code().unwrap_or(-1);

        (stdout, stderr, code)
    }

    /// Invoke a CLI command and expect success.
    pub fn ok(&self, args: &[&str]) -> String {
        let (stdout, stderr, code) = self.run(args);
        assert_eq!(code, 0, "CLI command {args:?} failed with code {code}: {stderr}");
        stdout
    }

    /// Invoke a CLI command and expect failure; returns stderr.
    pub fn fail(&self, args: &[&str]) -> String {
        let (_, stderr, code) = self.run(args);
        assert_ne!(code, 0, "CLI command unexpectedly succeeded: {args:?}");
        stderr
    }

    /// Move the saved countdown's deadline into the past, as if the
    /// session ended while no command was running.
    pub fn expire_countdown(&self) {
        let db = Database::open_at(&self.dir.path().join("cozy-pomodoro.db"))
            .expect("Failed to open sandbox database");
        let mut checkpoint: serde_json::Value = read_json(&db, "timer_core")
            .expect("Failed to read timer checkpoint")
            .expect("No timer checkpoint saved");
        checkpoint["deadline_ms"] = serde_json::json!(1000);
        write_json(&db, "timer_core", &checkpoint).expect("Failed to write timer checkpoint");
    }

    /// Invoke a CLI command and parse its stdout as JSON.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let stdout = self.ok(args);
        serde_json::from_str(&stdout).expect("Failed to parse JSON output")
    }
}
