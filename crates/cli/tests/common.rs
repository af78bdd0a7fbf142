// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// `reel` with a clean environment: no inherited owner, quiet logging.
pub fn reel() -> Command {
    let mut cmd = cargo_bin_cmd!("reel");
    cmd.env_remove("REEL_OWNER").env_remove("RUST_LOG");
    cmd
}

/// Helper to create an initialized temp directory without a remote
pub fn init_temp() -> TempDir {
    let temp = TempDir::new().unwrap();
    reel()
        .arg("init")
        .arg("--owner")
        .arg("alice")
        .current_dir(temp.path())
        .assert()
        .success();
    temp
}

/// Helper to create a workspace pointed at a remote nobody listens on,
/// giving up after a single connection attempt.
pub fn init_temp_unreachable() -> TempDir {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join(".reel")).unwrap();
    std::fs::write(
        temp.path().join(".reel/config.toml"),
        "owner = \"alice\"\n\n[remote]\nurl = \"ws://127.0.0.1:9\"\nmax_retries = 1\n",
    )
    .unwrap();
    temp
}
