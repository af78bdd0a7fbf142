// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use crate::cache::SqliteCache;
use crate::config::{get_cache_path, init_work_dir, Config, RemoteConfig};
use crate::error::Result;

pub fn run(
    path: Option<String>,
    owner: Option<String>,
    remote: Option<String>,
    cache: Option<String>,
) -> Result<()> {
    let target_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir()?,
    };

    let config = Config {
        owner,
        cache,
        remote: remote.map(RemoteConfig::new),
    };
    let work_dir = init_work_dir(&target_path, &config)?;

    // Create the cache up front so offline reads work right away
    let cache_path = get_cache_path(&work_dir, &config);
    SqliteCache::open(&cache_path)?;

    println!("Initialized reel workspace at {}", work_dir.display());
    match &config.remote {
        Some(remote) => println!("Remote: {}", remote.url),
        None => println!("Remote: not configured (offline reads only)"),
    }
    if let Some(owner) = config.resolved_owner() {
        println!("Owner: {owner}");
    }
    Ok(())
}

#[cfg(test)]
#[path = "init_tests.rs"]
mod tests;
