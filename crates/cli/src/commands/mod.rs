// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod edit;
pub mod init;
pub mod item;
pub mod list;
pub mod sync;

use std::sync::Arc;

use serde::Serialize;

use reel_core::{ExternalRef, ListMeta};

use crate::cache::SqliteCache;
use crate::collab::StaticOwner;
use crate::config::{find_work_dir, get_cache_path, Config};
use crate::error::{Error, Result};
use crate::remote::{ConnectConfig, WsRemoteStore};
use crate::service::ListService;

/// Whether a command needs to reach the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Served from the cache alone.
    Offline,
    Online,
}

/// Open the engine for the workspace containing the current directory,
/// seeded from its cache.
pub async fn open_service(access: Access) -> Result<ListService> {
    let work_dir = find_work_dir()?;
    let config = Config::load(&work_dir)?;
    let connect = match (&config.remote, access) {
        (Some(remote), _) => ConnectConfig::from(remote),
        // Never dialed: offline commands only read the index.
        (None, Access::Offline) => ConnectConfig::default(),
        (None, Access::Online) => return Err(Error::RemoteNotConfigured),
    };

    let cache = SqliteCache::open(&get_cache_path(&work_dir, &config))?;
    let remote = Arc::new(WsRemoteStore::new(connect));
    let service = ListService::new(
        remote.clone(),
        Box::new(cache),
        Arc::new(StaticOwner::new(config.resolved_owner())),
    )
    .with_watch_log(remote);
    service.load_from_cache().await?;
    Ok(service)
}

/// Resolve a list argument: an exact id first, then an exact name.
pub fn resolve_list(service: &ListService, key: &str) -> Result<ListMeta> {
    if let Some(list) = service.list(key) {
        return Ok(list);
    }
    let mut matches: Vec<ListMeta> = service
        .lists()
        .into_iter()
        .filter(|l| l.name == key)
        .collect();
    match matches.len() {
        0 => Err(reel_core::Error::ListNotFound(key.to_string()).into()),
        1 => Ok(matches.remove(0)),
        _ => Err(Error::AmbiguousList {
            name: key.to_string(),
            matches: matches.into_iter().map(|l| l.id).collect(),
        }),
    }
}

/// Map catalog refs to the ids of the list's items, keeping their order.
pub fn item_ids_for_refs(
    service: &ListService,
    list_id: &str,
    refs: &[ExternalRef],
) -> Result<Vec<String>> {
    let items = service.items(list_id);
    refs.iter()
        .map(|r| {
            items
                .iter()
                .find(|i| i.external_ref == *r)
                .map(|i| i.id.clone())
                .ok_or_else(|| Error::from(reel_core::Error::item_not_found(list_id, *r)))
        })
        .collect()
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;
