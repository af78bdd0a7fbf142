// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! reel - curated media lists with an offline cache.
//!
//! This crate provides the list engine behind the `reel` CLI. Lists live
//! in a remote store reached over WebSocket; a SQLite cache and an
//! in-process index keep reads local and instant.
//!
//! # Main Components
//!
//! - [`ListService`] - the engine: reads from the index, mutations through the remote
//! - [`RemoteStore`] - the authoritative store ([`WsRemoteStore`], [`MemoryRemoteStore`])
//! - [`LocalCache`] - the durable mirror ([`SqliteCache`], [`MemoryCache`])
//! - [`Config`] - workspace configuration in `.reel/config.toml`
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use reel::{ListService, MemoryCache, MemoryRemoteStore, StaticOwner};
//! use reel_core::{ItemDraft, NewList};
//!
//! let service = ListService::new(
//!     Arc::new(MemoryRemoteStore::new()),
//!     Box::new(MemoryCache::new()),
//!     Arc::new(StaticOwner::signed_in("alice")),
//! );
//! service.load_from_cache().await?;
//! let list = service.create_list(NewList::named("Favorites")).await?;
//! service.add_item(&list.id, ItemDraft::new(550, "Fight Club")).await?;
//! ```

mod cli;
mod commands;
mod display;

pub mod cache;
pub mod collab;
pub mod config;
pub mod env;
pub mod error;
pub mod index;
pub mod remote;
pub mod service;
pub mod step;

pub use cache::{LocalCache, MemoryCache, SqliteCache};
pub use cli::{Cli, Command, ListFields, OutputFormat};
pub use collab::{MediaMetadata, MetadataLookup, OwnerIdentity, StaticOwner, WatchLog};
pub use config::{find_work_dir, get_cache_path, init_work_dir, Config, RemoteConfig};
pub use error::{Error, Result};
pub use index::{IndexEvent, ListIndex};
pub use remote::{ConnectConfig, MemoryRemoteStore, RemoteStore, WsRemoteStore};
pub use service::{ListService, SyncReport};

use commands::edit::Clears;
use commands::item::ItemExtras;
use commands::Access;

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub async fn run(cli: Cli) -> Result<()> {
    if let Some(dir) = &cli.directory {
        std::env::set_current_dir(dir)?;
    }

    match cli.command {
        Command::Init {
            path,
            owner,
            remote,
            cache,
        } => commands::init::run(path, owner, remote, cache),
        Command::Lists { output } => {
            let service = commands::open_service(Access::Offline).await?;
            commands::list::lists(&service, output)
        }
        Command::Items {
            list,
            watched,
            output,
        } => {
            let access = if watched {
                Access::Online
            } else {
                Access::Offline
            };
            let service = commands::open_service(access).await?;
            commands::list::items(&service, &list, watched, output).await
        }
        Command::Create {
            name,
            fields,
            ranked,
            output,
        } => {
            let list = commands::edit::build_new_list(name, fields, ranked)?;
            let service = commands::open_service(Access::Online).await?;
            commands::edit::create(&service, list, output).await
        }
        Command::Edit {
            list,
            name,
            fields,
            ranked,
            clear_description,
            clear_tags,
            clear_month,
            output,
        } => {
            let clears = Clears {
                description: clear_description,
                tags: clear_tags,
                month: clear_month,
            };
            let patch = commands::edit::build_patch(name, fields, ranked, clears)?;
            let service = commands::open_service(Access::Online).await?;
            commands::edit::edit(&service, &list, patch, output).await
        }
        Command::Delete { list } => {
            let service = commands::open_service(Access::Online).await?;
            commands::edit::delete(&service, &list).await
        }
        Command::Pin { list } => {
            let service = commands::open_service(Access::Online).await?;
            commands::edit::pin(&service, &list, true).await
        }
        Command::Unpin { list } => {
            let service = commands::open_service(Access::Online).await?;
            commands::edit::pin(&service, &list, false).await
        }
        Command::Add {
            list,
            external_ref,
            title,
            year,
            release_date,
            poster,
            output,
        } => {
            let extras = ItemExtras {
                year,
                release_date,
                poster,
            };
            let draft = commands::item::build_draft(external_ref, title, extras)?;
            let service = commands::open_service(Access::Online).await?;
            commands::item::add(&service, &list, draft, output).await
        }
        Command::Remove { list, external_ref } => {
            let service = commands::open_service(Access::Online).await?;
            commands::item::remove(&service, &list, external_ref).await
        }
        Command::Reorder {
            list,
            external_refs,
        } => {
            let service = commands::open_service(Access::Online).await?;
            commands::item::reorder(&service, &list, &external_refs).await
        }
        Command::Sync { list, output } => {
            let service = commands::open_service(Access::Online).await?;
            commands::sync::run(&service, list.as_deref(), output).await
        }
    }
}
