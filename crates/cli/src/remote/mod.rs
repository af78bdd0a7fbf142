// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Access to the authoritative list store.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ ListService │────►│ RemoteStore  │────►│  Transport  │────►│ reel-remote │
//! │             │◄────│  (WsRemote)  │◄────│   (trait)   │◄────│   server    │
//! └─────────────┘     └──────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! [`MemoryRemoteStore`] stands in for the whole right-hand side in tests
//! and offline demos.

mod memory;
mod transport;
mod ws;

pub use memory::MemoryRemoteStore;
pub use transport::{Transport, TransportError, TransportResult, WebSocketTransport};
pub use ws::{ConnectConfig, WsRemoteStore};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use reel_core::{ItemDraft, ListItem, ListMeta, ListPatch, NewList, Result, WatchedItem};

/// Typed CRUD over the remote list store.
///
/// Every method is a network round trip. Errors come back already mapped
/// to the [`reel_core::Error`] taxonomy; anything undecodable is
/// [`reel_core::Error::RemoteUnavailable`].
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Creates a list. The store assigns id and timestamps, `item_count` is 0.
    async fn create_list(&self, owner_id: &str, list: NewList) -> Result<ListMeta>;

    /// Applies a partial update and returns the stored list.
    async fn update_list(&self, id: &str, patch: ListPatch) -> Result<ListMeta>;

    /// Deletes a list together with its items.
    async fn delete_list(&self, id: &str) -> Result<()>;

    /// Inserts an item.
    ///
    /// `sort_order` is the position the caller expects; the store never
    /// places the item at or below its own current maximum. Duplicate
    /// external refs fail with `ItemAlreadyExists`.
    async fn add_item(&self, list_id: &str, draft: ItemDraft, sort_order: u32)
        -> Result<ListItem>;

    async fn remove_item(&self, item_id: &str) -> Result<()>;

    async fn update_item_sort_order(&self, item_id: &str, sort_order: u32) -> Result<()>;

    /// Sets a list's `updated_at`.
    async fn touch_list(&self, list_id: &str, at: DateTime<Utc>) -> Result<()>;

    async fn fetch_list(&self, id: &str) -> Result<ListMeta>;

    /// All of an owner's lists. `item_count` may be stale.
    async fn fetch_lists(&self, owner_id: &str) -> Result<Vec<ListMeta>>;

    /// A list's items in ascending sort order.
    async fn fetch_items(&self, list_id: &str) -> Result<Vec<ListItem>>;

    async fn count_items(&self, list_id: &str) -> Result<usize>;

    /// All of an owner's lists with exact counts in one round trip.
    ///
    /// Optional endpoint: callers must be ready to fall back to
    /// [`fetch_lists`](Self::fetch_lists) plus [`count_items`](Self::count_items).
    async fn fetch_lists_summary(&self, owner_id: &str) -> Result<Vec<ListMeta>>;

    /// A list's items joined with the owner's watch status in one round trip.
    ///
    /// Optional endpoint, like [`fetch_lists_summary`](Self::fetch_lists_summary).
    async fn fetch_items_with_watched(
        &self,
        list_id: &str,
        owner_id: &str,
    ) -> Result<Vec<WatchedItem>>;
}
