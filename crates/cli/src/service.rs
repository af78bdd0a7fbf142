// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The list engine: every read and mutation of lists goes through here.
//!
//! A mutation runs under the writer lock in this order:
//!
//! 1. remote call (critical: its error is returned and nothing local changes)
//! 2. advisory bookkeeping against the remote (item count, `updated_at` touch)
//! 3. cache writes (advisory: the remote already committed)
//! 4. one write-lock section on the index
//! 5. change events
//!
//! Reads are served from the index and never suspend.

use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use reel_core::{
    Error, ExternalRef, ItemDraft, ListItem, ListMeta, ListPatch, NewList, Result, Stamper,
    WatchedItem,
};

use crate::cache::LocalCache;
use crate::collab::{MetadataLookup, OwnerIdentity, WatchLog};
use crate::index::{IndexEvent, ListIndex};
use crate::remote::RemoteStore;
use crate::step::{advisory, critical};

const EVENT_CAPACITY: usize = 64;

/// Outcome of [`ListService::refresh_all`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub lists: usize,
    pub items: usize,
    /// Whether counts came from the summary endpoint rather than per-list counting.
    pub used_summary: bool,
}

/// A list after an `updated_at` bump, as the index and the cache should see it.
///
/// They differ only when the remote touch failed: the index moves forward
/// anyway, the cache keeps mirroring the remote.
struct Touched {
    index: ListMeta,
    cache: ListMeta,
}

pub struct ListService {
    remote: Arc<dyn RemoteStore>,
    owner: Arc<dyn OwnerIdentity>,
    lookup: Option<Arc<dyn MetadataLookup>>,
    watch_log: Option<Arc<dyn WatchLog>>,
    index: RwLock<ListIndex>,
    cache: Mutex<Box<dyn LocalCache>>,
    events: broadcast::Sender<IndexEvent>,
    stamper: Stamper,
}

impl ListService {
    /// Creates an engine with an empty index. Call
    /// [`load_from_cache`](Self::load_from_cache) before anything else.
    pub fn new(
        remote: Arc<dyn RemoteStore>,
        cache: Box<dyn LocalCache>,
        owner: Arc<dyn OwnerIdentity>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        ListService {
            remote,
            owner,
            lookup: None,
            watch_log: None,
            index: RwLock::new(ListIndex::new()),
            cache: Mutex::new(cache),
            events,
            stamper: Stamper::system(),
        }
    }

    /// Enables advisory metadata enrichment in [`add_item`](Self::add_item).
    pub fn with_lookup(mut self, lookup: Arc<dyn MetadataLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    /// Sets the watch log used when the items-with-watched endpoint is
    /// unavailable. Without one, every item reads as unwatched.
    pub fn with_watch_log(mut self, watch_log: Arc<dyn WatchLog>) -> Self {
        self.watch_log = Some(watch_log);
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<IndexEvent> {
        self.events.subscribe()
    }

    // Reads

    /// Lists in display order: pinned first, then most recently updated.
    pub fn lists(&self) -> Vec<ListMeta> {
        self.read_index().lists().to_vec()
    }

    pub fn list(&self, list_id: &str) -> Option<ListMeta> {
        self.read_index().list(list_id).cloned()
    }

    /// A list's items in ascending sort order.
    pub fn items(&self, list_id: &str) -> Vec<ListItem> {
        self.read_index().items(list_id).to_vec()
    }

    /// Watch status as of the last reload of the list.
    pub fn is_watched(&self, list_id: &str, external_ref: ExternalRef) -> bool {
        self.read_index().is_watched(list_id, external_ref)
    }

    // Startup and resync

    /// Seeds the index from the local cache. Never touches the network.
    pub async fn load_from_cache(&self) -> Result<usize> {
        let cache = self.cache.lock().await;
        let lists = cache.load_lists()?;
        let items = cache.load_items()?;
        let count = lists.len();
        debug!(lists = count, items = items.len(), "loaded cache");
        self.write_index().replace(lists, items);
        self.emit([IndexEvent::Reloaded]);
        Ok(count)
    }

    /// Replaces cache and index with the remote's view of every list.
    ///
    /// Counts come from the summary endpoint when it answers and from
    /// per-list counting otherwise; the fallback is never an error.
    pub async fn refresh_all(&self) -> Result<SyncReport> {
        let owner = self.owner_id()?;
        let mut cache = self.cache.lock().await;

        let (mut lists, used_summary) = match self.remote.fetch_lists_summary(&owner).await {
            Ok(lists) => (lists, true),
            Err(e) => {
                warn!(error = %e, "lists summary unavailable, counting per list");
                let lists = critical("fetch_lists", self.remote.fetch_lists(&owner).await)?;
                (lists, false)
            }
        };

        let mut items = Vec::new();
        for list in &mut lists {
            let fetched = critical("fetch_items", self.remote.fetch_items(&list.id).await)?;
            if !used_summary {
                list.item_count =
                    advisory("count_items", self.remote.count_items(&list.id).await)
                        .unwrap_or(fetched.len());
            }
            items.extend(fetched);
        }

        advisory("cache replace_all", cache.replace_all(&lists, &items));
        let report = SyncReport {
            lists: lists.len(),
            items: items.len(),
            used_summary,
        };
        self.write_index().replace(lists, items);
        info!(
            lists = report.lists,
            items = report.items,
            used_summary,
            "refreshed from remote"
        );
        self.emit([IndexEvent::Reloaded]);
        Ok(report)
    }

    /// Refetches one list, its items and their watch status.
    ///
    /// A list the remote no longer has is purged locally and reported as
    /// `ListNotFound`.
    pub async fn reload(&self, list_id: &str) -> Result<ListMeta> {
        let owner = self.owner_id()?;
        let mut cache = self.cache.lock().await;

        let mut meta = match self.remote.fetch_list(list_id).await {
            Ok(meta) => meta,
            Err(Error::ListNotFound(msg)) => {
                advisory("cache delete_list", cache.delete_list(list_id));
                if self.write_index().remove_list(list_id).is_some() {
                    debug!(list_id, "purged list missing from remote");
                    self.emit(changed(list_id));
                }
                return Err(Error::ListNotFound(msg));
            }
            Err(e) => return Err(e),
        };

        let watched = self.fetch_watched(&owner, list_id).await?;
        let (items, refs) = split_watched(&watched);
        meta.item_count = items.len();

        advisory("cache upsert_list", cache.upsert_list(&meta));
        advisory("cache replace_items", cache.replace_items(list_id, &items));
        {
            let mut index = self.write_index();
            index.upsert_list(meta.clone());
            index.set_items(list_id, items);
            index.set_watched(list_id, refs);
        }
        self.emit(changed(list_id));
        Ok(meta)
    }

    /// A list's items with watch status, refreshing items and flags locally.
    pub async fn items_with_watched(&self, list_id: &str) -> Result<Vec<WatchedItem>> {
        let owner = self.owner_id()?;
        let mut cache = self.cache.lock().await;
        let mut meta = self.require_list(list_id)?;

        let watched = self.fetch_watched(&owner, list_id).await?;
        let (items, refs) = split_watched(&watched);
        meta.item_count = items.len();

        advisory("cache upsert_list", cache.upsert_list(&meta));
        advisory("cache replace_items", cache.replace_items(list_id, &items));
        {
            let mut index = self.write_index();
            index.upsert_list(meta);
            index.set_items(list_id, items);
            index.set_watched(list_id, refs);
        }
        self.emit([IndexEvent::ItemsChanged {
            list_id: list_id.to_string(),
        }]);
        Ok(watched)
    }

    // List mutations

    pub async fn create_list(&self, list: NewList) -> Result<ListMeta> {
        let owner = self.owner_id()?;
        let list = list.normalized()?;
        let mut cache = self.cache.lock().await;

        let meta = critical("create_list", self.remote.create_list(&owner, list).await)?;

        advisory("cache upsert_list", cache.upsert_list(&meta));
        self.write_index().upsert_list(meta.clone());
        debug!(list_id = %meta.id, name = %meta.name, "created list");
        self.emit([IndexEvent::ListsChanged]);
        Ok(meta)
    }

    /// Applies a partial update. Only the fields the patch names change.
    pub async fn update_list(&self, list_id: &str, patch: ListPatch) -> Result<ListMeta> {
        self.owner_id()?;
        let patch = patch.normalized()?;
        let mut cache = self.cache.lock().await;
        self.apply_patch(&mut **cache, list_id, patch).await
    }

    pub async fn delete_list(&self, list_id: &str) -> Result<()> {
        self.owner_id()?;
        let mut cache = self.cache.lock().await;

        critical("delete_list", self.remote.delete_list(list_id).await)?;

        advisory("cache delete_list", cache.delete_list(list_id));
        self.write_index().remove_list(list_id);
        debug!(list_id, "deleted list");
        self.emit(changed(list_id));
        Ok(())
    }

    pub async fn pin(&self, list_id: &str) -> Result<ListMeta> {
        self.set_pinned(list_id, true).await
    }

    pub async fn unpin(&self, list_id: &str) -> Result<ListMeta> {
        self.set_pinned(list_id, false).await
    }

    async fn set_pinned(&self, list_id: &str, pinned: bool) -> Result<ListMeta> {
        self.owner_id()?;
        let mut cache = self.cache.lock().await;
        self.apply_patch(&mut **cache, list_id, ListPatch::new().pinned(pinned))
            .await
    }

    async fn apply_patch(
        &self,
        cache: &mut dyn LocalCache,
        list_id: &str,
        patch: ListPatch,
    ) -> Result<ListMeta> {
        let current = self.require_list(list_id)?;
        let patch = patch.touched_at(self.stamper.after(current.updated_at));

        let mut meta = critical("update_list", self.remote.update_list(list_id, patch).await)?;
        // The remote's count may be stale; ours is refreshed on every item change.
        meta.item_count = current.item_count;

        advisory("cache upsert_list", cache.upsert_list(&meta));
        self.write_index().upsert_list(meta.clone());
        debug!(list_id, pinned = meta.pinned, "updated list");
        self.emit([IndexEvent::ListsChanged]);
        Ok(meta)
    }

    /// Bumps a list's `updated_at`.
    ///
    /// Advisory throughout: if the remote refuses, the list still moves
    /// forward locally and only the cache keeps the old timestamp.
    pub async fn touch_updated_at(&self, list_id: &str) -> Result<ListMeta> {
        self.owner_id()?;
        let mut cache = self.cache.lock().await;
        let current = self.require_list(list_id)?;

        let touched = self.touch(current).await;

        advisory("cache upsert_list", cache.upsert_list(&touched.cache));
        self.write_index().upsert_list(touched.index.clone());
        self.emit([IndexEvent::ListsChanged]);
        Ok(touched.index)
    }

    // Item mutations

    /// Appends an item at `max(sort_order) + 1`.
    pub async fn add_item(&self, list_id: &str, draft: ItemDraft) -> Result<ListItem> {
        self.owner_id()?;
        let mut cache = self.cache.lock().await;

        let (current, sort_order, local_count) = {
            let index = self.read_index();
            let current = index
                .list(list_id)
                .cloned()
                .ok_or_else(|| Error::ListNotFound(list_id.to_string()))?;
            if index.find_item(list_id, draft.external_ref).is_some() {
                return Err(Error::item_exists(list_id, draft.external_ref));
            }
            let items = index.items(list_id);
            (current, ListItem::next_sort_order(items), items.len())
        };

        let draft = self.enrich(draft).await;
        if draft.title.trim().is_empty() {
            return Err(Error::InvalidArgument("item title cannot be empty".into()));
        }

        let item = critical(
            "add_item",
            self.remote.add_item(list_id, draft, sort_order).await,
        )?;

        let touched = self.recount_and_touch(current, local_count + 1).await;

        advisory("cache upsert_item", cache.upsert_item(&item));
        advisory("cache upsert_list", cache.upsert_list(&touched.cache));
        {
            let mut index = self.write_index();
            index.upsert_item(item.clone());
            index.upsert_list(touched.index);
        }
        debug!(
            list_id,
            external_ref = item.external_ref,
            sort_order = item.sort_order,
            "added item"
        );
        self.emit(changed(list_id));
        Ok(item)
    }

    /// Removes the item referencing `external_ref`. Other items keep their
    /// sort order.
    pub async fn remove_item(&self, list_id: &str, external_ref: ExternalRef) -> Result<()> {
        self.owner_id()?;
        let mut cache = self.cache.lock().await;

        let (current, item, local_count) = {
            let index = self.read_index();
            let item = index
                .find_item(list_id, external_ref)
                .cloned()
                .ok_or_else(|| Error::item_not_found(list_id, external_ref))?;
            let current = index
                .list(list_id)
                .cloned()
                .ok_or_else(|| Error::ListNotFound(list_id.to_string()))?;
            (current, item, index.items(list_id).len())
        };

        critical("remove_item", self.remote.remove_item(&item.id).await)?;

        let touched = self
            .recount_and_touch(current, local_count.saturating_sub(1))
            .await;

        advisory("cache delete_item", cache.delete_item(&item.id));
        advisory("cache upsert_list", cache.upsert_list(&touched.cache));
        {
            let mut index = self.write_index();
            index.remove_item(list_id, &item.id);
            index.upsert_list(touched.index);
        }
        debug!(list_id, external_ref, "removed item");
        self.emit(changed(list_id));
        Ok(())
    }

    /// Renumbers a list's items `1..=N` in the given order.
    ///
    /// `ordered_item_ids` must name every item of the list exactly once.
    pub async fn reorder_items(
        &self,
        list_id: &str,
        ordered_item_ids: &[String],
    ) -> Result<Vec<ListItem>> {
        self.owner_id()?;
        let mut cache = self.cache.lock().await;

        let (current, reordered) = {
            let index = self.read_index();
            let current = index
                .list(list_id)
                .cloned()
                .ok_or_else(|| Error::ListNotFound(list_id.to_string()))?;
            (current, renumber(index.items(list_id), ordered_item_ids)?)
        };

        for item in &reordered {
            critical(
                "update_item_sort_order",
                self.remote
                    .update_item_sort_order(&item.id, item.sort_order)
                    .await,
            )?;
        }

        let touched = self.touch(current).await;

        advisory("cache replace_items", cache.replace_items(list_id, &reordered));
        advisory("cache upsert_list", cache.upsert_list(&touched.cache));
        {
            let mut index = self.write_index();
            index.set_items(list_id, reordered.clone());
            index.upsert_list(touched.index);
        }
        debug!(list_id, items = reordered.len(), "reordered items");
        self.emit(changed(list_id));
        Ok(reordered)
    }

    // Helpers

    fn owner_id(&self) -> Result<String> {
        self.owner
            .current_owner_id()
            .ok_or(Error::AuthenticationRequired)
    }

    fn require_list(&self, list_id: &str) -> Result<ListMeta> {
        self.list(list_id)
            .ok_or_else(|| Error::ListNotFound(list_id.to_string()))
    }

    fn read_index(&self) -> RwLockReadGuard<'_, ListIndex> {
        self.index.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_index(&self) -> RwLockWriteGuard<'_, ListIndex> {
        self.index.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, events: impl IntoIterator<Item = IndexEvent>) {
        for event in events {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
    }

    /// Fills missing draft fields from the catalog, if one is configured.
    async fn enrich(&self, mut draft: ItemDraft) -> ItemDraft {
        let incomplete = draft.release_date.is_none()
            || draft.year.is_none()
            || draft.poster_url.is_none()
            || draft.title.trim().is_empty();
        if let (true, Some(lookup)) = (incomplete, &self.lookup) {
            if let Some(metadata) = advisory("enrich", lookup.lookup(draft.external_ref).await) {
                metadata.enrich(&mut draft);
            }
        }
        draft
    }

    /// Refreshes the item count from the remote (falling back to
    /// `local_count`) and bumps `updated_at`.
    async fn recount_and_touch(&self, mut meta: ListMeta, local_count: usize) -> Touched {
        meta.item_count = advisory("count_items", self.remote.count_items(&meta.id).await)
            .unwrap_or(local_count);
        self.touch(meta).await
    }

    async fn touch(&self, mut meta: ListMeta) -> Touched {
        let previous = meta.updated_at;
        let at = self.stamper.after(previous);
        let accepted = advisory("touch_list", self.remote.touch_list(&meta.id, at).await).is_some();

        meta.updated_at = at;
        let mut cached = meta.clone();
        if !accepted {
            cached.updated_at = previous;
        }
        Touched {
            index: meta,
            cache: cached,
        }
    }

    /// Items with watch flags: the joined endpoint when available, otherwise
    /// items plus a separate watch-log lookup merged here.
    async fn fetch_watched(&self, owner: &str, list_id: &str) -> Result<Vec<WatchedItem>> {
        let err = match self.remote.fetch_items_with_watched(list_id, owner).await {
            Ok(items) => return Ok(items),
            Err(e @ Error::ListNotFound(_)) => return Err(e),
            Err(e) => e,
        };
        warn!(list_id, error = %err, "items-with-watched unavailable, merging client side");

        let items = critical("fetch_items", self.remote.fetch_items(list_id).await)?;
        let watched = match &self.watch_log {
            Some(log) => {
                let refs: Vec<ExternalRef> = items.iter().map(|i| i.external_ref).collect();
                advisory("batch_watched", log.batch_watched(owner, &refs).await)
                    .unwrap_or_default()
            }
            None => HashSet::new(),
        };
        Ok(items
            .into_iter()
            .map(|item| WatchedItem {
                watched: watched.contains(&item.external_ref),
                item,
            })
            .collect())
    }
}

fn changed(list_id: &str) -> [IndexEvent; 2] {
    [
        IndexEvent::ItemsChanged {
            list_id: list_id.to_string(),
        },
        IndexEvent::ListsChanged,
    ]
}

fn split_watched(watched: &[WatchedItem]) -> (Vec<ListItem>, HashSet<ExternalRef>) {
    let items = watched.iter().map(|w| w.item.clone()).collect();
    let refs = watched
        .iter()
        .filter(|w| w.watched)
        .map(|w| w.item.external_ref)
        .collect();
    (items, refs)
}

/// Assigns `sort_order = position + 1` following `order`, which must be a
/// permutation of the ids in `items`.
fn renumber(items: &[ListItem], order: &[String]) -> Result<Vec<ListItem>> {
    let invalid = || {
        Error::InvalidArgument(format!(
            "reorder must list each of the {} item ids exactly once",
            items.len()
        ))
    };
    if order.len() != items.len() {
        return Err(invalid());
    }
    let mut seen = HashSet::new();
    let mut reordered = Vec::with_capacity(order.len());
    for (position, id) in order.iter().enumerate() {
        if !seen.insert(id.as_str()) {
            return Err(invalid());
        }
        let mut item = items.iter().find(|i| &i.id == id).cloned().ok_or_else(invalid)?;
        item.sort_order = u32::try_from(position + 1).map_err(|_| invalid())?;
        reordered.push(item);
    }
    Ok(reordered)
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
