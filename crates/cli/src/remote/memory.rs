// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-process authoritative store.
//!
//! Behaves like the reference server: it assigns ids and timestamps,
//! enforces one item per external ref, and never maintains `item_count`
//! itself, so plain list fetches report the count stored at creation while
//! the summary endpoint counts. Failures can be injected per operation.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use reel_core::id::{generate_unique_id, ITEM_PREFIX, LIST_PREFIX};
use reel_core::{
    Error, ExternalRef, ItemDraft, ListItem, ListMeta, ListPatch, NewList, Result, Stamper,
    SteppingClock, WatchedItem,
};

use super::RemoteStore;
use crate::collab::WatchLog;

#[derive(Default)]
struct Tables {
    lists: BTreeMap<String, ListMeta>,
    items: BTreeMap<String, ListItem>,
    watched: HashSet<(String, ExternalRef)>,
}

impl Tables {
    fn list(&self, id: &str) -> Result<&ListMeta> {
        self.lists
            .get(id)
            .ok_or_else(|| Error::ListNotFound(id.to_string()))
    }

    fn items_of(&self, list_id: &str) -> Vec<ListItem> {
        let mut items: Vec<ListItem> = self
            .items
            .values()
            .filter(|i| i.list_id == list_id)
            .cloned()
            .collect();
        items.sort_by_key(|i| i.sort_order);
        items
    }
}

#[derive(Default)]
struct Faults {
    fail_all: bool,
    /// Remaining successful calls per operation before it starts failing.
    allowances: HashMap<&'static str, usize>,
}

/// [`RemoteStore`] kept entirely in memory.
pub struct MemoryRemoteStore {
    tables: Mutex<Tables>,
    faults: Mutex<Faults>,
    calls: Mutex<HashMap<&'static str, usize>>,
    stamper: Stamper<SteppingClock>,
}

impl Default for MemoryRemoteStore {
    fn default() -> Self {
        Self::with_clock(SteppingClock::default())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose timestamps come from `clock`.
    pub fn with_clock(clock: SteppingClock) -> Self {
        MemoryRemoteStore {
            tables: Mutex::new(Tables::default()),
            faults: Mutex::new(Faults::default()),
            calls: Mutex::new(HashMap::new()),
            stamper: Stamper::with_clock(clock),
        }
    }

    /// Makes every operation fail with `RemoteUnavailable`.
    pub fn set_fail_all(&self, fail: bool) {
        lock(&self.faults).fail_all = fail;
    }

    /// Makes `op` (a protocol request name such as `"touch_list"`) fail.
    pub fn fail_on(&self, op: &'static str) {
        self.fail_after(op, 0);
    }

    /// Lets `op` succeed `successes` more times, then fail.
    pub fn fail_after(&self, op: &'static str, successes: usize) {
        lock(&self.faults).allowances.insert(op, successes);
    }

    /// Removes every injected failure.
    pub fn clear_failures(&self) {
        *lock(&self.faults) = Faults::default();
    }

    /// How many times `op` was called, failed calls included.
    pub fn calls(&self, op: &str) -> usize {
        lock(&self.calls).get(op).copied().unwrap_or(0)
    }

    /// Records a watch in the owner's log.
    pub fn mark_watched(&self, owner_id: &str, external_ref: ExternalRef) {
        lock(&self.tables)
            .watched
            .insert((owner_id.to_string(), external_ref));
    }

    /// The stored list, bypassing failure injection and call counting.
    pub fn peek_list(&self, id: &str) -> Option<ListMeta> {
        lock(&self.tables).lists.get(id).cloned()
    }

    /// The stored items of a list in sort order, bypassing failure injection.
    pub fn peek_items(&self, list_id: &str) -> Vec<ListItem> {
        lock(&self.tables).items_of(list_id)
    }

    fn enter(&self, op: &'static str) -> Result<()> {
        *lock(&self.calls).entry(op).or_insert(0) += 1;
        let mut faults = lock(&self.faults);
        if faults.fail_all {
            return Err(Error::RemoteUnavailable(format!("{op}: injected failure")));
        }
        if let Some(remaining) = faults.allowances.get_mut(op) {
            if *remaining == 0 {
                return Err(Error::RemoteUnavailable(format!("{op}: injected failure")));
            }
            *remaining -= 1;
        }
        Ok(())
    }

    fn counted(tables: &Tables, mut meta: ListMeta) -> ListMeta {
        meta.item_count = tables.items.values().filter(|i| i.list_id == meta.id).count();
        meta
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn create_list(&self, owner_id: &str, list: NewList) -> Result<ListMeta> {
        self.enter("create_list")?;
        let list = list.normalized()?;
        let now = self.stamper.now();
        let mut tables = lock(&self.tables);
        let id = generate_unique_id(LIST_PREFIX, &format!("{owner_id}/{}", list.name), &now, |c| {
            tables.lists.contains_key(c)
        });
        let meta = ListMeta {
            id: id.clone(),
            owner_id: owner_id.to_string(),
            name: list.name,
            description: list.description,
            created_at: now,
            updated_at: now,
            item_count: 0,
            pinned: false,
            ranked: list.ranked,
            tags: list.tags,
            themed_month_date: list.themed_month_date,
        };
        tables.lists.insert(id, meta.clone());
        Ok(meta)
    }

    async fn update_list(&self, id: &str, patch: ListPatch) -> Result<ListMeta> {
        self.enter("update_list")?;
        let patch = patch.normalized()?;
        let now = self.stamper.now();
        let mut tables = lock(&self.tables);
        let meta = tables
            .lists
            .get_mut(id)
            .ok_or_else(|| Error::ListNotFound(id.to_string()))?;
        patch.apply_to(meta, now);
        Ok(meta.clone())
    }

    async fn delete_list(&self, id: &str) -> Result<()> {
        self.enter("delete_list")?;
        let mut tables = lock(&self.tables);
        tables
            .lists
            .remove(id)
            .ok_or_else(|| Error::ListNotFound(id.to_string()))?;
        tables.items.retain(|_, item| item.list_id != id);
        Ok(())
    }

    async fn add_item(
        &self,
        list_id: &str,
        draft: ItemDraft,
        sort_order: u32,
    ) -> Result<ListItem> {
        self.enter("add_item")?;
        let now = self.stamper.now();
        let mut tables = lock(&self.tables);
        tables.list(list_id)?;
        let existing = tables.items_of(list_id);
        if existing.iter().any(|i| i.external_ref == draft.external_ref) {
            return Err(Error::item_exists(list_id, draft.external_ref));
        }
        let sort_order = sort_order.max(ListItem::next_sort_order(&existing));
        let id = generate_unique_id(
            ITEM_PREFIX,
            &format!("{list_id}/{}", draft.external_ref),
            &now,
            |c| tables.items.contains_key(c),
        );
        let item = ListItem {
            id: id.clone(),
            list_id: list_id.to_string(),
            external_ref: draft.external_ref,
            title: draft.title,
            poster_url: draft.poster_url,
            backdrop_url: draft.backdrop_url,
            year: draft.year,
            release_date: draft.release_date,
            added_at: now,
            sort_order,
        };
        tables.items.insert(id, item.clone());
        Ok(item)
    }

    async fn remove_item(&self, item_id: &str) -> Result<()> {
        self.enter("remove_item")?;
        lock(&self.tables)
            .items
            .remove(item_id)
            .map(|_| ())
            .ok_or_else(|| Error::ItemNotFound(item_id.to_string()))
    }

    async fn update_item_sort_order(&self, item_id: &str, sort_order: u32) -> Result<()> {
        self.enter("update_item_sort_order")?;
        if sort_order == 0 {
            return Err(Error::InvalidArgument("sort_order must be positive".into()));
        }
        let mut tables = lock(&self.tables);
        let item = tables
            .items
            .get_mut(item_id)
            .ok_or_else(|| Error::ItemNotFound(item_id.to_string()))?;
        item.sort_order = sort_order;
        Ok(())
    }

    async fn touch_list(&self, list_id: &str, at: DateTime<Utc>) -> Result<()> {
        self.enter("touch_list")?;
        let mut tables = lock(&self.tables);
        let meta = tables
            .lists
            .get_mut(list_id)
            .ok_or_else(|| Error::ListNotFound(list_id.to_string()))?;
        meta.updated_at = at;
        Ok(())
    }

    async fn fetch_list(&self, id: &str) -> Result<ListMeta> {
        self.enter("fetch_list")?;
        let tables = lock(&self.tables);
        let meta = tables.list(id)?.clone();
        Ok(Self::counted(&tables, meta))
    }

    async fn fetch_lists(&self, owner_id: &str) -> Result<Vec<ListMeta>> {
        self.enter("fetch_lists")?;
        Ok(lock(&self.tables)
            .lists
            .values()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn fetch_items(&self, list_id: &str) -> Result<Vec<ListItem>> {
        self.enter("fetch_items")?;
        let tables = lock(&self.tables);
        tables.list(list_id)?;
        Ok(tables.items_of(list_id))
    }

    async fn count_items(&self, list_id: &str) -> Result<usize> {
        self.enter("count_items")?;
        let tables = lock(&self.tables);
        tables.list(list_id)?;
        Ok(tables.items.values().filter(|i| i.list_id == list_id).count())
    }

    async fn fetch_lists_summary(&self, owner_id: &str) -> Result<Vec<ListMeta>> {
        self.enter("fetch_lists_summary")?;
        let tables = lock(&self.tables);
        Ok(tables
            .lists
            .values()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .map(|meta| Self::counted(&tables, meta))
            .collect())
    }

    async fn fetch_items_with_watched(
        &self,
        list_id: &str,
        owner_id: &str,
    ) -> Result<Vec<WatchedItem>> {
        self.enter("fetch_items_with_watched")?;
        let tables = lock(&self.tables);
        tables.list(list_id)?;
        Ok(tables
            .items_of(list_id)
            .into_iter()
            .map(|item| WatchedItem {
                watched: tables
                    .watched
                    .contains(&(owner_id.to_string(), item.external_ref)),
                item,
            })
            .collect())
    }
}

#[async_trait]
impl WatchLog for MemoryRemoteStore {
    async fn batch_watched(
        &self,
        owner_id: &str,
        external_refs: &[ExternalRef],
    ) -> Result<HashSet<ExternalRef>> {
        self.enter("batch_watched")?;
        let tables = lock(&self.tables);
        Ok(external_refs
            .iter()
            .copied()
            .filter(|r| tables.watched.contains(&(owner_id.to_string(), *r)))
            .collect())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
