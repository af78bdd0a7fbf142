// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable on-device mirror of the remote store.
//!
//! The cache is write-through: the engine writes it only after the remote
//! accepted a change, and reads it once at startup to seed the index.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reel_core::{Database, Error, ItemRecord, ListItem, ListMeta, ListRecord, Result};

/// Storage for the last committed lists and items.
pub trait LocalCache: Send {
    fn load_lists(&self) -> Result<Vec<ListMeta>>;

    /// Every cached item, grouped by list in sort order.
    fn load_items(&self) -> Result<Vec<ListItem>>;

    fn upsert_list(&mut self, list: &ListMeta) -> Result<()>;

    fn upsert_item(&mut self, item: &ListItem) -> Result<()>;

    /// Deletes a list and its items.
    fn delete_list(&mut self, id: &str) -> Result<()>;

    fn delete_item(&mut self, id: &str) -> Result<()>;

    /// Replaces the whole cache atomically.
    fn replace_all(&mut self, lists: &[ListMeta], items: &[ListItem]) -> Result<()>;

    /// Replaces one list's items atomically.
    fn replace_items(&mut self, list_id: &str, items: &[ListItem]) -> Result<()>;
}

/// [`LocalCache`] in a SQLite database file.
pub struct SqliteCache {
    db: Database,
}

impl SqliteCache {
    /// Opens (creating and migrating if needed) the cache at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        Ok(SqliteCache {
            db: Database::open(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(SqliteCache {
            db: Database::open_in_memory()?,
        })
    }
}

fn list_records(lists: &[ListMeta]) -> Vec<ListRecord> {
    lists.iter().map(ListRecord::from_meta).collect()
}

fn item_records(items: &[ListItem]) -> Vec<ItemRecord> {
    items.iter().map(ItemRecord::from_item).collect()
}

impl LocalCache for SqliteCache {
    fn load_lists(&self) -> Result<Vec<ListMeta>> {
        self.db
            .all_lists()?
            .into_iter()
            .map(ListRecord::into_meta)
            .collect()
    }

    fn load_items(&self) -> Result<Vec<ListItem>> {
        self.db
            .all_items()?
            .into_iter()
            .map(ItemRecord::into_item)
            .collect()
    }

    fn upsert_list(&mut self, list: &ListMeta) -> Result<()> {
        self.db.upsert_list(&ListRecord::from_meta(list))
    }

    fn upsert_item(&mut self, item: &ListItem) -> Result<()> {
        self.db.upsert_item(&ItemRecord::from_item(item))
    }

    fn delete_list(&mut self, id: &str) -> Result<()> {
        self.db.delete_list(id)?;
        Ok(())
    }

    fn delete_item(&mut self, id: &str) -> Result<()> {
        self.db.delete_item(id)?;
        Ok(())
    }

    fn replace_all(&mut self, lists: &[ListMeta], items: &[ListItem]) -> Result<()> {
        self.db
            .replace_all(&list_records(lists), &item_records(items))
    }

    fn replace_items(&mut self, list_id: &str, items: &[ListItem]) -> Result<()> {
        self.db.replace_items(list_id, &item_records(items))
    }
}

#[derive(Default)]
struct MemoryTables {
    lists: BTreeMap<String, ListMeta>,
    items: BTreeMap<String, ListItem>,
    fail_writes: bool,
}

/// [`LocalCache`] in process memory.
///
/// Clones share the same tables, so a test can keep a handle on the cache it
/// gave to the engine.
#[derive(Clone, Default)]
pub struct MemoryCache {
    tables: Arc<Mutex<MemoryTables>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every write fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    pub fn list(&self, id: &str) -> Option<ListMeta> {
        self.lock().lists.get(id).cloned()
    }

    /// A list's cached items in sort order.
    pub fn items_of(&self, list_id: &str) -> Vec<ListItem> {
        let mut items: Vec<ListItem> = self
            .lock()
            .items
            .values()
            .filter(|i| i.list_id == list_id)
            .cloned()
            .collect();
        items.sort_by_key(|i| i.sort_order);
        items
    }

    fn lock(&self) -> MutexGuard<'_, MemoryTables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn writable(&self) -> Result<MutexGuard<'_, MemoryTables>> {
        let tables = self.lock();
        if tables.fail_writes {
            return Err(Error::Io(std::io::Error::other("cache write failed")));
        }
        Ok(tables)
    }
}

impl LocalCache for MemoryCache {
    fn load_lists(&self) -> Result<Vec<ListMeta>> {
        Ok(self.lock().lists.values().cloned().collect())
    }

    fn load_items(&self) -> Result<Vec<ListItem>> {
        let mut items: Vec<ListItem> = self.lock().items.values().cloned().collect();
        items.sort_by(|a, b| {
            a.list_id
                .cmp(&b.list_id)
                .then(a.sort_order.cmp(&b.sort_order))
        });
        Ok(items)
    }

    fn upsert_list(&mut self, list: &ListMeta) -> Result<()> {
        self.writable()?.lists.insert(list.id.clone(), list.clone());
        Ok(())
    }

    fn upsert_item(&mut self, item: &ListItem) -> Result<()> {
        self.writable()?.items.insert(item.id.clone(), item.clone());
        Ok(())
    }

    fn delete_list(&mut self, id: &str) -> Result<()> {
        let mut tables = self.writable()?;
        tables.lists.remove(id);
        tables.items.retain(|_, item| item.list_id != id);
        Ok(())
    }

    fn delete_item(&mut self, id: &str) -> Result<()> {
        self.writable()?.items.remove(id);
        Ok(())
    }

    fn replace_all(&mut self, lists: &[ListMeta], items: &[ListItem]) -> Result<()> {
        let mut tables = self.writable()?;
        tables.lists = lists.iter().map(|l| (l.id.clone(), l.clone())).collect();
        tables.items = items.iter().map(|i| (i.id.clone(), i.clone())).collect();
        Ok(())
    }

    fn replace_items(&mut self, list_id: &str, items: &[ListItem]) -> Result<()> {
        let mut tables = self.writable()?;
        tables.items.retain(|_, item| item.list_id != list_id);
        tables
            .items
            .extend(items.iter().map(|i| (i.id.clone(), i.clone())));
        Ok(())
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
