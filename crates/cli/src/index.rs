// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-process view of every list and its items.
//!
//! Lists are kept in display order (pinned first, then most recently
//! updated) and each list's items in ascending `sort_order`, so reads are
//! plain slice borrows.

use std::collections::{HashMap, HashSet};

use reel_core::{ExternalRef, ListItem, ListMeta};

/// Change notification sent after a mutation committed to the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexEvent {
    /// List metadata or list ordering changed.
    ListsChanged,
    /// The items of one list changed.
    ItemsChanged { list_id: String },
    /// Everything was replaced from the remote store.
    Reloaded,
}

#[derive(Debug, Default)]
pub struct ListIndex {
    lists: Vec<ListMeta>,
    items: HashMap<String, Vec<ListItem>>,
    watched: HashMap<String, HashSet<ExternalRef>>,
}

impl ListIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists in display order.
    pub fn lists(&self) -> &[ListMeta] {
        &self.lists
    }

    pub fn list(&self, id: &str) -> Option<&ListMeta> {
        self.lists.iter().find(|l| l.id == id)
    }

    /// A list's items in ascending sort order; empty for unknown lists.
    pub fn items(&self, list_id: &str) -> &[ListItem] {
        self.items.get(list_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find_item(&self, list_id: &str, external_ref: ExternalRef) -> Option<&ListItem> {
        self.items(list_id)
            .iter()
            .find(|i| i.external_ref == external_ref)
    }

    pub fn is_watched(&self, list_id: &str, external_ref: ExternalRef) -> bool {
        self.watched
            .get(list_id)
            .is_some_and(|refs| refs.contains(&external_ref))
    }

    /// Inserts or replaces a list and restores display order.
    pub fn upsert_list(&mut self, meta: ListMeta) {
        match self.lists.iter_mut().find(|l| l.id == meta.id) {
            Some(slot) => *slot = meta,
            None => self.lists.push(meta),
        }
        self.sort_lists();
    }

    /// Removes a list with its items and watch flags.
    pub fn remove_list(&mut self, id: &str) -> Option<ListMeta> {
        let pos = self.lists.iter().position(|l| l.id == id)?;
        self.items.remove(id);
        self.watched.remove(id);
        Some(self.lists.remove(pos))
    }

    /// Inserts or replaces an item, keeping its list sorted.
    pub fn upsert_item(&mut self, item: ListItem) {
        let items = self.items.entry(item.list_id.clone()).or_default();
        items.retain(|i| i.id != item.id);
        let pos = items.partition_point(|i| i.sort_order <= item.sort_order);
        items.insert(pos, item);
    }

    pub fn remove_item(&mut self, list_id: &str, item_id: &str) -> Option<ListItem> {
        let items = self.items.get_mut(list_id)?;
        let pos = items.iter().position(|i| i.id == item_id)?;
        Some(items.remove(pos))
    }

    /// Replaces one list's items.
    pub fn set_items(&mut self, list_id: &str, mut items: Vec<ListItem>) {
        items.sort_by_key(|i| i.sort_order);
        self.items.insert(list_id.to_string(), items);
    }

    /// Replaces one list's watched refs.
    pub fn set_watched(&mut self, list_id: &str, refs: HashSet<ExternalRef>) {
        self.watched.insert(list_id.to_string(), refs);
    }

    /// Replaces the whole index. Watch flags are dropped.
    pub fn replace(&mut self, lists: Vec<ListMeta>, items: Vec<ListItem>) {
        self.lists = lists;
        self.sort_lists();
        self.items.clear();
        self.watched.clear();
        for item in items {
            self.items.entry(item.list_id.clone()).or_default().push(item);
        }
        for items in self.items.values_mut() {
            items.sort_by_key(|i| i.sort_order);
        }
    }

    fn sort_lists(&mut self) {
        self.lists.sort_by(ListMeta::display_cmp);
    }
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod tests;
