// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::{TimeZone, Utc};
use tempfile::TempDir;

fn meta(id: &str) -> ListMeta {
    let at = Utc.timestamp_opt(1_700_000_000, 0).single().unwrap();
    ListMeta {
        id: id.into(),
        owner_id: "alice".into(),
        name: format!("List {id}"),
        description: None,
        created_at: at,
        updated_at: at,
        item_count: 0,
        pinned: false,
        ranked: false,
        tags: Default::default(),
        themed_month_date: None,
    }
}

fn item(id: &str, list_id: &str, external_ref: i64, sort_order: u32) -> ListItem {
    ListItem {
        id: id.into(),
        list_id: list_id.into(),
        external_ref,
        title: format!("Title {external_ref}"),
        poster_url: None,
        backdrop_url: None,
        year: None,
        release_date: None,
        added_at: Utc.timestamp_opt(1_700_000_100, 0).single().unwrap(),
        sort_order,
    }
}

fn ids(items: &[ListItem]) -> Vec<&str> {
    items.iter().map(|i| i.id.as_str()).collect()
}

/// Behavior every cache must share.
fn exercise(cache: &mut dyn LocalCache) {
    cache.upsert_list(&meta("l-1")).unwrap();
    cache.upsert_list(&meta("l-2")).unwrap();
    cache.upsert_item(&item("i-2", "l-1", 20, 2)).unwrap();
    cache.upsert_item(&item("i-1", "l-1", 10, 1)).unwrap();
    cache.upsert_item(&item("i-3", "l-2", 30, 1)).unwrap();

    assert_eq!(cache.load_lists().unwrap().len(), 2);
    assert_eq!(ids(&cache.load_items().unwrap()), vec!["i-1", "i-2", "i-3"]);

    let mut renamed = meta("l-1");
    renamed.name = "Renamed".into();
    cache.upsert_list(&renamed).unwrap();
    assert_eq!(cache.load_items().unwrap().len(), 3);

    cache.delete_item("i-2").unwrap();
    cache.replace_items("l-2", &[item("i-4", "l-2", 40, 1)]).unwrap();
    assert_eq!(ids(&cache.load_items().unwrap()), vec!["i-1", "i-4"]);

    cache.delete_list("l-1").unwrap();
    assert_eq!(ids(&cache.load_items().unwrap()), vec!["i-4"]);

    cache
        .replace_all(&[meta("l-9")], &[item("i-9", "l-9", 90, 1)])
        .unwrap();
    let lists = cache.load_lists().unwrap();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].id, "l-9");
    assert_eq!(ids(&cache.load_items().unwrap()), vec!["i-9"]);
}

#[test]
fn memory_cache_contract() {
    exercise(&mut MemoryCache::new());
}

#[test]
fn sqlite_cache_contract() {
    exercise(&mut SqliteCache::open_in_memory().unwrap());
}

#[test]
fn sqlite_cache_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("cache.db");
    {
        let mut cache = SqliteCache::open(&path).unwrap();
        let mut list = meta("l-1");
        list.item_count = 1;
        list.pinned = true;
        cache.upsert_list(&list).unwrap();
        cache.upsert_item(&item("i-1", "l-1", 550, 1)).unwrap();
    }

    let cache = SqliteCache::open(&path).unwrap();
    let lists = cache.load_lists().unwrap();
    assert_eq!(lists[0].item_count, 1);
    assert!(lists[0].pinned);
    assert_eq!(cache.load_items().unwrap()[0].external_ref, 550);
}

#[test]
fn sqlite_replace_all_rolls_back_on_failure() {
    let mut cache = SqliteCache::open_in_memory().unwrap();
    cache.upsert_list(&meta("l-1")).unwrap();

    // Item references a list that is not part of the replacement.
    let result = cache.replace_all(&[meta("l-2")], &[item("i-1", "l-missing", 1, 1)]);

    assert!(result.is_err());
    assert_eq!(cache.load_lists().unwrap()[0].id, "l-1");
}

#[test]
fn memory_cache_clones_share_state() {
    let handle = MemoryCache::new();
    let mut cache = handle.clone();
    cache.upsert_list(&meta("l-1")).unwrap();
    cache.upsert_item(&item("i-1", "l-1", 1, 1)).unwrap();

    assert!(handle.list("l-1").is_some());
    assert_eq!(handle.items_of("l-1").len(), 1);
}

#[test]
fn memory_cache_write_failure() {
    let mut cache = MemoryCache::new();
    cache.set_fail_writes(true);
    assert!(cache.upsert_list(&meta("l-1")).is_err());
    assert!(cache.load_lists().unwrap().is_empty());
}
