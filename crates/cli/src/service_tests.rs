// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use std::collections::BTreeSet;

use chrono::NaiveDate;
use reel_core::Patch;
use yare::parameterized;

use super::*;
use crate::cache::MemoryCache;
use crate::collab::{MediaMetadata, StaticOwner};
use crate::remote::MemoryRemoteStore;

struct Harness {
    remote: Arc<MemoryRemoteStore>,
    cache: MemoryCache,
    service: ListService,
}

fn harness() -> Harness {
    harness_for(StaticOwner::signed_in("alice"))
}

fn harness_for(owner: StaticOwner) -> Harness {
    let remote = Arc::new(MemoryRemoteStore::new());
    let cache = MemoryCache::new();
    let service = ListService::new(remote.clone(), Box::new(cache.clone()), Arc::new(owner));
    Harness {
        remote,
        cache,
        service,
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

impl Harness {
    async fn list(&self, name: &str) -> ListMeta {
        self.service.create_list(NewList::named(name)).await.unwrap()
    }

    async fn add(&self, list_id: &str, external_ref: ExternalRef, title: &str) -> ListItem {
        self.service
            .add_item(list_id, ItemDraft::new(external_ref, title))
            .await
            .unwrap()
    }

    fn titles(&self, list_id: &str) -> Vec<String> {
        self.service
            .items(list_id)
            .into_iter()
            .map(|i| i.title)
            .collect()
    }

    fn sort_orders(&self, list_id: &str) -> Vec<u32> {
        self.service
            .items(list_id)
            .iter()
            .map(|i| i.sort_order)
            .collect()
    }

    fn count(&self, list_id: &str) -> usize {
        self.service.list(list_id).unwrap().item_count
    }
}

struct FixedLookup(Result<MediaMetadata>);

#[async_trait::async_trait]
impl MetadataLookup for FixedLookup {
    async fn lookup(&self, _external_ref: ExternalRef) -> Result<MediaMetadata> {
        match &self.0 {
            Ok(meta) => Ok(meta.clone()),
            Err(e) => Err(Error::RemoteUnavailable(e.to_string())),
        }
    }
}

// Lists

#[tokio::test]
async fn favorites_scenario() {
    let h = harness();
    let favorites = h.list("Favorites").await;

    let item = h
        .service
        .add_item(
            &favorites.id,
            ItemDraft::new(550, "Fight Club").with_year(1999),
        )
        .await
        .unwrap();

    assert_eq!(item.sort_order, 1);
    assert_eq!(item.year, Some(1999));
    assert_eq!(h.count(&favorites.id), 1);
    assert_eq!(h.service.lists()[0].id, favorites.id);
    assert_eq!(h.remote.peek_items(&favorites.id), vec![item.clone()]);
    assert_eq!(h.cache.items_of(&favorites.id), vec![item]);
}

#[tokio::test]
async fn create_list_requires_owner() {
    let h = harness_for(StaticOwner::anonymous());
    let err = h
        .service
        .create_list(NewList::named("Favorites"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AuthenticationRequired));
    assert_eq!(h.remote.calls("create_list"), 0);
}

#[tokio::test]
async fn anonymous_mutations_fail_before_the_remote() {
    let h = harness_for(StaticOwner::anonymous());
    assert!(matches!(
        h.service.refresh_all().await.unwrap_err(),
        Error::AuthenticationRequired
    ));
    assert!(matches!(
        h.service
            .add_item("lst-1", ItemDraft::new(1, "A"))
            .await
            .unwrap_err(),
        Error::AuthenticationRequired
    ));
    assert!(matches!(
        h.service.delete_list("lst-1").await.unwrap_err(),
        Error::AuthenticationRequired
    ));
    assert_eq!(h.remote.calls("fetch_lists_summary"), 0);
    assert_eq!(h.remote.calls("delete_list"), 0);
}

#[tokio::test]
async fn create_list_trims_name() {
    let h = harness();
    let list = h.list("  Weekend  ").await;
    assert_eq!(list.name, "Weekend");
    assert_eq!(h.cache.list(&list.id).unwrap(), list);
}

#[tokio::test]
async fn create_list_rejects_blank_name_locally() {
    let h = harness();
    let err = h
        .service
        .create_list(NewList::named("  "))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(h.remote.calls("create_list"), 0);
}

#[tokio::test]
async fn newest_list_sorts_first() {
    let h = harness();
    let a = h.list("A").await;
    let b = h.list("B").await;
    let ids: Vec<String> = h.service.lists().into_iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);
}

#[tokio::test]
async fn pinned_list_sorts_first_until_unpinned() {
    let h = harness();
    let a = h.list("A").await;
    let b = h.list("B").await;
    let c = h.list("C").await;

    let pinned = h.service.pin(&a.id).await.unwrap();
    assert!(pinned.pinned);
    assert!(pinned.updated_at > a.updated_at);

    // Touching another list never moves it above a pinned one.
    h.service.touch_updated_at(&b.id).await.unwrap();
    let ids: Vec<String> = h.service.lists().into_iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![a.id.clone(), b.id.clone(), c.id.clone()]);

    h.service.unpin(&a.id).await.unwrap();
    h.service.touch_updated_at(&c.id).await.unwrap();
    let ids: Vec<String> = h.service.lists().into_iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![c.id, a.id, b.id]);
}

#[tokio::test]
async fn pin_keeps_local_item_count() {
    let h = harness();
    let list = h.list("Favorites").await;
    h.add(&list.id, 550, "Fight Club").await;

    // The remote only counts on demand; its stored count is still zero.
    assert_eq!(h.remote.peek_list(&list.id).unwrap().item_count, 0);
    let pinned = h.service.pin(&list.id).await.unwrap();
    assert_eq!(pinned.item_count, 1);
    assert_eq!(h.count(&list.id), 1);
}

#[tokio::test]
async fn pin_unknown_list_is_not_found() {
    let h = harness();
    let err = h.service.pin("lst-missing").await.unwrap_err();
    assert!(matches!(err, Error::ListNotFound(_)));
    assert_eq!(h.remote.calls("update_list"), 0);
}

#[tokio::test]
async fn update_list_changes_only_named_fields() {
    let h = harness();
    let list = h
        .service
        .create_list(NewList::named("October").with_description("spooky"))
        .await
        .unwrap();

    let updated = h
        .service
        .update_list(
            &list.id,
            ListPatch::new()
                .themed_month(Patch::Set(date(2024, 10, 15)))
                .tags(BTreeSet::from(["horror".to_string()])),
        )
        .await
        .unwrap();
    assert_eq!(updated.themed_month_date, Some(date(2024, 10, 1)));
    assert_eq!(updated.description.as_deref(), Some("spooky"));
    assert_eq!(updated.name, "October");
    assert!(updated.tags.contains("horror"));

    // Omitting the month leaves it alone.
    let renamed = h
        .service
        .update_list(&list.id, ListPatch::new().name("Spooky Season"))
        .await
        .unwrap();
    assert_eq!(renamed.themed_month_date, Some(date(2024, 10, 1)));

    // Clearing it removes it.
    let cleared = h
        .service
        .update_list(&list.id, ListPatch::new().themed_month(Patch::Clear))
        .await
        .unwrap();
    assert_eq!(cleared.themed_month_date, None);
    assert_eq!(cleared.name, "Spooky Season");
    assert_eq!(h.service.list(&list.id).unwrap(), cleared);
    assert_eq!(h.cache.list(&list.id).unwrap(), cleared);
}

#[tokio::test]
async fn empty_update_is_rejected() {
    let h = harness();
    let list = h.list("A").await;
    let err = h
        .service
        .update_list(&list.id, ListPatch::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(h.remote.calls("update_list"), 0);
}

#[tokio::test]
async fn delete_list_drops_it_everywhere() {
    let h = harness();
    let list = h.list("A").await;
    h.add(&list.id, 1, "One").await;

    h.service.delete_list(&list.id).await.unwrap();

    assert!(h.service.list(&list.id).is_none());
    assert!(h.service.items(&list.id).is_empty());
    assert!(h.cache.list(&list.id).is_none());
    assert!(h.cache.items_of(&list.id).is_empty());
    assert!(h.remote.peek_list(&list.id).is_none());
}

// Items

#[tokio::test]
async fn duplicate_add_is_rejected_without_remote_call() {
    let h = harness();
    let list = h.list("Favorites").await;
    h.add(&list.id, 550, "Fight Club").await;

    let err = h
        .service
        .add_item(&list.id, ItemDraft::new(550, "Fight Club"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ItemAlreadyExists(_)));
    assert_eq!(h.remote.calls("add_item"), 1);
    assert_eq!(h.count(&list.id), 1);
}

#[tokio::test]
async fn add_to_unknown_list_is_not_found() {
    let h = harness();
    let err = h
        .service
        .add_item("lst-missing", ItemDraft::new(1, "A"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ListNotFound(_)));
}

#[tokio::test]
async fn remove_missing_item_is_not_found() {
    let h = harness();
    let list = h.list("Favorites").await;
    let err = h.service.remove_item(&list.id, 550).await.unwrap_err();
    assert!(matches!(err, Error::ItemNotFound(_)));
    assert_eq!(h.remote.calls("remove_item"), 0);
}

#[tokio::test]
async fn count_follows_adds_and_removes() {
    let h = harness();
    let list = h.list("Favorites").await;
    h.add(&list.id, 1, "A").await;
    h.add(&list.id, 2, "B").await;
    assert_eq!(h.count(&list.id), 2);

    h.service.remove_item(&list.id, 1).await.unwrap();
    assert_eq!(h.count(&list.id), 1);
    assert_eq!(h.cache.list(&list.id).unwrap().item_count, 1);
}

#[tokio::test]
async fn count_falls_back_to_local_when_remote_count_fails() {
    let h = harness();
    let list = h.list("Favorites").await;
    h.remote.fail_on("count_items");

    h.add(&list.id, 1, "A").await;
    h.add(&list.id, 2, "B").await;
    assert_eq!(h.count(&list.id), 2);

    h.service.remove_item(&list.id, 2).await.unwrap();
    assert_eq!(h.count(&list.id), 1);
}

#[tokio::test]
async fn removal_leaves_gaps_and_append_uses_max() {
    let h = harness();
    let list = h.list("Favorites").await;
    h.add(&list.id, 1, "A").await;
    h.add(&list.id, 2, "B").await;
    h.add(&list.id, 3, "C").await;

    h.service.remove_item(&list.id, 2).await.unwrap();
    assert_eq!(h.sort_orders(&list.id), vec![1, 3]);

    let d = h.add(&list.id, 4, "D").await;
    assert_eq!(d.sort_order, 4);
    assert_eq!(h.titles(&list.id), vec!["A", "C", "D"]);
}

#[tokio::test]
async fn item_changes_touch_the_list() {
    let h = harness();
    let a = h.list("A").await;
    let b = h.list("B").await;
    assert_eq!(h.service.lists()[0].id, b.id);

    h.add(&a.id, 1, "One").await;

    let touched = h.service.list(&a.id).unwrap();
    assert!(touched.updated_at > a.updated_at);
    assert_eq!(h.service.lists()[0].id, a.id);
    assert_eq!(h.remote.peek_list(&a.id).unwrap().updated_at, touched.updated_at);
    assert_eq!(h.cache.list(&a.id).unwrap().updated_at, touched.updated_at);
}

#[tokio::test]
async fn failed_touch_still_moves_the_list_locally() {
    let h = harness();
    let list = h.list("A").await;
    h.remote.fail_on("touch_list");

    let item = h.add(&list.id, 1, "One").await;

    assert_eq!(item.sort_order, 1);
    assert!(h.service.list(&list.id).unwrap().updated_at > list.updated_at);
    assert_eq!(h.remote.peek_list(&list.id).unwrap().updated_at, list.updated_at);
    let cached = h.cache.list(&list.id).unwrap();
    assert_eq!(cached.updated_at, list.updated_at);
    assert_eq!(cached.item_count, 1);
}

#[tokio::test]
async fn failed_touch_order_reverts_after_restart() {
    let h = harness();
    let a = h.list("A").await;
    let b = h.list("B").await;
    h.service.touch_updated_at(&b.id).await.unwrap();
    h.remote.fail_on("touch_list");

    h.add(&a.id, 1, "One").await;
    let ids: Vec<String> = h.service.lists().into_iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![a.id.clone(), b.id.clone()]);

    let restarted = ListService::new(
        h.remote.clone(),
        Box::new(h.cache.clone()),
        Arc::new(StaticOwner::signed_in("alice")),
    );
    assert_eq!(restarted.load_from_cache().await.unwrap(), 2);
    let ids: Vec<String> = restarted.lists().into_iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![b.id, a.id.clone()]);
    assert_eq!(restarted.list(&a.id).unwrap().item_count, 1);
}

#[tokio::test]
async fn failed_add_changes_nothing_locally() {
    let h = harness();
    let list = h.list("A").await;
    h.remote.set_fail_all(true);

    let err = h
        .service
        .add_item(&list.id, ItemDraft::new(1, "One"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RemoteUnavailable(_)));
    assert!(h.service.items(&list.id).is_empty());
    assert!(h.cache.items_of(&list.id).is_empty());
    assert_eq!(h.service.list(&list.id).unwrap(), list);
}

#[tokio::test]
async fn cache_write_failure_does_not_fail_the_mutation() {
    let h = harness();
    let list = h.list("A").await;
    h.cache.set_fail_writes(true);

    let item = h.add(&list.id, 1, "One").await;

    assert_eq!(h.service.items(&list.id), vec![item.clone()]);
    assert_eq!(h.remote.peek_items(&list.id), vec![item]);
    assert!(h.cache.items_of(&list.id).is_empty());
}

#[tokio::test]
async fn add_item_enriches_missing_fields() {
    let remote = Arc::new(MemoryRemoteStore::new());
    let lookup = FixedLookup(Ok(MediaMetadata {
        title: "Fight Club".into(),
        release_date: Some(date(1999, 10, 15)),
        year: Some(1999),
        poster_url: Some("/poster.jpg".into()),
        backdrop_url: None,
    }));
    let service = ListService::new(
        remote.clone(),
        Box::new(MemoryCache::new()),
        Arc::new(StaticOwner::signed_in("alice")),
    )
    .with_lookup(Arc::new(lookup));
    let list = service.create_list(NewList::named("A")).await.unwrap();

    let item = service
        .add_item(&list.id, ItemDraft::new(550, "").with_year(2000))
        .await
        .unwrap();

    assert_eq!(item.title, "Fight Club");
    assert_eq!(item.release_date, Some(date(1999, 10, 15)));
    assert_eq!(item.year, Some(2000));
    assert_eq!(item.poster_url.as_deref(), Some("/poster.jpg"));
}

#[tokio::test]
async fn failed_enrichment_still_adds() {
    let remote = Arc::new(MemoryRemoteStore::new());
    let service = ListService::new(
        remote.clone(),
        Box::new(MemoryCache::new()),
        Arc::new(StaticOwner::signed_in("alice")),
    )
    .with_lookup(Arc::new(FixedLookup(Err(Error::RemoteUnavailable(
        "catalog down".into(),
    )))));
    let list = service.create_list(NewList::named("A")).await.unwrap();

    let item = service
        .add_item(&list.id, ItemDraft::new(550, "Fight Club"))
        .await
        .unwrap();
    assert_eq!(item.release_date, None);
    assert_eq!(remote.peek_items(&list.id).len(), 1);
}

#[tokio::test]
async fn blank_title_without_lookup_is_rejected() {
    let h = harness();
    let list = h.list("A").await;
    let err = h
        .service
        .add_item(&list.id, ItemDraft::new(550, " "))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(h.remote.calls("add_item"), 0);
}

// Reorder

async fn five_items(h: &Harness) -> (ListMeta, Vec<ListItem>) {
    let list = h.list("Ranked").await;
    let mut items = Vec::new();
    for (i, title) in ["A", "B", "C", "D", "E"].iter().enumerate() {
        items.push(h.add(&list.id, i as ExternalRef + 1, title).await);
    }
    (list, items)
}

#[tokio::test]
async fn reorder_renumbers_in_given_order() {
    let h = harness();
    let (list, items) = five_items(&h).await;
    let order: Vec<String> = [2, 0, 4, 1, 3]
        .iter()
        .map(|&i| items[i].id.clone())
        .collect();

    let reordered = h.service.reorder_items(&list.id, &order).await.unwrap();

    assert_eq!(reordered.len(), 5);
    assert_eq!(h.titles(&list.id), vec!["C", "A", "E", "B", "D"]);
    assert_eq!(h.sort_orders(&list.id), vec![1, 2, 3, 4, 5]);
    let remote: Vec<String> = h
        .remote
        .peek_items(&list.id)
        .into_iter()
        .map(|i| i.title)
        .collect();
    assert_eq!(remote, vec!["C", "A", "E", "B", "D"]);
    let cached: Vec<String> = h
        .cache
        .items_of(&list.id)
        .into_iter()
        .map(|i| i.title)
        .collect();
    assert_eq!(cached, vec!["C", "A", "E", "B", "D"]);
}

#[tokio::test]
async fn reorder_closes_gaps() {
    let h = harness();
    let (list, items) = five_items(&h).await;
    h.service.remove_item(&list.id, 2).await.unwrap();
    let order: Vec<String> = [4, 3, 2, 0].iter().map(|&i| items[i].id.clone()).collect();

    h.service.reorder_items(&list.id, &order).await.unwrap();

    assert_eq!(h.titles(&list.id), vec!["E", "D", "C", "A"]);
    assert_eq!(h.sort_orders(&list.id), vec![1, 2, 3, 4]);
}

#[parameterized(
    missing_one = { &[0, 1, 2, 3] },
    duplicate = { &[0, 1, 2, 3, 3] },
    extra = { &[0, 1, 2, 3, 4, 4] },
    empty = { &[] },
)]
#[test_macro(tokio::test)]
async fn reorder_rejects_non_permutations(picks: &[usize]) {
    let h = harness();
    let (list, items) = five_items(&h).await;
    let order: Vec<String> = picks.iter().map(|&i| items[i].id.clone()).collect();

    let err = h.service.reorder_items(&list.id, &order).await.unwrap_err();

    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(h.remote.calls("update_item_sort_order"), 0);
    assert_eq!(h.titles(&list.id), vec!["A", "B", "C", "D", "E"]);
}

#[tokio::test]
async fn reorder_rejects_unknown_id() {
    let h = harness();
    let (list, items) = five_items(&h).await;
    let mut order: Vec<String> = items.iter().map(|i| i.id.clone()).collect();
    order[0] = "itm-elsewhere".into();

    let err = h.service.reorder_items(&list.id, &order).await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(h.remote.calls("update_item_sort_order"), 0);
}

#[tokio::test]
async fn reorder_failure_leaves_local_state_untouched() {
    let h = harness();
    let (list, items) = five_items(&h).await;
    let before = h.service.list(&list.id).unwrap();
    h.remote.fail_after("update_item_sort_order", 2);
    let order: Vec<String> = items.iter().rev().map(|i| i.id.clone()).collect();

    let err = h.service.reorder_items(&list.id, &order).await.unwrap_err();

    assert!(matches!(err, Error::RemoteUnavailable(_)));
    assert_eq!(h.titles(&list.id), vec!["A", "B", "C", "D", "E"]);
    assert_eq!(h.service.list(&list.id).unwrap(), before);

    // A reload brings the index in line with what the remote kept.
    h.remote.clear_failures();
    h.service.reload(&list.id).await.unwrap();
    let remote: Vec<ListItem> = h.remote.peek_items(&list.id);
    assert_eq!(h.service.items(&list.id), remote);
}

// Sync

#[tokio::test]
async fn load_from_cache_serves_reads_without_the_remote() {
    let remote = Arc::new(MemoryRemoteStore::new());
    let seeded = MemoryCache::new();
    {
        let seed = ListService::new(
            remote.clone(),
            Box::new(seeded.clone()),
            Arc::new(StaticOwner::signed_in("alice")),
        );
        let list = seed.create_list(NewList::named("Favorites")).await.unwrap();
        seed.add_item(&list.id, ItemDraft::new(550, "Fight Club"))
            .await
            .unwrap();
    }

    let offline = Arc::new(MemoryRemoteStore::new());
    offline.set_fail_all(true);
    let service = ListService::new(
        offline.clone(),
        Box::new(seeded),
        Arc::new(StaticOwner::signed_in("alice")),
    );

    assert_eq!(service.load_from_cache().await.unwrap(), 1);

    let lists = service.lists();
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].name, "Favorites");
    assert_eq!(lists[0].item_count, 1);
    assert_eq!(service.items(&lists[0].id)[0].title, "Fight Club");
    for op in ["fetch_lists", "fetch_lists_summary", "fetch_items", "fetch_list"] {
        assert_eq!(offline.calls(op), 0, "{op}");
    }
}

async fn remote_with_lists(remote: &MemoryRemoteStore) -> (ListMeta, ListMeta) {
    let a = remote.create_list("alice", NewList::named("A")).await.unwrap();
    let b = remote.create_list("alice", NewList::named("B")).await.unwrap();
    remote.create_list("bob", NewList::named("Bob's")).await.unwrap();
    for (i, title) in ["One", "Two", "Three"].iter().enumerate() {
        remote
            .add_item(&a.id, ItemDraft::new(i as ExternalRef + 1, *title), 1)
            .await
            .unwrap();
    }
    (a, b)
}

#[tokio::test]
async fn refresh_all_uses_summary_counts() {
    let h = harness();
    let (a, b) = remote_with_lists(&h.remote).await;

    let report = h.service.refresh_all().await.unwrap();

    assert_eq!(
        report,
        SyncReport {
            lists: 2,
            items: 3,
            used_summary: true
        }
    );
    assert_eq!(h.count(&a.id), 3);
    assert_eq!(h.count(&b.id), 0);
    assert_eq!(h.titles(&a.id), vec!["One", "Two", "Three"]);
    assert_eq!(h.remote.calls("count_items"), 0);
    assert_eq!(h.cache.list(&a.id).unwrap().item_count, 3);
}

#[tokio::test]
async fn refresh_all_falls_back_to_per_list_counts() {
    let h = harness();
    let (a, b) = remote_with_lists(&h.remote).await;
    h.remote.fail_on("fetch_lists_summary");

    let report = h.service.refresh_all().await.unwrap();

    assert!(!report.used_summary);
    assert_eq!(report.lists, 2);
    assert_eq!(h.count(&a.id), 3);
    assert_eq!(h.count(&b.id), 0);
    assert_eq!(h.remote.calls("count_items"), 2);
}

#[tokio::test]
async fn refresh_all_replaces_stale_local_state() {
    let h = harness();
    let stale = h.list("Stale").await;
    h.remote.delete_list(&stale.id).await.unwrap();
    let (a, _) = remote_with_lists(&h.remote).await;

    h.service.refresh_all().await.unwrap();

    assert!(h.service.list(&stale.id).is_none());
    assert!(h.cache.list(&stale.id).is_none());
    assert!(h.service.list(&a.id).is_some());
}

#[tokio::test]
async fn refresh_all_propagates_fetch_failure() {
    let h = harness();
    let list = h.list("Kept").await;
    h.remote.fail_on("fetch_lists_summary");
    h.remote.fail_on("fetch_lists");

    let err = h.service.refresh_all().await.unwrap_err();

    assert!(matches!(err, Error::RemoteUnavailable(_)));
    assert!(h.service.list(&list.id).is_some());
}

#[tokio::test]
async fn reload_purges_list_gone_from_remote() {
    let h = harness();
    let list = h.list("Gone").await;
    h.add(&list.id, 1, "One").await;
    h.remote.delete_list(&list.id).await.unwrap();

    let err = h.service.reload(&list.id).await.unwrap_err();

    assert!(matches!(err, Error::ListNotFound(_)));
    assert!(h.service.list(&list.id).is_none());
    assert!(h.service.items(&list.id).is_empty());
    assert!(h.cache.list(&list.id).is_none());
}

#[tokio::test]
async fn reload_counts_items_and_marks_watched() {
    let h = harness();
    let (a, _) = remote_with_lists(&h.remote).await;
    h.remote.mark_watched("alice", 2);

    let meta = h.service.reload(&a.id).await.unwrap();

    assert_eq!(meta.item_count, 3);
    assert!(h.service.is_watched(&a.id, 2));
    assert!(!h.service.is_watched(&a.id, 1));
}

#[tokio::test]
async fn items_with_watched_uses_joined_endpoint() {
    let h = harness();
    let list = h.list("A").await;
    h.add(&list.id, 550, "Fight Club").await;
    h.add(&list.id, 13, "Forrest Gump").await;
    h.remote.mark_watched("alice", 550);

    let items = h.service.items_with_watched(&list.id).await.unwrap();

    let flags: Vec<(ExternalRef, bool)> = items
        .iter()
        .map(|w| (w.item.external_ref, w.watched))
        .collect();
    assert_eq!(flags, vec![(550, true), (13, false)]);
    assert_eq!(h.remote.calls("batch_watched"), 0);
    assert!(h.service.is_watched(&list.id, 550));
}

#[tokio::test]
async fn items_with_watched_merges_client_side_when_endpoint_is_missing() {
    let remote = Arc::new(MemoryRemoteStore::new());
    let service = ListService::new(
        remote.clone(),
        Box::new(MemoryCache::new()),
        Arc::new(StaticOwner::signed_in("alice")),
    )
    .with_watch_log(remote.clone());
    let list = service.create_list(NewList::named("A")).await.unwrap();
    service
        .add_item(&list.id, ItemDraft::new(550, "Fight Club"))
        .await
        .unwrap();
    service
        .add_item(&list.id, ItemDraft::new(13, "Forrest Gump"))
        .await
        .unwrap();
    remote.mark_watched("alice", 13);
    remote.fail_on("fetch_items_with_watched");

    let items = service.items_with_watched(&list.id).await.unwrap();

    let watched: Vec<bool> = items.iter().map(|w| w.watched).collect();
    assert_eq!(watched, vec![false, true]);
    assert_eq!(remote.calls("batch_watched"), 1);
    assert!(service.is_watched(&list.id, 13));
}

#[tokio::test]
async fn items_with_watched_without_watch_log_reports_unwatched() {
    let h = harness();
    let list = h.list("A").await;
    h.add(&list.id, 550, "Fight Club").await;
    h.remote.mark_watched("alice", 550);
    h.remote.fail_on("fetch_items_with_watched");

    let items = h.service.items_with_watched(&list.id).await.unwrap();

    assert_eq!(items.len(), 1);
    assert!(!items[0].watched);
}

#[tokio::test]
async fn items_with_watched_requires_an_indexed_list() {
    let h = harness();
    let elsewhere = h
        .remote
        .create_list("alice", NewList::named("Elsewhere"))
        .await
        .unwrap();
    h.remote
        .add_item(&elsewhere.id, ItemDraft::new(1, "Heat"), 1)
        .await
        .unwrap();

    let err = h.service.items_with_watched(&elsewhere.id).await.unwrap_err();

    assert!(matches!(err, Error::ListNotFound(_)));
    assert!(h.service.lists().is_empty());
    assert!(h.service.items(&elsewhere.id).is_empty());
    assert!(h.cache.items_of(&elsewhere.id).is_empty());
    assert_eq!(h.remote.calls("fetch_items_with_watched"), 0);
}

// Events

#[tokio::test]
async fn mutations_emit_events() {
    let h = harness();
    let mut events = h.service.subscribe();

    let list = h.list("A").await;
    assert_eq!(events.try_recv().unwrap(), IndexEvent::ListsChanged);

    h.add(&list.id, 1, "One").await;
    assert_eq!(
        events.try_recv().unwrap(),
        IndexEvent::ItemsChanged {
            list_id: list.id.clone()
        }
    );
    assert_eq!(events.try_recv().unwrap(), IndexEvent::ListsChanged);

    h.service.refresh_all().await.unwrap();
    assert_eq!(events.try_recv().unwrap(), IndexEvent::Reloaded);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn failed_mutation_emits_nothing() {
    let h = harness();
    let list = h.list("A").await;
    let mut events = h.service.subscribe();
    h.remote.set_fail_all(true);

    h.service
        .add_item(&list.id, ItemDraft::new(1, "One"))
        .await
        .unwrap_err();
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn concurrent_adds_get_distinct_sort_orders() {
    let h = harness();
    let list = h.list("A").await;

    let (a, b) = tokio::join!(
        h.service.add_item(&list.id, ItemDraft::new(1, "One")),
        h.service.add_item(&list.id, ItemDraft::new(2, "Two")),
    );

    let mut orders = vec![a.unwrap().sort_order, b.unwrap().sort_order];
    orders.sort_unstable();
    assert_eq!(orders, vec![1, 2]);
    assert_eq!(h.count(&list.id), 2);
}
