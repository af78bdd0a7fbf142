// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use std::collections::BTreeSet;

use super::*;
use chrono::{NaiveDate, TimeZone, Utc};
use yare::parameterized;

fn test_list(name: &str, count: usize) -> ListMeta {
    let at = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
    ListMeta {
        id: "lst-1a2b3c4d".to_string(),
        owner_id: "alice".to_string(),
        name: name.to_string(),
        description: None,
        created_at: at,
        updated_at: at,
        item_count: count,
        pinned: false,
        ranked: false,
        tags: BTreeSet::new(),
        themed_month_date: None,
    }
}

fn test_item(title: &str, year: Option<i32>) -> ListItem {
    ListItem {
        id: "itm-1".to_string(),
        list_id: "lst-1a2b3c4d".to_string(),
        external_ref: 550,
        title: title.to_string(),
        poster_url: None,
        backdrop_url: None,
        year,
        release_date: None,
        added_at: Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap(),
        sort_order: 1,
    }
}

#[parameterized(
    empty = { 0, "- Favorites (0 items) [lst-1a2b3c4d]" },
    one = { 1, "- Favorites (1 item) [lst-1a2b3c4d]" },
    many = { 12, "- Favorites (12 items) [lst-1a2b3c4d]" },
)]
fn list_line_counts(count: usize, expected: &str) {
    assert_eq!(format_list_line(&test_list("Favorites", count)), expected);
}

#[test]
fn list_line_shows_pin_month_and_tags() {
    let mut list = test_list("October", 3);
    list.pinned = true;
    list.ranked = true;
    list.themed_month_date = NaiveDate::from_ymd_opt(2024, 10, 1);
    list.tags = BTreeSet::from(["horror".to_string(), "classics".to_string()]);
    assert_eq!(
        format_list_line(&list),
        "* October (3 items) [lst-1a2b3c4d] ranked 2024-10 #classics #horror"
    );
}

#[test]
fn list_details_include_description() {
    let mut list = test_list("Favorites", 2);
    list.description = Some("all-time best".into());
    let details = format_list_details(&list);
    let lines: Vec<&str> = details.lines().collect();
    assert_eq!(lines[1], "    all-time best");
    assert_eq!(lines[2], "    updated 2024-01-10 12:00");
}

#[test]
fn item_line_with_year() {
    assert_eq!(
        format_item_line(&test_item("Fight Club", Some(1999))),
        "  1. Fight Club (1999) #550"
    );
}

#[test]
fn item_line_falls_back_to_release_year() {
    let mut item = test_item("Fight Club", None);
    item.release_date = NaiveDate::from_ymd_opt(1999, 10, 15);
    assert_eq!(format_item_line(&item), "  1. Fight Club (1999) #550");
}

#[test]
fn item_line_without_year() {
    assert_eq!(
        format_item_line(&test_item("Fight Club", None)),
        "  1. Fight Club #550"
    );
}

#[test]
fn watched_line_checks_box() {
    let watched = WatchedItem {
        item: test_item("Fight Club", None),
        watched: true,
    };
    assert_eq!(format_watched_line(&watched), "[x]   1. Fight Club #550");
}

#[test]
fn sync_report_names_count_source() {
    let report = SyncReport {
        lists: 2,
        items: 5,
        used_summary: false,
    };
    assert_eq!(
        format_sync_report(&report),
        "Synced 2 lists, 5 items (per-list counts)"
    );
}
