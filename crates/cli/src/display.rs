// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use reel_core::{ListItem, ListMeta, WatchedItem};

use crate::service::SyncReport;

/// Format a single list line for `lists` output
///
/// ```text
/// * Favorites (2 items) [lst-1a2b3c4d] #classics
/// ```
pub fn format_list_line(list: &ListMeta) -> String {
    let marker = if list.pinned { "*" } else { "-" };
    let noun = if list.item_count == 1 { "item" } else { "items" };
    let mut line = format!(
        "{marker} {} ({} {noun}) [{}]",
        list.name, list.item_count, list.id
    );
    if list.ranked {
        line.push_str(" ranked");
    }
    if let Some(month) = list.themed_month_date {
        line.push_str(&format!(" {}", month.format("%Y-%m")));
    }
    for tag in &list.tags {
        line.push_str(&format!(" #{tag}"));
    }
    line
}

/// Format list details for commands that change one list
pub fn format_list_details(list: &ListMeta) -> String {
    let mut lines = vec![format_list_line(list)];
    if let Some(description) = &list.description {
        lines.push(format!("    {description}"));
    }
    lines.push(format!(
        "    updated {}",
        list.updated_at.format("%Y-%m-%d %H:%M")
    ));
    lines.join("\n")
}

/// Format a single item line: position, title, year, catalog ref
pub fn format_item_line(item: &ListItem) -> String {
    let year = item
        .year
        .or_else(|| item.release_date.map(|d| chrono::Datelike::year(&d)));
    match year {
        Some(year) => format!(
            "{:>3}. {} ({year}) #{}",
            item.sort_order, item.title, item.external_ref
        ),
        None => format!("{:>3}. {} #{}", item.sort_order, item.title, item.external_ref),
    }
}

/// Item line prefixed with a watch checkbox
pub fn format_watched_line(watched: &WatchedItem) -> String {
    let mark = if watched.watched { "x" } else { " " };
    format!("[{mark}] {}", format_item_line(&watched.item))
}

pub fn format_sync_report(report: &SyncReport) -> String {
    let source = if report.used_summary {
        "summary"
    } else {
        "per-list counts"
    };
    format!(
        "Synced {} lists, {} items ({source})",
        report.lists, report.items
    )
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
