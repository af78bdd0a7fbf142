// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wire shapes exchanged with the remote store.
//!
//! Rows are decoded loosely by serde and then checked on conversion into the
//! domain model, so a malformed response fails as a whole instead of leaking
//! half-valid values into the cache.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::list::{first_of_month, ListItem, ListMeta, WatchedItem};
use crate::patch::{ListPatch, Patch};

/// A list as it travels over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListRow {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Absent or stale on plain fetches; exact on summary fetches.
    #[serde(default)]
    pub item_count: Option<i64>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub ranked: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub themed_month_date: Option<NaiveDate>,
}

impl ListRow {
    pub fn from_meta(meta: &ListMeta) -> Self {
        ListRow {
            id: meta.id.clone(),
            owner_id: meta.owner_id.clone(),
            name: meta.name.clone(),
            description: meta.description.clone(),
            created_at: meta.created_at,
            updated_at: meta.updated_at,
            item_count: i64::try_from(meta.item_count).ok(),
            pinned: meta.pinned,
            ranked: meta.ranked,
            tags: meta.tags.iter().cloned().collect(),
            themed_month_date: meta.themed_month_date,
        }
    }

    /// Converts into the domain model, rejecting rows that break its rules.
    pub fn into_meta(self) -> Result<ListMeta> {
        if self.id.is_empty() {
            return Err(decode_error("list row without id"));
        }
        if self.name.trim().is_empty() {
            return Err(decode_error(&format!("list {} has an empty name", self.id)));
        }
        let item_count = match self.item_count {
            None => 0,
            Some(n) => usize::try_from(n).map_err(|_| {
                decode_error(&format!("list {} has item_count {n}", self.id))
            })?,
        };
        Ok(ListMeta {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name,
            description: self.description,
            created_at: self.created_at,
            updated_at: self.updated_at,
            item_count,
            pinned: self.pinned,
            ranked: self.ranked,
            tags: self.tags.into_iter().collect::<BTreeSet<_>>(),
            themed_month_date: self.themed_month_date.map(first_of_month),
        })
    }
}

/// An item as it travels over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRow {
    pub id: String,
    pub list_id: String,
    pub external_ref: i64,
    pub title: String,
    #[serde(default)]
    pub poster_url: Option<String>,
    #[serde(default)]
    pub backdrop_url: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    pub added_at: DateTime<Utc>,
    pub sort_order: i64,
}

impl ItemRow {
    pub fn from_item(item: &ListItem) -> Self {
        ItemRow {
            id: item.id.clone(),
            list_id: item.list_id.clone(),
            external_ref: item.external_ref,
            title: item.title.clone(),
            poster_url: item.poster_url.clone(),
            backdrop_url: item.backdrop_url.clone(),
            year: item.year,
            release_date: item.release_date,
            added_at: item.added_at,
            sort_order: i64::from(item.sort_order),
        }
    }

    pub fn into_item(self) -> Result<ListItem> {
        if self.id.is_empty() || self.list_id.is_empty() {
            return Err(decode_error("item row without id or list id"));
        }
        let sort_order = u32::try_from(self.sort_order)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                decode_error(&format!(
                    "item {} has sort_order {}",
                    self.id, self.sort_order
                ))
            })?;
        Ok(ListItem {
            id: self.id,
            list_id: self.list_id,
            external_ref: self.external_ref,
            title: self.title,
            poster_url: self.poster_url,
            backdrop_url: self.backdrop_url,
            year: self.year,
            release_date: self.release_date,
            added_at: self.added_at,
            sort_order,
        })
    }
}

/// An item row joined with the owner's watch status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedRow {
    #[serde(flatten)]
    pub item: ItemRow,
    #[serde(default)]
    pub watched: bool,
}

impl WatchedRow {
    pub fn into_watched(self) -> Result<WatchedItem> {
        Ok(WatchedItem {
            item: self.item.into_item()?,
            watched: self.watched,
        })
    }
}

/// A [`ListPatch`] on the wire.
///
/// Clearable fields travel as a value plus an `apply_*` flag, so `null`
/// with the flag set means "clear" and a missing flag means "unchanged".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListPatchRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub apply_description: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub themed_month_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub apply_themed_month_date: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl ListPatchRow {
    pub fn from_patch(patch: ListPatch) -> Self {
        let (description, apply_description) = patch.description.into_wire();
        let (themed_month_date, apply_themed_month_date) = patch.themed_month_date.into_wire();
        ListPatchRow {
            name: patch.name,
            description,
            apply_description,
            ranked: patch.ranked,
            tags: patch.tags.map(|t| t.into_iter().collect()),
            themed_month_date,
            apply_themed_month_date,
            pinned: patch.pinned,
            updated_at: patch.updated_at,
        }
    }

    pub fn into_patch(self) -> ListPatch {
        ListPatch {
            name: self.name,
            description: Patch::from_wire(self.description, self.apply_description),
            ranked: self.ranked,
            tags: self.tags.map(|t| t.into_iter().collect()),
            themed_month_date: Patch::from_wire(
                self.themed_month_date,
                self.apply_themed_month_date,
            ),
            pinned: self.pinned,
            updated_at: self.updated_at,
        }
    }
}

fn decode_error(detail: &str) -> Error {
    Error::RemoteUnavailable(format!("malformed response: {detail}"))
}

/// Decodes a batch of list rows; one bad row fails the batch.
pub fn decode_lists(rows: Vec<ListRow>) -> Result<Vec<ListMeta>> {
    rows.into_iter().map(ListRow::into_meta).collect()
}

/// Decodes a batch of item rows; one bad row fails the batch.
pub fn decode_items(rows: Vec<ItemRow>) -> Result<Vec<ListItem>> {
    rows.into_iter().map(ItemRow::into_item).collect()
}

#[cfg(test)]
#[path = "dto_tests.rs"]
mod tests;
