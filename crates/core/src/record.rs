// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Flat storage records for the SQLite tables.
//!
//! Records hold exactly what a row holds (text timestamps, integer flags,
//! tags as JSON). Converting back to the domain model re-validates every
//! field and reports [`Error::CorruptedData`] instead of guessing.

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::list::{ListItem, ListMeta};

/// Stored form of a [`ListMeta`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRecord {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub item_count: i64,
    pub pinned: bool,
    pub ranked: bool,
    /// JSON array of tags.
    pub tags: String,
    /// `YYYY-MM-DD`.
    pub themed_month_date: Option<String>,
}

/// Stored form of a [`ListItem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub id: String,
    pub list_id: String,
    pub external_ref: i64,
    pub title: String,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub year: Option<i64>,
    pub release_date: Option<String>,
    pub added_at: String,
    pub sort_order: i64,
}

const DATE_FORMAT: &str = "%Y-%m-%d";

impl ListRecord {
    pub fn from_meta(meta: &ListMeta) -> Self {
        ListRecord {
            id: meta.id.clone(),
            owner_id: meta.owner_id.clone(),
            name: meta.name.clone(),
            description: meta.description.clone(),
            created_at: meta.created_at.to_rfc3339(),
            updated_at: meta.updated_at.to_rfc3339(),
            item_count: i64::try_from(meta.item_count).unwrap_or(i64::MAX),
            pinned: meta.pinned,
            ranked: meta.ranked,
            tags: encode_tags(&meta.tags),
            themed_month_date: meta
                .themed_month_date
                .map(|d| d.format(DATE_FORMAT).to_string()),
        }
    }

    pub fn into_meta(self) -> Result<ListMeta> {
        if self.name.trim().is_empty() {
            return Err(corrupted(&format!("list {} has an empty name", self.id)));
        }
        let item_count = usize::try_from(self.item_count).map_err(|_| {
            corrupted(&format!("list {} has item_count {}", self.id, self.item_count))
        })?;
        Ok(ListMeta {
            created_at: parse_timestamp(&self.created_at, "created_at")?,
            updated_at: parse_timestamp(&self.updated_at, "updated_at")?,
            tags: decode_tags(&self.tags)?,
            themed_month_date: parse_date_opt(self.themed_month_date, "themed_month_date")?,
            item_count,
            id: self.id,
            owner_id: self.owner_id,
            name: self.name,
            description: self.description,
            pinned: self.pinned,
            ranked: self.ranked,
        })
    }
}

impl ItemRecord {
    pub fn from_item(item: &ListItem) -> Self {
        ItemRecord {
            id: item.id.clone(),
            list_id: item.list_id.clone(),
            external_ref: item.external_ref,
            title: item.title.clone(),
            poster_url: item.poster_url.clone(),
            backdrop_url: item.backdrop_url.clone(),
            year: item.year.map(i64::from),
            release_date: item.release_date.map(|d| d.format(DATE_FORMAT).to_string()),
            added_at: item.added_at.to_rfc3339(),
            sort_order: i64::from(item.sort_order),
        }
    }

    pub fn into_item(self) -> Result<ListItem> {
        let sort_order = u32::try_from(self.sort_order)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                corrupted(&format!("item {} has sort_order {}", self.id, self.sort_order))
            })?;
        let year = match self.year {
            None => None,
            Some(y) => Some(
                i32::try_from(y)
                    .map_err(|_| corrupted(&format!("item {} has year {y}", self.id)))?,
            ),
        };
        Ok(ListItem {
            added_at: parse_timestamp(&self.added_at, "added_at")?,
            release_date: parse_date_opt(self.release_date, "release_date")?,
            sort_order,
            year,
            id: self.id,
            list_id: self.list_id,
            external_ref: self.external_ref,
            title: self.title,
            poster_url: self.poster_url,
            backdrop_url: self.backdrop_url,
        })
    }
}

fn corrupted(detail: &str) -> Error {
    Error::CorruptedData(detail.to_string())
}

fn encode_tags(tags: &BTreeSet<String>) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

fn decode_tags(value: &str) -> Result<BTreeSet<String>> {
    serde_json::from_str(value).map_err(|_| corrupted(&format!("invalid tags '{value}'")))
}

/// Parse an RFC3339 timestamp from storage.
pub(crate) fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| corrupted(&format!("invalid timestamp '{value}' in column '{column}'")))
}

fn parse_date_opt(value: Option<String>, column: &str) -> Result<Option<NaiveDate>> {
    match value {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, DATE_FORMAT)
            .map(Some)
            .map_err(|_| corrupted(&format!("invalid date '{s}' in column '{column}'"))),
    }
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
