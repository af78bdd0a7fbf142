// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Domain types for media lists.
//!
//! A [`ListMeta`] is a named, owned collection; a [`ListItem`] references one
//! entry in an external media catalog and carries its position in the list.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::error::{Error, Result};

/// Identifier of an entry in the external media catalog.
pub type ExternalRef = i64;

/// Metadata for one list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListMeta {
    /// Server-assigned identifier.
    pub id: String,
    /// Owner of the list.
    pub owner_id: String,
    /// Display name, never empty.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Last modification, drives recency ordering.
    pub updated_at: DateTime<Utc>,
    /// Number of items, cached for display.
    pub item_count: usize,
    pub pinned: bool,
    /// Whether the list's order is meaningful (a ranking).
    pub ranked: bool,
    pub tags: BTreeSet<String>,
    /// Month the list is themed around, always the first day of that month.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub themed_month_date: Option<NaiveDate>,
}

impl ListMeta {
    /// Display ordering: pinned lists first, then most recently updated.
    ///
    /// Falls back to the id so the order is total.
    pub fn display_cmp(&self, other: &ListMeta) -> Ordering {
        other
            .pinned
            .cmp(&self.pinned)
            .then_with(|| other.updated_at.cmp(&self.updated_at))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// One media entry within a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// Server-assigned identifier, distinct from `external_ref`.
    pub id: String,
    pub list_id: String,
    pub external_ref: ExternalRef,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backdrop_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
    pub added_at: DateTime<Utc>,
    /// Position within the list, starting at 1. Unique per list.
    pub sort_order: u32,
}

impl ListItem {
    /// Sort order for an item appended to `items`.
    ///
    /// Removals never renumber, so this is `max + 1` rather than `len + 1`.
    pub fn next_sort_order<'a, I>(items: I) -> u32
    where
        I: IntoIterator<Item = &'a ListItem>,
    {
        items
            .into_iter()
            .map(|item| item.sort_order)
            .max()
            .map_or(1, |max| max.saturating_add(1))
    }
}

/// An item paired with the owner's watch status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchedItem {
    pub item: ListItem,
    pub watched: bool,
}

/// Fields supplied when creating a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewList {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub ranked: bool,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub themed_month_date: Option<NaiveDate>,
}

impl NewList {
    /// Creates a plain list definition with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        NewList {
            name: name.into(),
            ..NewList::default()
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Checks the name and normalizes the themed month.
    pub fn normalized(mut self) -> Result<Self> {
        self.name = validate_name(&self.name)?;
        self.themed_month_date = self.themed_month_date.map(first_of_month);
        self.tags = normalize_tags(self.tags);
        Ok(self)
    }
}

/// Fields supplied when adding an item to a list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub external_ref: ExternalRef,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<NaiveDate>,
}

impl ItemDraft {
    pub fn new(external_ref: ExternalRef, title: impl Into<String>) -> Self {
        ItemDraft {
            external_ref,
            title: title.into(),
            ..ItemDraft::default()
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_release_date(mut self, date: NaiveDate) -> Self {
        self.release_date = Some(date);
        self
    }
}

/// Trims a list name, rejecting names that are empty afterwards.
pub fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument("list name cannot be empty".into()));
    }
    Ok(trimmed.to_string())
}

/// Drops blank tags and trims the rest.
pub fn normalize_tags(tags: BTreeSet<String>) -> BTreeSet<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Truncates a date to the first day of its month.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

/// Parses a themed month given as `YYYY-MM` or a full `YYYY-MM-DD` date.
pub fn parse_month(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    let parsed = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d"))
        .map_err(|_| Error::InvalidArgument(format!("invalid month '{value}', expected YYYY-MM")))?;
    Ok(first_of_month(parsed))
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
