// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Partial updates for list metadata.
//!
//! Optional fields that can be reset to empty use [`Patch`], which keeps
//! "not mentioned" apart from "explicitly cleared".

use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::list::{first_of_month, normalize_tags, validate_name, ListMeta};

/// Tri-state update for an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// Leave the stored value alone.
    #[default]
    Unchanged,
    /// Replace the stored value.
    Set(T),
    /// Reset the stored value to empty.
    Clear,
}

impl<T> Patch<T> {
    /// `Some` becomes [`Patch::Set`], `None` becomes [`Patch::Clear`].
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Set(v),
            None => Patch::Clear,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, Patch::Unchanged)
    }

    /// Writes the patch into `target`.
    pub fn apply(self, target: &mut Option<T>) {
        match self {
            Patch::Unchanged => {}
            Patch::Set(v) => *target = Some(v),
            Patch::Clear => *target = None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Patch<U> {
        match self {
            Patch::Unchanged => Patch::Unchanged,
            Patch::Set(v) => Patch::Set(f(v)),
            Patch::Clear => Patch::Clear,
        }
    }

    /// The wire form: the value plus whether it should be applied.
    pub fn into_wire(self) -> (Option<T>, bool) {
        match self {
            Patch::Unchanged => (None, false),
            Patch::Set(v) => (Some(v), true),
            Patch::Clear => (None, true),
        }
    }

    /// Inverse of [`Patch::into_wire`].
    pub fn from_wire(value: Option<T>, apply: bool) -> Self {
        if apply {
            Patch::from_option(value)
        } else {
            Patch::Unchanged
        }
    }
}

/// Changes to a list's metadata. Fields left at their default are untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPatch {
    pub name: Option<String>,
    pub description: Patch<String>,
    pub ranked: Option<bool>,
    pub tags: Option<BTreeSet<String>>,
    pub themed_month_date: Patch<NaiveDate>,
    pub pinned: Option<bool>,
    /// Explicit modification time; the store picks one when absent.
    pub updated_at: Option<DateTime<Utc>>,
}

impl ListPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: Patch<String>) -> Self {
        self.description = description;
        self
    }

    pub fn ranked(mut self, ranked: bool) -> Self {
        self.ranked = Some(ranked);
        self
    }

    pub fn tags(mut self, tags: BTreeSet<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn themed_month(mut self, month: Patch<NaiveDate>) -> Self {
        self.themed_month_date = month;
        self
    }

    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = Some(pinned);
        self
    }

    pub fn touched_at(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = Some(at);
        self
    }

    /// True when the patch would change nothing but the timestamp.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_unchanged()
            && self.ranked.is_none()
            && self.tags.is_none()
            && self.themed_month_date.is_unchanged()
            && self.pinned.is_none()
    }

    /// Validates the name and normalizes month and tags.
    pub fn normalized(mut self) -> Result<Self> {
        if self.is_empty() {
            return Err(Error::InvalidArgument("update changes nothing".into()));
        }
        if let Some(name) = self.name.take() {
            self.name = Some(validate_name(&name)?);
        }
        self.themed_month_date = self.themed_month_date.map(first_of_month);
        self.tags = self.tags.map(normalize_tags);
        Ok(self)
    }

    /// Applies the patch to `meta`, stamping `updated_at` with `now` unless
    /// the patch carries its own time.
    pub fn apply_to(self, meta: &mut ListMeta, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            meta.name = name;
        }
        self.description.apply(&mut meta.description);
        if let Some(ranked) = self.ranked {
            meta.ranked = ranked;
        }
        if let Some(tags) = self.tags {
            meta.tags = tags;
        }
        self.themed_month_date.apply(&mut meta.themed_month_date);
        if let Some(pinned) = self.pinned {
            meta.pinned = pinned;
        }
        meta.updated_at = self.updated_at.unwrap_or(now);
    }
}

#[cfg(test)]
#[path = "patch_tests.rs"]
mod tests;
