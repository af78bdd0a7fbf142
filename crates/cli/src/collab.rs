// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Collaborators the list engine consumes but does not implement.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;

use reel_core::{ExternalRef, ItemDraft, Result};

/// Catalog metadata for one external ref.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaMetadata {
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
}

impl MediaMetadata {
    /// Fills the draft's empty optional fields. Never overwrites what the
    /// caller supplied.
    pub fn enrich(self, draft: &mut ItemDraft) {
        if draft.release_date.is_none() {
            draft.release_date = self.release_date;
        }
        if draft.year.is_none() {
            draft.year = self.year;
        }
        if draft.poster_url.is_none() {
            draft.poster_url = self.poster_url;
        }
        if draft.backdrop_url.is_none() {
            draft.backdrop_url = self.backdrop_url;
        }
        if draft.title.trim().is_empty() {
            draft.title = self.title;
        }
    }
}

/// Third-party catalog lookups.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    async fn lookup(&self, external_ref: ExternalRef) -> Result<MediaMetadata>;
}

/// The owner's watch history.
#[async_trait]
pub trait WatchLog: Send + Sync {
    /// The subset of `external_refs` the owner has watched.
    async fn batch_watched(
        &self,
        owner_id: &str,
        external_refs: &[ExternalRef],
    ) -> Result<HashSet<ExternalRef>>;
}

/// Who is signed in.
pub trait OwnerIdentity: Send + Sync {
    /// `None` when nobody is signed in.
    fn current_owner_id(&self) -> Option<String>;
}

/// Fixed owner, typically read from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticOwner(Option<String>);

impl StaticOwner {
    pub fn new(owner_id: Option<String>) -> Self {
        StaticOwner(owner_id)
    }

    pub fn signed_in(owner_id: impl Into<String>) -> Self {
        StaticOwner(Some(owner_id.into()))
    }

    pub fn anonymous() -> Self {
        StaticOwner(None)
    }
}

impl OwnerIdentity for StaticOwner {
    fn current_owner_id(&self) -> Option<String> {
        self.0.clone()
    }
}

#[cfg(test)]
#[path = "collab_tests.rs"]
mod tests;
