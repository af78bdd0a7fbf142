// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Server state management.
//!
//! Wraps the canonical database and answers protocol requests against it.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use reel_core::dto::{ItemRow, ListRow, WatchedRow};
use reel_core::id::{generate_unique_id, ITEM_PREFIX, LIST_PREFIX};
use reel_core::protocol::{ErrorCode, Request, Response};
use reel_core::{
    Database, Error, ItemDraft, ItemRecord, ListItem, ListMeta, ListRecord,
    NewList, Result, Stamper,
};

/// Shared server state containing the canonical database.
#[derive(Clone)]
pub struct ServerState {
    inner: Arc<ServerStateInner>,
}

struct ServerStateInner {
    /// The canonical database (one writer at a time).
    db: Mutex<Database>,
    /// Timestamps for created rows.
    stamper: Stamper,
    /// Answer the summary and joined-watched endpoints with `Unsupported`.
    legacy: bool,
}

impl ServerState {
    /// Creates a server state with its database in the given directory.
    pub fn new(data_dir: &Path, legacy: bool) -> Result<Self> {
        let db = Database::open(&data_dir.join("lists.db"))?;
        Ok(Self::with_database(db, legacy))
    }

    /// Creates a server state backed by an in-memory database.
    pub fn in_memory(legacy: bool) -> Result<Self> {
        Ok(Self::with_database(Database::open_in_memory()?, legacy))
    }

    fn with_database(db: Database, legacy: bool) -> Self {
        ServerState {
            inner: Arc::new(ServerStateInner {
                db: Mutex::new(db),
                stamper: Stamper::system(),
                legacy,
            }),
        }
    }

    /// Answers one request. Failures become [`Response::Error`].
    pub async fn handle(&self, request: Request) -> Response {
        if self.inner.legacy {
            if let Some(name) = optimized_endpoint(&request) {
                debug!(endpoint = name, "legacy mode, refusing");
                return Response::error(
                    ErrorCode::Unsupported,
                    format!("{name} is not supported by this server"),
                );
            }
        }
        if let Request::Ping { id } = request {
            return Response::Pong { id };
        }

        let db = self.inner.db.lock().await;
        match self.apply(&db, request) {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "request failed");
                Response::error(e.code(), detail(e))
            }
        }
    }

    fn apply(&self, db: &Database, request: Request) -> Result<Response> {
        match request {
            Request::CreateList { owner_id, list } => {
                let meta = self.create_list(db, &owner_id, list)?;
                Ok(list_response(&meta))
            }
            Request::UpdateList { id, patch } => {
                let mut meta = load_list(db, &id)?;
                let patch = patch.into_patch().normalized()?;
                patch.apply_to(&mut meta, self.inner.stamper.now());
                db.upsert_list(&ListRecord::from_meta(&meta))?;
                Ok(list_response(&meta))
            }
            Request::DeleteList { id } => {
                if !db.delete_list(&id)? {
                    return Err(Error::ListNotFound(id));
                }
                Ok(Response::Ok)
            }
            Request::AddItem {
                list_id,
                draft,
                sort_order,
            } => {
                let item = self.add_item(db, &list_id, draft, sort_order)?;
                Ok(Response::Item {
                    item: ItemRow::from_item(&item),
                })
            }
            Request::RemoveItem { item_id } => {
                if !db.delete_item(&item_id)? {
                    return Err(Error::ItemNotFound(item_id));
                }
                Ok(Response::Ok)
            }
            Request::UpdateItemSortOrder {
                item_id,
                sort_order,
            } => {
                if sort_order == 0 {
                    return Err(Error::InvalidArgument("sort_order must be positive".into()));
                }
                if !db.set_item_sort_order(&item_id, i64::from(sort_order))? {
                    return Err(Error::ItemNotFound(item_id));
                }
                Ok(Response::Ok)
            }
            Request::TouchList { id, at } => {
                if !db.set_list_updated_at(&id, &at.to_rfc3339())? {
                    return Err(Error::ListNotFound(id));
                }
                Ok(Response::Ok)
            }
            Request::FetchList { id } => {
                let mut meta = load_list(db, &id)?;
                meta.item_count = count(db, &id)?;
                Ok(list_response(&meta))
            }
            Request::FetchLists { owner_id } => {
                lists_response(db.lists_for_owner(&require_owner(&owner_id)?)?)
            }
            Request::FetchItems { list_id } => {
                load_list(db, &list_id)?;
                let items = db
                    .items_for_list(&list_id)?
                    .into_iter()
                    .map(|r| r.into_item().map(|i| ItemRow::from_item(&i)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Response::Items { items })
            }
            Request::CountItems { list_id } => {
                load_list(db, &list_id)?;
                Ok(Response::Count {
                    count: u64::try_from(db.count_items(&list_id)?).unwrap_or(0),
                })
            }
            Request::FetchListsSummary { owner_id } => {
                lists_response(db.lists_summary(&require_owner(&owner_id)?)?)
            }
            Request::FetchItemsWithWatched { list_id, owner_id } => {
                load_list(db, &list_id)?;
                let items = db
                    .items_with_watched(&list_id, &require_owner(&owner_id)?)?
                    .into_iter()
                    .map(|(record, watched)| {
                        record.into_item().map(|item| WatchedRow {
                            item: ItemRow::from_item(&item),
                            watched,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Response::WatchedItems { items })
            }
            Request::BatchWatched {
                owner_id,
                external_refs,
            } => Ok(Response::Watched {
                external_refs: db.watched_among(&require_owner(&owner_id)?, &external_refs)?,
            }),
            Request::MarkWatched {
                owner_id,
                external_ref,
            } => {
                let owner_id = require_owner(&owner_id)?;
                let now = self.inner.stamper.now();
                db.mark_watched(&owner_id, external_ref, &now.to_rfc3339())?;
                Ok(Response::Ok)
            }
            Request::Ping { id } => Ok(Response::Pong { id }),
        }
    }

    fn create_list(&self, db: &Database, owner_id: &str, list: NewList) -> Result<ListMeta> {
        let owner_id = require_owner(owner_id)?;
        let list = list.normalized()?;
        let now = self.inner.stamper.now();
        let id = generate_unique_id(LIST_PREFIX, &format!("{owner_id}/{}", list.name), &now, |c| {
            matches!(db.get_list(c), Ok(Some(_)))
        });
        let meta = ListMeta {
            id,
            owner_id,
            name: list.name,
            description: list.description,
            created_at: now,
            updated_at: now,
            item_count: 0,
            pinned: false,
            ranked: list.ranked,
            tags: list.tags,
            themed_month_date: list.themed_month_date,
        };
        db.upsert_list(&ListRecord::from_meta(&meta))?;
        debug!(list_id = %meta.id, "created list");
        Ok(meta)
    }

    fn add_item(
        &self,
        db: &Database,
        list_id: &str,
        draft: ItemDraft,
        requested: u32,
    ) -> Result<ListItem> {
        load_list(db, list_id)?;
        if draft.title.trim().is_empty() {
            return Err(Error::InvalidArgument("item title cannot be empty".into()));
        }
        if db.find_item_by_ref(list_id, draft.external_ref)?.is_some() {
            return Err(Error::item_exists(list_id, draft.external_ref));
        }

        let next = u32::try_from(db.max_sort_order(list_id)?)
            .unwrap_or(u32::MAX)
            .saturating_add(1);
        let now = self.inner.stamper.now();
        let id = generate_unique_id(
            ITEM_PREFIX,
            &format!("{list_id}/{}", draft.external_ref),
            &now,
            |c| matches!(db.get_item(c), Ok(Some(_))),
        );
        let item = ListItem {
            id,
            list_id: list_id.to_string(),
            external_ref: draft.external_ref,
            title: draft.title,
            poster_url: draft.poster_url,
            backdrop_url: draft.backdrop_url,
            year: draft.year,
            release_date: draft.release_date,
            added_at: now,
            sort_order: requested.max(next),
        };
        db.upsert_item(&ItemRecord::from_item(&item))?;
        debug!(list_id, item_id = %item.id, sort_order = item.sort_order, "added item");
        Ok(item)
    }
}

/// Endpoints a legacy server does not offer.
fn optimized_endpoint(request: &Request) -> Option<&'static str> {
    match request {
        Request::FetchListsSummary { .. } => Some("fetch_lists_summary"),
        Request::FetchItemsWithWatched { .. } => Some("fetch_items_with_watched"),
        _ => None,
    }
}

fn require_owner(owner_id: &str) -> Result<String> {
    let owner_id = owner_id.trim();
    if owner_id.is_empty() {
        return Err(Error::AuthenticationRequired);
    }
    Ok(owner_id.to_string())
}

fn load_list(db: &Database, id: &str) -> Result<ListMeta> {
    db.get_list(id)?
        .ok_or_else(|| Error::ListNotFound(id.to_string()))?
        .into_meta()
}

fn count(db: &Database, list_id: &str) -> Result<usize> {
    let count = db.count_items(list_id)?;
    usize::try_from(count).map_err(|_| Error::CorruptedData(format!("negative count {count}")))
}

fn list_response(meta: &ListMeta) -> Response {
    Response::List {
        list: ListRow::from_meta(meta),
    }
}

fn lists_response(records: Vec<ListRecord>) -> Result<Response> {
    let lists = records
        .into_iter()
        .map(|r| r.into_meta().map(|m| ListRow::from_meta(&m)))
        .collect::<Result<Vec<_>>>()?;
    Ok(Response::Lists { lists })
}

/// The message carried on the wire: the payload of typed errors, so the
/// client can rebuild them without doubling the prefix.
fn detail(e: Error) -> String {
    match e {
        Error::ListNotFound(m)
        | Error::ItemNotFound(m)
        | Error::ItemAlreadyExists(m)
        | Error::InvalidArgument(m) => m,
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
