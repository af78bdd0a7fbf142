// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol messages between the list engine and the remote store.
//!
//! Every client message carries a `request_id`; the server answers each one
//! with exactly one message echoing that id. Responses may arrive interleaved
//! with unrelated frames, so clients match on the id rather than on order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dto::{ItemRow, ListPatchRow, ListRow, WatchedRow};
use crate::list::{ExternalRef, ItemDraft, NewList};

/// Operations the remote store understands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Create a list; the server assigns id and timestamps.
    CreateList { owner_id: String, list: NewList },

    /// Apply a partial update to a list.
    UpdateList { id: String, patch: ListPatchRow },

    /// Delete a list and all of its items.
    DeleteList { id: String },

    /// Insert an item. `sort_order` is the client's expectation; the server
    /// never assigns a value at or below its own current maximum.
    AddItem {
        list_id: String,
        draft: ItemDraft,
        sort_order: u32,
    },

    RemoveItem { item_id: String },

    UpdateItemSortOrder { item_id: String, sort_order: u32 },

    /// Set a list's `updated_at`.
    TouchList { id: String, at: DateTime<Utc> },

    FetchList { id: String },

    /// All lists for an owner. Item counts may be stale.
    FetchLists { owner_id: String },

    FetchItems { list_id: String },

    CountItems { list_id: String },

    /// All lists for an owner with exact item counts, in one round trip.
    FetchListsSummary { owner_id: String },

    /// A list's items joined with the owner's watch status.
    FetchItemsWithWatched { list_id: String, owner_id: String },

    /// Which of the given refs the owner has watched.
    BatchWatched {
        owner_id: String,
        external_refs: Vec<ExternalRef>,
    },

    /// Record that the owner watched a title.
    MarkWatched {
        owner_id: String,
        external_ref: ExternalRef,
    },

    /// Keepalive.
    Ping { id: u64 },
}

/// Machine-readable error classes carried by [`Response::Error`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    AuthenticationRequired,
    ListNotFound,
    ItemNotFound,
    ItemAlreadyExists,
    InvalidArgument,
    /// The endpoint is not offered by this server.
    Unsupported,
    Internal,
}

/// Server replies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    List { list: ListRow },
    Lists { lists: Vec<ListRow> },
    Item { item: ItemRow },
    Items { items: Vec<ItemRow> },
    WatchedItems { items: Vec<WatchedRow> },
    Count { count: u64 },
    Watched { external_refs: Vec<ExternalRef> },
    Ok,
    Pong { id: u64 },
    Error { code: ErrorCode, message: String },
}

impl Response {
    /// Name of the variant, for error messages about unexpected replies.
    pub fn kind(&self) -> &'static str {
        match self {
            Response::List { .. } => "list",
            Response::Lists { .. } => "lists",
            Response::Item { .. } => "item",
            Response::Items { .. } => "items",
            Response::WatchedItems { .. } => "watched_items",
            Response::Count { .. } => "count",
            Response::Watched { .. } => "watched",
            Response::Ok => "ok",
            Response::Pong { .. } => "pong",
            Response::Error { .. } => "error",
        }
    }

    /// Creates an Error response.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Response::Error {
            code,
            message: message.into(),
        }
    }
}

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientMessage {
    pub request_id: u64,
    pub request: Request,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerMessage {
    pub request_id: u64,
    pub response: Response,
}

impl ClientMessage {
    pub fn new(request_id: u64, request: Request) -> Self {
        ClientMessage {
            request_id,
            request,
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    pub fn new(request_id: u64, response: Response) -> Self {
        ServerMessage {
            request_id,
            response,
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
