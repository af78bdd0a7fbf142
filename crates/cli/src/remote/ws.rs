// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! [`RemoteStore`] over a WebSocket [`Transport`].

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use reel_core::dto::{decode_items, decode_lists, ListPatchRow};
use reel_core::protocol::{ClientMessage, Request, Response};
use reel_core::{
    Error, ExternalRef, ItemDraft, ListItem, ListMeta, ListPatch, NewList, Result, WatchedItem,
};

use super::transport::{Transport, TransportError, WebSocketTransport};
use super::RemoteStore;
use crate::collab::WatchLog;
use crate::config::RemoteConfig;

/// Connection settings for [`WsRemoteStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectConfig {
    pub url: String,
    /// Connection attempts before giving up.
    pub max_retries: u32,
    /// First backoff delay (milliseconds); doubles on every failure.
    pub initial_delay_ms: u64,
    /// Backoff ceiling (seconds).
    pub max_delay_secs: u64,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        ConnectConfig {
            url: "ws://localhost:7890".to_string(),
            max_retries: 10,
            initial_delay_ms: 100,
            max_delay_secs: 30,
        }
    }
}

impl From<&RemoteConfig> for ConnectConfig {
    fn from(remote: &RemoteConfig) -> Self {
        ConnectConfig {
            url: remote.url.clone(),
            max_retries: remote.max_retries,
            initial_delay_ms: remote.initial_delay_ms,
            max_delay_secs: remote.max_delay_secs,
        }
    }
}

/// Remote store client speaking the reel protocol.
///
/// Requests are serialized over one connection. Each carries a fresh
/// `request_id` and the reply is the first frame echoing it; other frames
/// are dropped. The connection is opened lazily and reopened after a drop.
pub struct WsRemoteStore<T: Transport = WebSocketTransport> {
    config: ConnectConfig,
    transport: Mutex<T>,
    next_request_id: AtomicU64,
}

impl WsRemoteStore<WebSocketTransport> {
    pub fn new(config: ConnectConfig) -> Self {
        Self::with_transport(config, WebSocketTransport::new())
    }
}

impl<T: Transport> WsRemoteStore<T> {
    /// Create a store over a custom transport (for testing).
    pub fn with_transport(config: ConnectConfig, transport: T) -> Self {
        WsRemoteStore {
            config,
            transport: Mutex::new(transport),
            next_request_id: AtomicU64::new(1),
        }
    }

    /// Connects now instead of on the first request.
    pub async fn connect(&self) -> Result<()> {
        let mut transport = self.transport.lock().await;
        self.connect_with_retry(&mut *transport).await
    }

    pub async fn disconnect(&self) -> Result<()> {
        let mut transport = self.transport.lock().await;
        transport.disconnect().await.map_err(unavailable)
    }

    /// Connect with exponential backoff retry.
    async fn connect_with_retry(&self, transport: &mut T) -> Result<()> {
        let mut attempt = 0;
        let mut delay_ms = self.config.initial_delay_ms;
        let max_delay_ms = self.config.max_delay_secs.saturating_mul(1000);

        loop {
            attempt += 1;
            match transport.connect(&self.config.url).await {
                Ok(()) => {
                    debug!(url = %self.config.url, attempt, "connected to remote store");
                    return Ok(());
                }
                Err(e) if attempt >= self.config.max_retries.max(1) => {
                    return Err(Error::RemoteUnavailable(format!(
                        "{} after {attempt} attempts: {e}",
                        self.config.url
                    )));
                }
                Err(e) => {
                    warn!(url = %self.config.url, attempt, error = %e, "connect failed, retrying");
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    delay_ms = delay_ms.saturating_mul(2).min(max_delay_ms);
                }
            }
        }
    }

    /// Sends one request and waits for its reply.
    ///
    /// Error replies are converted into typed errors here, so callers only
    /// see success variants.
    async fn call(&self, request: Request) -> Result<Response> {
        let request_id = self.next_request_id.fetch_add(1, Ordering::SeqCst);
        let mut transport = self.transport.lock().await;
        if !transport.is_connected() {
            self.connect_with_retry(&mut *transport).await?;
        }

        debug!(request_id, request = ?request, "remote request");
        transport
            .send(ClientMessage::new(request_id, request))
            .await
            .map_err(unavailable)?;

        let response = loop {
            match transport.recv().await.map_err(unavailable)? {
                Some(msg) if msg.request_id == request_id => break msg.response,
                Some(msg) => {
                    debug!(
                        expected = request_id,
                        got = msg.request_id,
                        "skipping unrelated frame"
                    );
                }
                None => return Err(unavailable(TransportError::ConnectionClosed)),
            }
        };

        match response {
            Response::Error { code, message } => Err(Error::from_remote(code, message)),
            other => Ok(other),
        }
    }
}

fn unavailable(e: TransportError) -> Error {
    Error::RemoteUnavailable(e.to_string())
}

fn unexpected(expected: &str, got: &Response) -> Error {
    Error::RemoteUnavailable(format!(
        "unexpected response: expected {expected}, got {}",
        got.kind()
    ))
}

fn expect_ok(response: Response) -> Result<()> {
    match response {
        Response::Ok => Ok(()),
        other => Err(unexpected("ok", &other)),
    }
}

fn expect_list(response: Response) -> Result<ListMeta> {
    match response {
        Response::List { list } => list.into_meta(),
        other => Err(unexpected("list", &other)),
    }
}

fn expect_lists(response: Response) -> Result<Vec<ListMeta>> {
    match response {
        Response::Lists { lists } => decode_lists(lists),
        other => Err(unexpected("lists", &other)),
    }
}

#[async_trait]
impl<T: Transport> RemoteStore for WsRemoteStore<T> {
    async fn create_list(&self, owner_id: &str, list: NewList) -> Result<ListMeta> {
        let response = self
            .call(Request::CreateList {
                owner_id: owner_id.to_string(),
                list,
            })
            .await?;
        expect_list(response)
    }

    async fn update_list(&self, id: &str, patch: ListPatch) -> Result<ListMeta> {
        let response = self
            .call(Request::UpdateList {
                id: id.to_string(),
                patch: ListPatchRow::from_patch(patch),
            })
            .await?;
        expect_list(response)
    }

    async fn delete_list(&self, id: &str) -> Result<()> {
        expect_ok(self.call(Request::DeleteList { id: id.to_string() }).await?)
    }

    async fn add_item(
        &self,
        list_id: &str,
        draft: ItemDraft,
        sort_order: u32,
    ) -> Result<ListItem> {
        let response = self
            .call(Request::AddItem {
                list_id: list_id.to_string(),
                draft,
                sort_order,
            })
            .await?;
        match response {
            Response::Item { item } => item.into_item(),
            other => Err(unexpected("item", &other)),
        }
    }

    async fn remove_item(&self, item_id: &str) -> Result<()> {
        expect_ok(
            self.call(Request::RemoveItem {
                item_id: item_id.to_string(),
            })
            .await?,
        )
    }

    async fn update_item_sort_order(&self, item_id: &str, sort_order: u32) -> Result<()> {
        expect_ok(
            self.call(Request::UpdateItemSortOrder {
                item_id: item_id.to_string(),
                sort_order,
            })
            .await?,
        )
    }

    async fn touch_list(&self, list_id: &str, at: DateTime<Utc>) -> Result<()> {
        expect_ok(
            self.call(Request::TouchList {
                id: list_id.to_string(),
                at,
            })
            .await?,
        )
    }

    async fn fetch_list(&self, id: &str) -> Result<ListMeta> {
        expect_list(self.call(Request::FetchList { id: id.to_string() }).await?)
    }

    async fn fetch_lists(&self, owner_id: &str) -> Result<Vec<ListMeta>> {
        expect_lists(
            self.call(Request::FetchLists {
                owner_id: owner_id.to_string(),
            })
            .await?,
        )
    }

    async fn fetch_items(&self, list_id: &str) -> Result<Vec<ListItem>> {
        let response = self
            .call(Request::FetchItems {
                list_id: list_id.to_string(),
            })
            .await?;
        match response {
            Response::Items { items } => decode_items(items),
            other => Err(unexpected("items", &other)),
        }
    }

    async fn count_items(&self, list_id: &str) -> Result<usize> {
        let response = self
            .call(Request::CountItems {
                list_id: list_id.to_string(),
            })
            .await?;
        match response {
            Response::Count { count } => usize::try_from(count)
                .map_err(|_| Error::RemoteUnavailable(format!("count out of range: {count}"))),
            other => Err(unexpected("count", &other)),
        }
    }

    async fn fetch_lists_summary(&self, owner_id: &str) -> Result<Vec<ListMeta>> {
        expect_lists(
            self.call(Request::FetchListsSummary {
                owner_id: owner_id.to_string(),
            })
            .await?,
        )
    }

    async fn fetch_items_with_watched(
        &self,
        list_id: &str,
        owner_id: &str,
    ) -> Result<Vec<WatchedItem>> {
        let response = self
            .call(Request::FetchItemsWithWatched {
                list_id: list_id.to_string(),
                owner_id: owner_id.to_string(),
            })
            .await?;
        match response {
            Response::WatchedItems { items } => {
                items.into_iter().map(|row| row.into_watched()).collect()
            }
            other => Err(unexpected("watched_items", &other)),
        }
    }
}

#[async_trait]
impl<T: Transport> WatchLog for WsRemoteStore<T> {
    async fn batch_watched(
        &self,
        owner_id: &str,
        external_refs: &[ExternalRef],
    ) -> Result<HashSet<ExternalRef>> {
        let response = self
            .call(Request::BatchWatched {
                owner_id: owner_id.to_string(),
                external_refs: external_refs.to_vec(),
            })
            .await?;
        match response {
            Response::Watched { external_refs } => Ok(external_refs.into_iter().collect()),
            other => Err(unexpected("watched", &other)),
        }
    }
}

#[cfg(test)]
#[path = "ws_tests.rs"]
mod tests;
