// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! reel-core: Shared library for the reel list engine
//!
//! This crate provides the list data model, partial-update types, wire
//! protocol, and SQLite storage shared by the reel client and the
//! reference remote store.

pub mod clock;
pub mod db;
pub mod dto;
pub mod error;
pub mod id;
pub mod list;
pub mod patch;
pub mod protocol;
pub mod record;

pub use clock::{ClockSource, Stamper, SteppingClock, SystemClock};
pub use db::Database;
pub use error::{Error, Result};
pub use list::{ExternalRef, ItemDraft, ListItem, ListMeta, NewList, WatchedItem};
pub use patch::{ListPatch, Patch};
pub use protocol::{ClientMessage, ErrorCode, Request, Response, ServerMessage};
pub use record::{ItemRecord, ListRecord};
