// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use chrono::NaiveDate;

use reel_core::{Error as CoreError, ExternalRef, ItemDraft};

use crate::cli::OutputFormat;
use crate::display::format_item_line;
use crate::error::Result;
use crate::service::ListService;

use super::{item_ids_for_refs, print_json, resolve_list};

/// Optional catalog fields for `reel add`.
#[derive(Debug, Clone, Default)]
pub struct ItemExtras {
    pub year: Option<i32>,
    pub release_date: Option<String>,
    pub poster: Option<String>,
}

pub fn build_draft(external_ref: ExternalRef, title: String, extras: ItemExtras) -> Result<ItemDraft> {
    let mut draft = ItemDraft::new(external_ref, title);
    if let Some(year) = extras.year {
        draft = draft.with_year(year);
    }
    if let Some(date) = extras.release_date {
        let parsed = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| {
            CoreError::InvalidArgument(format!("invalid release date '{date}', expected YYYY-MM-DD"))
        })?;
        draft = draft.with_release_date(parsed);
    }
    draft.poster_url = extras.poster;
    Ok(draft)
}

pub async fn add(
    service: &ListService,
    key: &str,
    draft: ItemDraft,
    output: OutputFormat,
) -> Result<()> {
    let list = resolve_list(service, key)?;
    let item = service.add_item(&list.id, draft).await?;
    match output {
        OutputFormat::Json => print_json(&item),
        OutputFormat::Text => {
            println!("Added to {}: {}", list.name, format_item_line(&item).trim_start());
            Ok(())
        }
    }
}

pub async fn remove(service: &ListService, key: &str, external_ref: ExternalRef) -> Result<()> {
    let list = resolve_list(service, key)?;
    service.remove_item(&list.id, external_ref).await?;
    println!("Removed #{external_ref} from {}", list.name);
    Ok(())
}

pub async fn reorder(service: &ListService, key: &str, refs: &[ExternalRef]) -> Result<()> {
    let list = resolve_list(service, key)?;
    let ids = item_ids_for_refs(service, &list.id, refs)?;
    let items = service.reorder_items(&list.id, &ids).await?;
    println!("Reordered {}:", list.name);
    for item in &items {
        println!("{}", format_item_line(item));
    }
    Ok(())
}

#[cfg(test)]
#[path = "item_tests.rs"]
mod tests;
