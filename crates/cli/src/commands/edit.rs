// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::collections::BTreeSet;

use reel_core::list::parse_month;
use reel_core::{ListMeta, ListPatch, NewList, Patch};

use crate::cli::{ListFields, OutputFormat};
use crate::display::format_list_details;
use crate::error::Result;
use crate::service::ListService;

use super::{print_json, resolve_list};

/// Which fields `reel edit` clears outright.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clears {
    pub description: bool,
    pub tags: bool,
    pub month: bool,
}

pub fn build_new_list(name: String, fields: ListFields, ranked: bool) -> Result<NewList> {
    let mut list = NewList::named(name);
    if let Some(description) = fields.description {
        list = list.with_description(description);
    }
    list.ranked = ranked;
    list.tags = fields.tags.into_iter().collect();
    list.themed_month_date = fields.month.as_deref().map(parse_month).transpose()?;
    Ok(list)
}

pub fn build_patch(
    name: Option<String>,
    fields: ListFields,
    ranked: Option<bool>,
    clears: Clears,
) -> Result<ListPatch> {
    let mut patch = ListPatch::new();
    if let Some(name) = name {
        patch = patch.name(name);
    }
    if let Some(ranked) = ranked {
        patch = patch.ranked(ranked);
    }

    if clears.description {
        patch = patch.description(Patch::Clear);
    } else if let Some(description) = fields.description {
        patch = patch.description(Patch::Set(description));
    }

    if clears.tags {
        patch = patch.tags(BTreeSet::new());
    } else if !fields.tags.is_empty() {
        patch = patch.tags(fields.tags.into_iter().collect());
    }

    if clears.month {
        patch = patch.themed_month(Patch::Clear);
    } else if let Some(month) = fields.month {
        patch = patch.themed_month(Patch::Set(parse_month(&month)?));
    }
    Ok(patch)
}

pub async fn create(
    service: &ListService,
    list: NewList,
    output: OutputFormat,
) -> Result<()> {
    let meta = service.create_list(list).await?;
    report("Created", &meta, output)
}

pub async fn edit(
    service: &ListService,
    key: &str,
    patch: ListPatch,
    output: OutputFormat,
) -> Result<()> {
    let list = resolve_list(service, key)?;
    let meta = service.update_list(&list.id, patch).await?;
    report("Updated", &meta, output)
}

pub async fn delete(service: &ListService, key: &str) -> Result<()> {
    let list = resolve_list(service, key)?;
    service.delete_list(&list.id).await?;
    println!("Deleted {} [{}]", list.name, list.id);
    Ok(())
}

pub async fn pin(service: &ListService, key: &str, pinned: bool) -> Result<()> {
    let list = resolve_list(service, key)?;
    let meta = if pinned {
        service.pin(&list.id).await?
    } else {
        service.unpin(&list.id).await?
    };
    let verb = if meta.pinned { "Pinned" } else { "Unpinned" };
    println!("{verb} {} [{}]", meta.name, meta.id);
    Ok(())
}

fn report(verb: &str, meta: &ListMeta, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => print_json(meta),
        OutputFormat::Text => {
            println!("{verb} {}", format_list_details(meta));
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "edit_tests.rs"]
mod tests;
