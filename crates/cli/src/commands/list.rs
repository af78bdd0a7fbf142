// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::OutputFormat;
use crate::display::{format_item_line, format_list_line, format_watched_line};
use crate::error::Result;
use crate::service::ListService;

use super::{print_json, resolve_list};

/// Show every list. Served from the index alone.
pub fn lists(service: &ListService, output: OutputFormat) -> Result<()> {
    let lists = service.lists();
    match output {
        OutputFormat::Json => print_json(&lists),
        OutputFormat::Text => {
            if lists.is_empty() {
                println!("No lists yet. Create one with 'reel create <name>'.");
            }
            for list in &lists {
                println!("{}", format_list_line(list));
            }
            Ok(())
        }
    }
}

/// Show a list's items, optionally refreshed with watch status.
pub async fn items(
    service: &ListService,
    key: &str,
    watched: bool,
    output: OutputFormat,
) -> Result<()> {
    let list = resolve_list(service, key)?;
    println_header(&list.name, output);

    if watched {
        let items = service.items_with_watched(&list.id).await?;
        return match output {
            OutputFormat::Json => print_json(&items),
            OutputFormat::Text => {
                for item in &items {
                    println!("{}", format_watched_line(item));
                }
                Ok(())
            }
        };
    }

    let items = service.items(&list.id);
    match output {
        OutputFormat::Json => print_json(&items),
        OutputFormat::Text => {
            for item in &items {
                println!("{}", format_item_line(item));
            }
            Ok(())
        }
    }
}

fn println_header(name: &str, output: OutputFormat) {
    if output == OutputFormat::Text {
        println!("{name}:");
    }
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
