// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::cli::OutputFormat;
use crate::display::{format_list_line, format_sync_report};
use crate::error::Result;
use crate::service::ListService;

use super::{print_json, resolve_list};

/// Resync everything, or a single list when `key` is given.
pub async fn run(service: &ListService, key: Option<&str>, output: OutputFormat) -> Result<()> {
    match key {
        None => {
            let report = service.refresh_all().await?;
            match output {
                OutputFormat::Json => print_json(&report),
                OutputFormat::Text => {
                    println!("{}", format_sync_report(&report));
                    Ok(())
                }
            }
        }
        Some(key) => {
            let list = resolve_list(service, key)?;
            let meta = service.reload(&list.id).await?;
            match output {
                OutputFormat::Json => print_json(&meta),
                OutputFormat::Text => {
                    println!("Synced {}", format_list_line(&meta));
                    Ok(())
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
