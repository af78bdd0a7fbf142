// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use super::*;
use clap::CommandFactory;

#[test]
fn definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn parses_add_with_options() {
    let cli = Cli::try_parse_from([
        "reel",
        "add",
        "Favorites",
        "550",
        "Fight Club",
        "--year",
        "1999",
        "-o",
        "json",
    ])
    .unwrap();
    match cli.command {
        Command::Add {
            list,
            external_ref,
            title,
            year,
            output,
            ..
        } => {
            assert_eq!(list, "Favorites");
            assert_eq!(external_ref, 550);
            assert_eq!(title, "Fight Club");
            assert_eq!(year, Some(1999));
            assert_eq!(output, OutputFormat::Json);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn create_splits_comma_separated_tags() {
    let cli = Cli::try_parse_from(["reel", "create", "October", "-t", "horror,classics"]).unwrap();
    match cli.command {
        Command::Create { fields, .. } => assert_eq!(fields.tags, vec!["horror", "classics"]),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn create_rejects_blank_name() {
    assert!(Cli::try_parse_from(["reel", "create", "  "]).is_err());
}

#[test]
fn edit_rejects_month_with_clear_month() {
    let result = Cli::try_parse_from([
        "reel",
        "edit",
        "October",
        "--month",
        "2024-10",
        "--clear-month",
    ]);
    assert!(result.is_err());
}

#[test]
fn reorder_requires_refs() {
    assert!(Cli::try_parse_from(["reel", "reorder", "Favorites"]).is_err());
}

#[test]
fn reorder_takes_catalog_refs_in_order() {
    let cli = Cli::try_parse_from(["reel", "reorder", "Favorites", "680", "550", "13"]).unwrap();
    match cli.command {
        Command::Reorder {
            list,
            external_refs,
        } => {
            assert_eq!(list, "Favorites");
            assert_eq!(external_refs, vec![680, 550, 13]);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn reorder_rejects_item_ids() {
    assert!(Cli::try_parse_from(["reel", "reorder", "Favorites", "itm-3f2a"]).is_err());
}

#[test]
fn directory_flag_is_global() {
    let cli = Cli::try_parse_from(["reel", "lists", "-C", "/tmp/x"]).unwrap();
    assert_eq!(cli.directory.as_deref(), Some("/tmp/x"));
}
