// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "reel")]
#[command(version)]
#[command(about = "Curate media lists against a remote store, with a local cache for offline reads")]
pub struct Cli {
    /// Run as if reel was started in <path>
    #[arg(short = 'C', long = "directory", global = true, value_name = "path")]
    pub directory: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// List fields shared by `create` and `edit`.
#[derive(Args, Debug, Default, Clone)]
pub struct ListFields {
    /// Description shown under the list name
    #[arg(long, short)]
    pub description: Option<String>,

    /// Tag(s) for the list (comma-separated or repeated)
    #[arg(long = "tag", short = 't', value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Month the list is themed around (YYYY-MM)
    #[arg(long, value_name = "YYYY-MM")]
    pub month: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a .reel workspace in the current directory
    Init {
        /// Directory to initialize (defaults to the current directory)
        #[arg(long)]
        path: Option<String>,

        /// Owner id used for lists created from this workspace
        #[arg(long)]
        owner: Option<String>,

        /// WebSocket URL of the remote store (ws:// or wss://)
        #[arg(long)]
        remote: Option<String>,

        /// Cache database location, relative to the workspace root
        #[arg(long)]
        cache: Option<String>,
    },

    /// Show lists from the local cache, pinned first then most recent
    Lists {
        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Show the items of a list
    Items {
        /// List id or exact name
        list: String,

        /// Refresh from the remote and include watch status
        #[arg(long, short)]
        watched: bool,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Create a list
    Create {
        /// List name
        #[arg(value_parser = non_empty_string)]
        name: String,

        #[command(flatten)]
        fields: ListFields,

        /// Mark the list as a ranking
        #[arg(long)]
        ranked: bool,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Change a list's metadata
    #[command(arg_required_else_help = true)]
    Edit {
        /// List id or exact name
        list: String,

        /// New name
        #[arg(long, value_parser = non_empty_string)]
        name: Option<String>,

        #[command(flatten)]
        fields: ListFields,

        /// Whether the list is a ranking
        #[arg(long)]
        ranked: Option<bool>,

        /// Remove the description
        #[arg(long, conflicts_with = "description")]
        clear_description: bool,

        /// Remove every tag
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,

        /// Remove the themed month
        #[arg(long, conflicts_with = "month")]
        clear_month: bool,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Delete a list and its items
    Delete {
        /// List id or exact name
        list: String,
    },

    /// Pin a list to the top
    Pin {
        /// List id or exact name
        list: String,
    },

    /// Unpin a list
    Unpin {
        /// List id or exact name
        list: String,
    },

    /// Append a title to a list
    Add {
        /// List id or exact name
        list: String,

        /// Catalog id of the title
        external_ref: i64,

        /// Title as displayed
        #[arg(value_parser = non_empty_string)]
        title: String,

        /// Release year
        #[arg(long)]
        year: Option<i32>,

        /// Release date (YYYY-MM-DD)
        #[arg(long, value_name = "YYYY-MM-DD")]
        release_date: Option<String>,

        /// Poster image URL
        #[arg(long)]
        poster: Option<String>,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Remove a title from a list
    Remove {
        /// List id or exact name
        list: String,

        /// Catalog id of the title
        external_ref: i64,
    },

    /// Put a list's titles in the given order
    #[command(arg_required_else_help = true)]
    Reorder {
        /// List id or exact name
        list: String,

        /// Catalog ids of every title in the list, in the new order
        #[arg(required = true)]
        external_refs: Vec<i64>,
    },

    /// Replace the local cache with the remote's state
    Sync {
        /// Only resync this list (id or exact name)
        list: Option<String>,

        /// Output format (text, json)
        #[arg(long = "output", short = 'o', value_enum, default_value = "text")]
        output: OutputFormat,
    },
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
