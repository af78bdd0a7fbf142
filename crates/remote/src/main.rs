// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! reel-remote: WebSocket server holding the authoritative list store.
//!
//! Lists, items and watch history live in a SQLite database in the data
//! directory. Clients speak the request/response protocol from
//! `reel_core::protocol`.

mod server;
mod state;

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// reel-remote: authoritative store for reel media lists
#[derive(Parser, Debug)]
#[command(name = "reel-remote")]
#[command(about = "WebSocket server holding the authoritative reel list store")]
struct Args {
    /// Address to bind the server to
    #[arg(short, long, default_value = "0.0.0.0:7890")]
    bind: SocketAddr,

    /// Directory for the database
    #[arg(short, long, default_value = ".")]
    data: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Refuse the lists-summary and items-with-watched endpoints, like an
    /// older deployment
    #[arg(long)]
    legacy: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // RUST_LOG wins; otherwise --verbose picks debug over info
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting reel-remote server");
    info!("  Bind address: {}", args.bind);
    info!("  Data directory: {}", args.data.display());
    if args.legacy {
        info!("  Legacy mode: optimized endpoints disabled");
    }

    let state = state::ServerState::new(&args.data, args.legacy)?;
    server::run(args.bind, state).await?;

    Ok(())
}
