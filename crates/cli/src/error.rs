// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors surfaced by the reel client.
///
/// Engine errors pass through unchanged; the rest come from the
/// workspace and configuration layer around it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not initialized: run 'reel init' first")]
    NotInitialized,

    #[error("already initialized at {0}")]
    AlreadyInitialized(String),

    #[error("ambiguous list name '{name}' matches: {}\n  hint: use the list id instead", matches.join(", "))]
    AmbiguousList { name: String, matches: Vec<String> },

    #[error("remote not configured\n  hint: add a [remote] section to .reel/config.toml")]
    RemoteNotConfigured,

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] reel_core::Error),
}

impl Error {
    /// The engine error underneath, if any.
    pub fn core(&self) -> Option<&reel_core::Error> {
        match self {
            Error::Core(e) => Some(e),
            _ => None,
        }
    }
}

/// A specialized Result type for reel client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
