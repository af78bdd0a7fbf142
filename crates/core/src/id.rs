// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier generation for stores that assign ids.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Prefix for list ids.
pub const LIST_PREFIX: &str = "lst";

/// Prefix for item ids.
pub const ITEM_PREFIX: &str = "itm";

/// Generate an ID from prefix, seed text, and timestamp.
/// Format: {prefix}-{hash} where hash is first 8 hex chars of SHA256(seed + timestamp)
pub fn generate_id(prefix: &str, seed: &str, at: &DateTime<Utc>) -> String {
    let input = format!("{}{}", seed, at.to_rfc3339());
    let hash = Sha256::digest(input.as_bytes());
    format!("{}-{}", prefix, hex::encode(&hash[..4]))
}

/// Generate an ID not accepted by `exists`, appending `-2`, `-3`, ... on collision.
pub fn generate_unique_id<F>(prefix: &str, seed: &str, at: &DateTime<Utc>, exists: F) -> String
where
    F: Fn(&str) -> bool,
{
    let base_id = generate_id(prefix, seed, at);
    if !exists(&base_id) {
        return base_id;
    }

    let mut suffix = 2;
    loop {
        let id = format!("{}-{}", base_id, suffix);
        if !exists(&id) {
            return id;
        }
        suffix += 1;
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
