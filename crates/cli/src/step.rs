// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Failure policy for the sub-steps of a mutation.
//!
//! A critical step's error aborts the mutation and reaches the caller. An
//! advisory step runs after the primary effect has committed; its error is
//! logged and dropped.

use tracing::{debug, warn};

use reel_core::Result;

/// Runs a critical step: errors propagate.
pub fn critical<T>(name: &'static str, result: Result<T>) -> Result<T> {
    result.inspect_err(|e| debug!(step = name, error = %e, "critical step failed"))
}

/// Runs an advisory step: errors are logged and become `None`.
pub fn advisory<T>(name: &'static str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(step = name, error = %e, "advisory step failed, continuing");
            None
        }
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
