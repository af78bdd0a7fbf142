// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use reel_core::Error;

fn failing() -> Result<u32> {
    Err(Error::RemoteUnavailable("down".into()))
}

#[test]
fn critical_propagates() {
    assert!(matches!(
        critical("fetch", failing()),
        Err(Error::RemoteUnavailable(_))
    ));
    assert_eq!(critical("fetch", Ok(3)).unwrap(), 3);
}

#[test]
fn advisory_swallows() {
    assert_eq!(advisory("touch", failing()), None);
    assert_eq!(advisory("touch", Ok(3)), Some(3));
}
