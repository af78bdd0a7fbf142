// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Timestamp sources for list recency ordering.
//!
//! List ordering depends on `updated_at`, so every bump must move a list
//! strictly forward in time even when the wall clock stalls or steps back.
//! [`Stamper`] wraps a [`ClockSource`] and enforces that.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

/// Trait for clock sources, allowing injection of custom clocks for testing.
pub trait ClockSource: Send + Sync {
    /// Returns the current wall-clock time.
    fn now(&self) -> DateTime<Utc>;
}

/// System clock implementation.
#[derive(Debug, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock that advances by a fixed step on every read.
#[derive(Debug)]
pub struct SteppingClock {
    next_ms: AtomicI64,
    step_ms: i64,
}

impl SteppingClock {
    /// Creates a clock starting at `start_ms` (Unix epoch millis).
    pub fn new(start_ms: i64, step_ms: i64) -> Self {
        SteppingClock {
            next_ms: AtomicI64::new(start_ms),
            step_ms,
        }
    }
}

impl Default for SteppingClock {
    fn default() -> Self {
        // 2024-01-01T00:00:00Z, one second per tick
        Self::new(1_704_067_200_000, 1_000)
    }
}

impl ClockSource for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let ms = self.next_ms.fetch_add(self.step_ms, Ordering::SeqCst);
        Utc.timestamp_millis_opt(ms)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl<C: ClockSource> ClockSource for &C {
    fn now(&self) -> DateTime<Utc> {
        (*self).now()
    }
}

/// Produces monotonically increasing timestamps from a clock source.
pub struct Stamper<C: ClockSource = SystemClock> {
    clock: C,
    last: Mutex<Option<DateTime<Utc>>>,
}

impl Stamper<SystemClock> {
    /// Creates a stamper over the system clock.
    pub fn system() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: ClockSource> Stamper<C> {
    /// Creates a stamper with a custom clock source.
    pub fn with_clock(clock: C) -> Self {
        Stamper {
            clock,
            last: Mutex::new(None),
        }
    }

    /// Returns a timestamp later than every previously issued one.
    pub fn now(&self) -> DateTime<Utc> {
        let mut last = self
            .last
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let wall = self.clock.now();
        let stamp = match *last {
            Some(prev) if wall <= prev => prev + Duration::milliseconds(1),
            _ => wall,
        };
        *last = Some(stamp);
        stamp
    }

    /// Returns a timestamp later than both `previous` and every issued stamp.
    ///
    /// Used for `updated_at` bumps so a touch never moves a list backwards.
    pub fn after(&self, previous: DateTime<Utc>) -> DateTime<Utc> {
        let stamp = self.now();
        if stamp > previous {
            return stamp;
        }
        let bumped = previous + Duration::milliseconds(1);
        let mut last = self
            .last
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *last = Some(bumped);
        bumped
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
