// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Duration tracking for store operations.
//!
//! Repositories wrap each store call in [`timed`]; nothing is patched
//! globally, so only the call sites that opt in are measured.

use std::time::{Duration, Instant};

/// Operations slower than this are logged at WARN.
pub const SLOW_OPERATION_THRESHOLD: Duration = Duration::from_millis(500);

/// Run a store operation and log how long it took.
pub fn timed<T, E>(
    collection: &'static str,
    operation: &'static str,
    f: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    let started = Instant::now();
    let result = f();
    record(collection, operation, started.elapsed(), result.is_ok());
    result
}

fn record(collection: &'static str, operation: &'static str, elapsed: Duration, ok: bool) {
    let duration_ms = elapsed.as_secs_f64() * 1000.0;
    if elapsed > SLOW_OPERATION_THRESHOLD {
        tracing::warn!(
            collection,
            operation,
            duration_ms,
            ok,
            "Slow store operation"
        );
    } else {
        tracing::trace!(collection, operation, duration_ms, ok, "Store operation");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_passes_through_success() {
        let result: Result<u32, String> = timed("posts", "find", || Ok(7));
        assert_eq!(result, Ok(7));
    }

    #[test]
    fn timed_passes_through_failure() {
        let result: Result<u32, String> = timed("posts", "find", || Err("boom".to_string()));
        assert_eq!(result, Err("boom".to_string()));
    }
}
