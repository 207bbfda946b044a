//! Target-time scheduling.
//!
//! The probe's whole point is releasing specific bytes at an absolute
//! wall-clock instant, so the primitive here is expressed against
//! [`SystemTime`], not a monotonic deadline: each pass registers a
//! single-shot runtime timer for the remaining interval and then re-reads
//! the wall clock, which keeps the contract honest even when the clock is
//! adjusted underneath a sleeping timer.
//!
//! Contract:
//!
//! - never completes before the target time
//! - completes within [`GRANULARITY`] of it plus runtime scheduling jitter;
//!   lateness has no hard upper bound under load
//! - never completes synchronously with the call, even for a target already
//!   in the past

use std::time::{Duration, SystemTime};

use tracing::trace;

/// Resolution bound of the scheduler.
///
/// Firing happens within `[target, target + GRANULARITY + jitter)`, where
/// jitter is whatever the runtime adds under load.
pub const GRANULARITY: Duration = Duration::from_millis(1);

/// Suspends until the wall clock reads at or past `target`.
///
/// Cannot fail; a target in the past yields to the runtime once and
/// returns.
pub async fn wait_until(target: SystemTime) {
    // even an elapsed target goes through the runtime once, so completion
    // ordering relative to other pending work is consistent
    tokio::task::yield_now().await;

    while let Ok(remaining) = target.duration_since(SystemTime::now()) {
        if remaining.is_zero() {
            break;
        }
        trace!(?remaining, "waiting for target time");
        tokio::time::sleep(remaining).await;
    }
}

/// Fire-and-forget form: invokes `callback` once the wall clock reaches
/// `target`.
///
/// The callback runs on a spawned task, exactly once; the task disarms by
/// completing. Must be called from within a tokio runtime.
pub fn schedule_at<F>(callback: F, target: SystemTime)
where
    F: FnOnce() + Send + 'static,
{
    tokio::spawn(async move {
        wait_until(target).await;
        callback();
    });
}
