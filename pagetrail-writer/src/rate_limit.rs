// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::{
    sync::OnceLock,
    time::{Duration, Instant},
};

// only pub(crate) so that the macro calls can all use the same epoch static
#[doc(hidden)]
pub(crate) fn time_since_arbitrary_epoch() -> Duration {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    Instant::now().duration_since(*EPOCH.get_or_init(Instant::now))
}

/// `rate_limited!(duration, expr)` evaluates `expr` at most once every `duration` across all threads.
///
/// Used for warnings on the delivery path: a collector that is down would otherwise produce one warning per chunk
/// per flush. The first occurrence is logged, then one per interval while the problem persists.
///
/// The limit applies per call site.
macro_rules! rate_limited {
    ($interval:expr, $call:expr) => {{
        use std::sync::atomic::{AtomicU64, Ordering};
        static NEXT_CALL: AtomicU64 = AtomicU64::new(u64::MIN);
        let interval: std::time::Duration = $interval;
        debug_assert!(
            interval >= std::time::Duration::from_secs(1),
            "only second-level granularity supported for rate limiting"
        );

        let now = $crate::rate_limit::time_since_arbitrary_epoch();
        let next = NEXT_CALL.load(Ordering::Relaxed);
        if next <= now.as_secs() {
            let new_next = now
                .checked_add(interval)
                .unwrap_or(std::time::Duration::MAX)
                .as_secs();
            if NEXT_CALL
                .compare_exchange(next, new_next, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                $call;
            }
        }
    }};
}
pub(crate) use rate_limited;
