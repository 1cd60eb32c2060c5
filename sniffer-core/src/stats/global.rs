use crate::stats::WindowStats;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Cumulative traffic for the lifetime of the process.
///
/// Shared behind an `Arc` between the tailer (writer) and the monitor and
/// renderers (readers). Every call takes the lock once, so a single update
/// or a whole [`merge`](Self::merge) is atomic; consecutive reads may still
/// observe different states.
#[derive(Debug, Default)]
pub struct GlobalStats {
    inner: Mutex<WindowStats>,
}

impl GlobalStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an arbitrary update under the lock.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut WindowStats),
    {
        f(&mut self.lock());
    }

    /// Fold a closed window into the cumulative totals.
    pub fn merge(&self, window: &WindowStats) {
        window.merge_into(&mut self.lock());
    }

    pub fn total_requests(&self) -> u64 {
        self.lock().total_requests()
    }

    /// Owned copy of the current totals.
    pub fn snapshot(&self) -> WindowStats {
        self.lock().clone()
    }

    // A panic while holding the lock can at worst leave one counter
    // un-bumped; the totals remain usable.
    fn lock(&self) -> MutexGuard<'_, WindowStats> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
