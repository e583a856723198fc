//! Debounced, generation-guarded query refresh
//!
//! Search inputs refetch on every keystroke. Two small tools keep that
//! tolerable: a debouncer that holds a refetch until the input settles, and
//! a generation counter that lets callers discard a response that was
//! superseded while it was in flight, so a slow old query can never
//! overwrite newer results.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Delay applied to search-as-you-type refetches
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Collapses bursts of refresh requests into the final one.
///
/// Each call to [`Debouncer::settle`] waits out the delay and then reports
/// whether it is still the most recent call; only the caller that gets
/// `true` should issue the query.
#[derive(Clone)]
pub struct Debouncer {
    delay: Duration,
    latest: Arc<AtomicU64>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Debouncer {
    /// Create a debouncer with the given settle delay
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Wait out the delay; `true` means no newer call arrived meanwhile and
    /// this caller owns the refetch.
    pub async fn settle(&self) -> bool {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.delay).await;
        ticket == self.latest.load(Ordering::SeqCst)
    }
}

/// Stamps queries so stale responses can be recognized.
///
/// Begin a generation before issuing a query and check it when the response
/// arrives; if another query began in between, the response is stale and
/// must be dropped instead of applied.
#[derive(Default)]
pub struct Generation {
    counter: AtomicU64,
}

impl Generation {
    /// Create a fresh counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new query generation, superseding all earlier ones
    pub fn begin(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether a response stamped with `stamp` may still be applied
    pub fn is_current(&self, stamp: u64) -> bool {
        self.counter.load(Ordering::SeqCst) == stamp
    }
}

/// Debouncer and generation guard wired together for a search feed.
///
/// The intended loop per keystroke: call [`Refresh::begin`]; on `Some`,
/// issue the query and apply the response only while
/// [`Refresh::is_current`] still holds for the returned stamp.
#[derive(Default)]
pub struct Refresh {
    debouncer: Debouncer,
    generation: Generation,
}

impl Refresh {
    /// Create a feed with the given settle delay
    pub fn new(delay: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(delay),
            generation: Generation::new(),
        }
    }

    /// Debounce, then open a new query generation. `None` means a newer
    /// call superseded this one during the delay and no query should be
    /// issued.
    pub async fn begin(&self) -> Option<u64> {
        if self.debouncer.settle().await {
            Some(self.generation.begin())
        } else {
            None
        }
    }

    /// Whether a response stamped with `stamp` may still be applied
    pub fn is_current(&self, stamp: u64) -> bool {
        self.generation.is_current(stamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lone_caller_settles() {
        let debouncer = Debouncer::new(Duration::from_millis(5));
        assert!(debouncer.settle().await);
    }

    #[tokio::test]
    async fn superseded_caller_yields() {
        let debouncer = Debouncer::new(Duration::from_millis(30));

        let first = {
            let debouncer = debouncer.clone();
            tokio::spawn(async move { debouncer.settle().await })
        };
        // Let the first call take its ticket before superseding it.
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = debouncer.settle().await;

        assert!(!first.await.unwrap());
        assert!(second);
    }

    #[test]
    fn stale_generation_is_rejected() {
        let generation = Generation::new();
        let first = generation.begin();
        assert!(generation.is_current(first));

        let second = generation.begin();
        assert!(!generation.is_current(first));
        assert!(generation.is_current(second));
    }

    #[tokio::test]
    async fn refresh_discards_superseded_responses() {
        let refresh = Refresh::new(Duration::from_millis(5));

        let stamp = refresh.begin().await.expect("lone caller settles");
        assert!(refresh.is_current(stamp));

        // A newer round begins while the first response is in flight; the
        // first response must be dropped.
        let newer = refresh.begin().await.expect("second caller settles");
        assert!(!refresh.is_current(stamp));
        assert!(refresh.is_current(newer));
    }
}
