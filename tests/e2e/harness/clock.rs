use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 2023-11-14T22:13:20Z
const START: i64 = 1_700_000_000;

/// Controllable clock shared with the library under test.
///
/// Pass `as_provider()` to `Library::with_time_provider()` so that every
/// timestamp the library writes, including backup file names, is
/// deterministic.
#[derive(Clone)]
pub struct MockClock {
    current: Arc<AtomicI64>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::starting_at(START)
    }

    pub fn starting_at(timestamp: i64) -> Self {
        Self {
            current: Arc::new(AtomicI64::new(timestamp)),
        }
    }

    /// Creates a time provider function suitable for passing to `Library`.
    pub fn as_provider(&self) -> impl Fn() -> i64 + Send + Sync + 'static {
        let current = self.current.clone();
        move || current.load(Ordering::SeqCst)
    }

    pub fn now(&self) -> i64 {
        self.current.load(Ordering::SeqCst)
    }

    pub fn advance(&self, duration: Duration) {
        self.current
            .fetch_add(duration.as_secs() as i64, Ordering::SeqCst);
    }

    pub fn advance_hours(&self, hours: u64) {
        self.advance(Duration::from_secs(hours * 3600));
    }

    pub fn advance_days(&self, days: u64) {
        self.advance(Duration::from_secs(days * 86400));
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}
