use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Instant,
};

/// A trait for time sources that return a monotonic timestamp.
///
/// This abstraction allows you to plug in the real monotonic clock, or a
/// manually-driven time source in tests.
///
/// The timestamp type `T` is generic (typically `u64`), and the unit is
/// expected to be **milliseconds** relative to process start.
///
/// # Example
///
/// ```
/// use tickpair::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource<u64> for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource<T> {
    /// Returns the current time in milliseconds.
    fn current_millis(&self) -> T;
}

/// A monotonic time source that returns elapsed time since construction.
///
/// Built on [`Instant`], so timestamps never go backward even if the
/// system wall clock is adjusted externally. All tasks in a pipeline share
/// one clone of the same clock, so slow-token timestamps and capture
/// timestamps are directly comparable.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl TimeSource<u64> for MonotonicClock {
    /// Returns the number of milliseconds elapsed since this clock was
    /// constructed.
    fn current_millis(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// A manually-driven [`TimeSource`] for deterministic tests.
///
/// The clock only moves when told to via [`set`] or [`advance`]. Clones
/// share the same underlying counter.
///
/// [`set`]: ManualClock::set
/// [`advance`]: ManualClock::advance
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock frozen at `millis`.
    pub fn at(millis: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(millis)),
        }
    }

    /// Moves the clock to an absolute time.
    pub fn set(&self, millis: u64) {
        self.now.store(millis, Ordering::Release);
    }

    /// Moves the clock forward by `millis`.
    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::AcqRel);
    }
}

impl TimeSource<u64> for ManualClock {
    fn current_millis(&self) -> u64 {
        self.now.load(Ordering::Acquire)
    }
}
