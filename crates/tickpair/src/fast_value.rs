use crate::{Error, RandSource};
use core::{fmt, str::FromStr};
use std::sync::atomic::{AtomicU64, Ordering};

/// Smallest 12-digit decimal value.
pub const FAST_VALUE_MIN: u64 = 100_000_000_000;
/// Largest 12-digit decimal value.
pub const FAST_VALUE_MAX: u64 = 999_999_999_999;
/// Number of distinct 12-digit values.
const FAST_VALUE_SPAN: u64 = FAST_VALUE_MAX - FAST_VALUE_MIN + 1;

/// A 12-digit decimal value produced by the fast producer.
///
/// The inner `u64` is guaranteed to lie in
/// `[100_000_000_000, 999_999_999_999]` — every value renders as exactly
/// 12 decimal digits. The invariant is enforced at the two construction
/// sites: [`FastValue::generate`] asserts it (a violation is a
/// programming-contract bug, not a runtime condition), and the
/// [`FromStr`] impl rejects out-of-range operator input as
/// [`Error::MalformedQuery`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FastValue(u64);

impl FastValue {
    /// Draws a fresh 12-digit value from `rand`.
    ///
    /// Two independent 32-bit draws are combined into a 64-bit raw value
    /// and reduced into the 12-digit range via modulo plus offset.
    ///
    /// # Panics
    ///
    /// Panics if the reduced value falls outside the 12-digit range.
    /// Downstream consumers assume the invariant holds, so a violation
    /// must halt the producing task rather than publish.
    pub fn generate<R: RandSource>(rand: &mut R) -> Self {
        let raw = (u64::from(rand.wide_bits()) << 32) | u64::from(rand.wide_bits());
        let value = raw % FAST_VALUE_SPAN + FAST_VALUE_MIN;
        assert!(
            (FAST_VALUE_MIN..=FAST_VALUE_MAX).contains(&value),
            "generated value {value} is not 12 digits"
        );
        Self(value)
    }

    /// Returns the raw value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FastValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FastValue {
    type Err = Error;

    /// Best-effort parse of operator input into a 12-digit value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || Error::MalformedQuery {
            input: s.to_owned(),
        };
        let value: u64 = s.trim().parse().map_err(|_| malformed())?;
        if !(FAST_VALUE_MIN..=FAST_VALUE_MAX).contains(&value) {
            return Err(malformed());
        }
        Ok(Self(value))
    }
}

/// The single most-recent fast value, shared between the producer and the
/// trigger paths.
///
/// The producer is the only writer; the combiner and the lookup
/// coordinator read concurrently. Publication is a single atomic store,
/// so a reader observes either the old or the new value, never a torn
/// one — and the high-frequency writer never blocks on a lock.
///
/// A cell starts empty (no value has been published yet); [`snapshot`]
/// returns `None` until the first publish.
///
/// [`snapshot`]: FastValueCell::snapshot
#[derive(Debug, Default)]
pub struct FastValueCell {
    // 0 is not a valid 12-digit value, so it doubles as "never published".
    current: AtomicU64,
}

impl FastValueCell {
    /// Atomically replaces the current value.
    pub fn publish(&self, value: FastValue) {
        self.current.store(value.get(), Ordering::Release);
    }

    /// Returns an atomic point-in-time read of the current value, or
    /// `None` if the producer has not published yet.
    pub fn snapshot(&self) -> Option<FastValue> {
        match self.current.load(Ordering::Acquire) {
            0 => None,
            v => Some(FastValue(v)),
        }
    }
}
