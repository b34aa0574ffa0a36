use crate::{FastValue, RandSource, SlotCache, TimeSource};
use core::fmt;

/// Length of a slow token, in alphanumeric characters.
pub const SLOW_TOKEN_LEN: usize = 7;
/// Number of slots in the slow-token cache.
pub const SLOW_CACHE_SLOTS: usize = 5;
/// Number of slots in the combined-record cache.
pub const RECORD_CACHE_SLOTS: usize = 7;

/// The slow-token cache: 5 slots of token-or-empty, random eviction.
pub type SlowTokenCache = SlotCache<SlowToken, SLOW_CACHE_SLOTS>;
/// The combined-record cache: 7 slots, same eviction discipline.
pub type RecordCache = SlotCache<CombinedRecord, RECORD_CACHE_SLOTS>;

/// A low-frequency alphanumeric token paired with its generation time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlowToken {
    /// Exactly [`SLOW_TOKEN_LEN`] characters from `[a-zA-Z0-9]`.
    pub token: String,
    /// Milliseconds on the pipeline clock when the token was generated.
    pub generated_at: u64,
}

impl SlowToken {
    /// Draws a fresh token and stamps it with the current time.
    pub fn generate<R: RandSource, T: TimeSource<u64>>(rand: &mut R, clock: &T) -> Self {
        Self {
            token: rand.alphanumeric(SLOW_TOKEN_LEN),
            generated_at: clock.current_millis(),
        }
    }
}

impl fmt::Display for SlowToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.token, self.generated_at)
    }
}

/// A point-in-time snapshot of the fast value.
///
/// Created transiently on each capture trigger; it lives on only as part
/// of a [`CombinedRecord`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureRecord {
    /// The fast value at trigger time.
    pub value: FastValue,
    /// Milliseconds on the pipeline clock when the trigger fired.
    pub captured_at: u64,
}

/// A durable pairing of a capture snapshot with one slow token.
///
/// The token is copied out of the slow cache, not referenced, so a later
/// overwrite of its source slot does not touch the record. Immutable once
/// created; a record is destroyed only by being overwritten by a later
/// random-slot write into the record cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CombinedRecord {
    pub token: SlowToken,
    pub capture: CaptureRecord,
}

impl fmt::Display for CombinedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.token.generated_at, self.token.token, self.capture.captured_at, self.capture.value
        )
    }
}
