use crate::{
    CaptureRecord, CombinedRecord, DurableLog, Error, FastValueCell, RandSource, RecordCache,
    Result, SlowTokenCache, TimeSource,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// The record cache, the log sequence, and the log itself, guarded as one
/// unit.
///
/// Sequence assignment and the log append happen under the same lock as
/// the cache write, so sequence numbers are assigned in the same order
/// records are appended: no reordering, no gaps, no duplicates.
#[derive(Debug)]
pub struct RecordStore<L> {
    pub cache: RecordCache,
    sequence: u64,
    log: L,
}

impl<L: DurableLog> RecordStore<L> {
    pub fn new(log: L) -> Self {
        Self {
            cache: RecordCache::new(),
            sequence: 0,
            log,
        }
    }

    /// Next sequence number to be assigned.
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Gives the log back, e.g. to inspect a [`MemoryLog`] in tests.
    ///
    /// [`MemoryLog`]: crate::MemoryLog
    pub fn into_log(self) -> L {
        self.log
    }
}

/// What a single capture produced.
#[derive(Debug)]
pub struct CaptureOutcome {
    /// The combined record that was stored.
    pub record: CombinedRecord,
    /// The record-cache slot it was written to.
    pub slot: usize,
    /// The sequence number it was logged under, or `None` if the durable
    /// append failed (the in-memory record still exists).
    pub sequence: Option<u64>,
}

/// The capture path: pairs a fast-value snapshot with one slow token and
/// makes the pairing durable.
///
/// Capture triggers are serialized by the dispatch loop, so at most one
/// capture executes at a time; the record-store mutex additionally keeps
/// the cache write, sequence assignment, and log append observably
/// atomic against any other reader.
#[derive(Debug)]
pub struct RecordCombiner<T, R, L> {
    fast: Arc<FastValueCell>,
    tokens: Arc<Mutex<SlowTokenCache>>,
    records: Arc<Mutex<RecordStore<L>>>,
    clock: T,
    rand: R,
}

impl<T, R, L> RecordCombiner<T, R, L>
where
    T: TimeSource<u64>,
    R: RandSource,
    L: DurableLog,
{
    pub fn new(
        fast: Arc<FastValueCell>,
        tokens: Arc<Mutex<SlowTokenCache>>,
        records: Arc<Mutex<RecordStore<L>>>,
        clock: T,
        rand: R,
    ) -> Self {
        Self {
            fast,
            tokens,
            records,
            clock,
            rand,
        }
    }

    /// Executes one capture.
    ///
    /// 1. Snapshots the current fast value and timestamp.
    /// 2. Copies one uniformly-chosen *occupied* slow-token slot.
    /// 3. Overwrites a uniformly random record-cache slot with the
    ///    combined record.
    /// 4. Appends the record to the durable log and advances the
    ///    sequence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CaptureUnavailable`] if no slow token has ever
    /// been generated (or the fast producer has not published yet). A
    /// failed log append is *not* an error here: the cache write stands,
    /// the sequence is not advanced, and the outcome carries
    /// `sequence: None` alongside a warning.
    pub fn capture(&mut self) -> Result<CaptureOutcome> {
        let value = self.fast.snapshot().ok_or(Error::CaptureUnavailable)?;
        let capture = CaptureRecord {
            value,
            captured_at: self.clock.current_millis(),
        };

        let token = {
            let tokens = self.tokens.lock();
            tokens
                .pick_occupied(&mut self.rand)
                .map(|(_, token)| token.clone())
                .ok_or(Error::CaptureUnavailable)?
        };

        let record = CombinedRecord { token, capture };

        let mut guard = self.records.lock();
        let store = &mut *guard;
        let slot = store.cache.insert_random(&mut self.rand, record.clone());
        let sequence = match store.log.append(store.sequence, &record) {
            Ok(()) => {
                let assigned = store.sequence;
                store.sequence += 1;
                Some(assigned)
            }
            Err(err) => {
                tracing::warn!(
                    %record,
                    error = %err,
                    "durable log append failed; record kept in memory only"
                );
                None
            }
        };
        drop(guard);

        tracing::debug!(%record, slot, ?sequence, "capture combined");
        Ok(CaptureOutcome {
            record,
            slot,
            sequence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        FailingLog, FastValue, ManualClock, MemoryLog, RECORD_CACHE_SLOTS, SeededRandom, SlowToken,
    };

    type TestCombiner<L> = RecordCombiner<ManualClock, SeededRandom, L>;

    struct Fixture<L> {
        fast: Arc<FastValueCell>,
        tokens: Arc<Mutex<SlowTokenCache>>,
        records: Arc<Mutex<RecordStore<L>>>,
        clock: ManualClock,
        combiner: TestCombiner<L>,
    }

    fn fixture<L: DurableLog>(log: L, seed: u64) -> Fixture<L> {
        let fast = Arc::new(FastValueCell::default());
        let tokens = Arc::new(Mutex::new(SlowTokenCache::new()));
        let records = Arc::new(Mutex::new(RecordStore::new(log)));
        let clock = ManualClock::at(0);
        let combiner = RecordCombiner::new(
            Arc::clone(&fast),
            Arc::clone(&tokens),
            Arc::clone(&records),
            clock.clone(),
            SeededRandom::from_seed(seed),
        );
        Fixture {
            fast,
            tokens,
            records,
            clock,
            combiner,
        }
    }

    fn token(token: &str, generated_at: u64) -> SlowToken {
        SlowToken {
            token: token.to_owned(),
            generated_at,
        }
    }

    #[test]
    fn capture_pairs_snapshot_with_the_only_occupied_slot() {
        let mut fx = fixture(MemoryLog::new(), 2);
        fx.tokens.lock().insert_at(2, token("Ab12xyz", 10));
        fx.fast.publish("555555555555".parse::<FastValue>().unwrap());
        fx.clock.set(20);

        let outcome = fx.combiner.capture().unwrap();

        assert_eq!(outcome.record.token, token("Ab12xyz", 10));
        assert_eq!(outcome.record.capture.value.get(), 555_555_555_555);
        assert_eq!(outcome.record.capture.captured_at, 20);
        assert_eq!(outcome.sequence, Some(0));

        let store = fx.records.lock();
        assert_eq!(store.sequence(), 1);
        assert_eq!(store.cache.get(outcome.slot), Some(&outcome.record));
    }

    #[test]
    fn capture_changes_exactly_one_record_slot_and_advances_sequence_by_one() {
        let mut fx = fixture(MemoryLog::new(), 6);
        fx.tokens.lock().insert_at(0, token("aaaaaaa", 1));
        fx.fast.publish("123456789012".parse::<FastValue>().unwrap());

        for _ in 0..10 {
            fx.combiner.capture().unwrap();
        }

        let before: Vec<_> = {
            let store = fx.records.lock();
            (0..RECORD_CACHE_SLOTS)
                .map(|i| store.cache.get(i).cloned())
                .collect()
        };
        let seq_before = fx.records.lock().sequence();
        fx.clock.advance(1);
        let outcome = fx.combiner.capture().unwrap();

        let store = fx.records.lock();
        assert_eq!(store.sequence(), seq_before + 1);
        for i in 0..RECORD_CACHE_SLOTS {
            if i == outcome.slot {
                assert_eq!(store.cache.get(i), Some(&outcome.record));
            } else {
                assert_eq!(store.cache.get(i), before[i].as_ref());
            }
        }
    }

    #[test]
    fn capture_with_empty_token_cache_resolves_without_hanging() {
        let mut fx = fixture(MemoryLog::new(), 1);
        fx.fast.publish("123456789012".parse::<FastValue>().unwrap());

        assert!(matches!(
            fx.combiner.capture(),
            Err(Error::CaptureUnavailable)
        ));
        drop(fx.combiner);
        let store = Arc::try_unwrap(fx.records).unwrap().into_inner();
        assert_eq!(store.sequence(), 0);
        assert!(store.into_log().lines().is_empty());
    }

    #[test]
    fn capture_before_first_fast_tick_is_unavailable() {
        let mut fx = fixture(MemoryLog::new(), 1);
        fx.tokens.lock().insert_at(0, token("aaaaaaa", 1));
        assert!(matches!(
            fx.combiner.capture(),
            Err(Error::CaptureUnavailable)
        ));
    }

    #[test]
    fn log_lines_carry_monotonic_sequence_numbers() {
        let mut fx = fixture(MemoryLog::new(), 9);
        fx.tokens.lock().insert_at(3, token("zzzzzzz", 5));
        fx.fast.publish("999999999999".parse::<FastValue>().unwrap());

        for _ in 0..5 {
            fx.combiner.capture().unwrap();
        }

        drop(fx.combiner);
        let store = Arc::try_unwrap(fx.records).unwrap().into_inner();
        let log = store.into_log();
        assert_eq!(log.lines().len(), 5);
        for (i, line) in log.lines().iter().enumerate() {
            assert!(line.starts_with(&format!("Line {i}:")), "bad line: {line}");
        }
    }

    #[test]
    fn failed_append_keeps_cache_write_but_not_the_sequence() {
        let mut fx = fixture(FailingLog, 12);
        fx.tokens.lock().insert_at(1, token("bbbbbbb", 2));
        fx.fast.publish("222222222222".parse::<FastValue>().unwrap());

        let outcome = fx.combiner.capture().unwrap();
        assert_eq!(outcome.sequence, None);

        let store = fx.records.lock();
        assert_eq!(store.sequence(), 0, "sequence advanced on failed append");
        assert_eq!(store.cache.get(outcome.slot), Some(&outcome.record));
    }

    #[test]
    fn record_copies_the_token_rather_than_referencing_the_slot() {
        let mut fx = fixture(MemoryLog::new(), 3);
        fx.tokens.lock().insert_at(4, token("old1234", 8));
        fx.fast.publish("333333333333".parse::<FastValue>().unwrap());

        let outcome = fx.combiner.capture().unwrap();
        // Overwrite the source slot; the stored record must not change.
        fx.tokens.lock().insert_at(4, token("new5678", 9));

        let store = fx.records.lock();
        assert_eq!(
            store.cache.get(outcome.slot).unwrap().token,
            token("old1234", 8)
        );
    }
}
