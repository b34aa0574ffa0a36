use crate::{
    DurableLog, FastValue, PauseHandle, RecordStore, Result, SlowToken, TriggerSource,
};
use core::fmt;
use parking_lot::Mutex;
use std::sync::Arc;

/// Result of one lookup trigger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LookupOutcome {
    /// A record matched: the paired token and its generation timestamp.
    Found { token: SlowToken, value: FastValue },
    /// No occupied slot matched; carries the queried input (malformed
    /// input lands here too, after a best-effort parse).
    NotFound { query: String },
}

impl fmt::Display for LookupOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found { token, value } => {
                write!(f, "found {value}: token {} time {}", token.token, token.generated_at)
            }
            Self::NotFound { query } => write!(f, "value {} not found", query.trim()),
        }
    }
}

/// The lookup path: pauses the fast producer, queries the record cache by
/// exact value, and resumes the producer.
///
/// The resume is unconditional — exactly once per trigger, on every path,
/// including malformed input and input I/O failure.
#[derive(Debug)]
pub struct LookupCoordinator<L> {
    records: Arc<Mutex<RecordStore<L>>>,
    pause: PauseHandle,
}

impl<L: DurableLog> LookupCoordinator<L> {
    pub fn new(records: Arc<Mutex<RecordStore<L>>>, pause: PauseHandle) -> Self {
        Self { records, pause }
    }

    /// Executes one lookup trigger.
    ///
    /// 1. Suspends the fast producer and waits for the suspension to take
    ///    effect.
    /// 2. Obtains the query from `source` and best-effort parses it.
    /// 3. Scans every record-cache slot in slot-index order; the first
    ///    exact match on the captured value wins (duplicates are not
    ///    deduplicated).
    /// 4. Resumes the producer.
    ///
    /// # Errors
    ///
    /// Returns an error if the producer channel is gone or the query
    /// input itself failed with an I/O error. Malformed (non-12-digit)
    /// input is not an error: it resolves to
    /// [`LookupOutcome::NotFound`].
    pub async fn lookup<S: TriggerSource>(&mut self, source: &mut S) -> Result<LookupOutcome> {
        self.pause.suspend().await?;
        let outcome = self.query_and_scan(source).await;
        // Resume before propagating any failure from the query step.
        let resumed = self.pause.resume();
        let outcome = outcome?;
        resumed?;
        tracing::debug!(%outcome, "lookup finished");
        Ok(outcome)
    }

    async fn query_and_scan<S: TriggerSource>(&self, source: &mut S) -> Result<LookupOutcome> {
        let raw = source.query_value().await?;
        let query = match raw.parse::<FastValue>() {
            Ok(query) => query,
            Err(_) => {
                // Treated as "not found", per the recovery contract.
                return Ok(LookupOutcome::NotFound { query: raw });
            }
        };
        Ok(self.find(query))
    }

    /// Scans all occupied slots for an exact match on the captured value.
    ///
    /// The scan covers the full declared capacity, so a record in the
    /// last slot is just as reachable as one in the first.
    pub fn find(&self, query: FastValue) -> LookupOutcome {
        let store = self.records.lock();
        match store
            .cache
            .iter()
            .find(|(_, record)| record.capture.value == query)
        {
            Some((_, record)) => LookupOutcome::Found {
                token: record.token.clone(),
                value: query,
            },
            None => LookupOutcome::NotFound {
                query: query.to_string(),
            },
        }
    }
}
