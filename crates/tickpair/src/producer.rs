use crate::{
    FastValue, FastValueCell, OutputEvent, PauseGate, RandSource, SlowToken, SlowTokenCache,
    TimeSource,
};
use core::time::Duration;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::{
    sync::mpsc,
    time::{MissedTickBehavior, interval},
};
use tokio_util::sync::CancellationToken;

/// The high-frequency producer task.
///
/// Every tick of its fixed period while `Running`, it draws a fresh
/// 12-digit value, publishes it atomically to the shared
/// [`FastValueCell`], and emits it on the observable output stream. The
/// loop never terminates on its own; the only state transitions are the
/// cooperative suspend/resume driven through its [`PauseGate`], plus
/// process shutdown via the cancellation token.
///
/// Missed ticks are skipped rather than bursted, so resuming after a
/// pause continues on the next tick boundary instead of replaying the
/// paused interval.
#[derive(Debug)]
pub struct FastValueProducer<R> {
    cell: Arc<FastValueCell>,
    rand: R,
    period: Duration,
    gate: PauseGate,
    output: mpsc::UnboundedSender<OutputEvent>,
    shutdown: CancellationToken,
}

impl<R: RandSource> FastValueProducer<R> {
    pub fn new(
        cell: Arc<FastValueCell>,
        rand: R,
        period: Duration,
        gate: PauseGate,
        output: mpsc::UnboundedSender<OutputEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            cell,
            rand,
            period,
            gate,
            output,
            shutdown,
        }
    }

    /// Runs the tick loop until the shutdown token fires.
    pub async fn run(mut self) {
        tracing::trace!(period_ms = self.period.as_millis() as u64, "fast producer started");
        let mut ticks = interval(self.period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                () = self.shutdown.cancelled() => break,
                _ = ticks.tick() => {}
            }

            // The pause command is observed at the tick boundary only;
            // once acknowledged, nothing is published until resume.
            if self.gate.pause_requested() {
                tracing::debug!("fast producer suspended");
                tokio::select! {
                    () = self.shutdown.cancelled() => break,
                    () = self.gate.suspended() => {
                        tracing::debug!("fast producer resumed");
                        continue;
                    }
                }
            }

            let value = FastValue::generate(&mut self.rand);
            self.cell.publish(value);
            // The capture path reads the cell, not the stream, so a gone
            // stream consumer does not stop publication.
            let _ = self.output.send(OutputEvent::FastValue(value));
        }

        tracing::trace!("fast producer stopped");
    }
}

/// The low-frequency producer task.
///
/// Every tick of its fixed (longer) period, it generates a fresh
/// 7-character alphanumeric token, stamps it with the current time, and
/// overwrites a uniformly random slot of the 5-slot token cache —
/// occupied or not. Whatever was in the slot is lost with no
/// notification. This producer has no suspend capability.
#[derive(Debug)]
pub struct SlowTokenProducer<T, R> {
    tokens: Arc<Mutex<SlowTokenCache>>,
    clock: T,
    rand: R,
    period: Duration,
    shutdown: CancellationToken,
}

impl<T, R> SlowTokenProducer<T, R>
where
    T: TimeSource<u64>,
    R: RandSource,
{
    pub fn new(
        tokens: Arc<Mutex<SlowTokenCache>>,
        clock: T,
        rand: R,
        period: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            tokens,
            clock,
            rand,
            period,
            shutdown,
        }
    }

    /// Runs the tick loop until the shutdown token fires.
    pub async fn run(mut self) {
        tracing::trace!(period_ms = self.period.as_millis() as u64, "slow producer started");
        let mut ticks = interval(self.period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                () = self.shutdown.cancelled() => break,
                _ = ticks.tick() => {}
            }
            self.refresh_slot();
        }

        tracing::trace!("slow producer stopped");
    }

    /// One producer cycle: generate a token and overwrite a random slot.
    ///
    /// Returns the slot index that was written. The overwrite is a single
    /// critical section, so the combiner never observes a half-updated
    /// slot (token without its timestamp).
    pub fn refresh_slot(&mut self) -> usize {
        let token = SlowToken::generate(&mut self.rand, &self.clock);
        let mut tokens = self.tokens.lock();
        let slot = tokens.insert_random(&mut self.rand, token);

        if tracing::enabled!(tracing::Level::DEBUG) {
            for (i, t) in tokens.iter() {
                tracing::debug!(slot = i, token = %t, "slow cache slot");
            }
        }
        slot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ManualClock, SLOW_CACHE_SLOTS, SLOW_TOKEN_LEN, SeededRandom, pause_channel};

    fn slow_producer(
        tokens: Arc<Mutex<SlowTokenCache>>,
        seed: u64,
    ) -> SlowTokenProducer<ManualClock, SeededRandom> {
        SlowTokenProducer::new(
            tokens,
            ManualClock::at(10),
            SeededRandom::from_seed(seed),
            Duration::from_secs(5),
            CancellationToken::new(),
        )
    }

    #[test]
    fn refresh_changes_exactly_one_slot() {
        let tokens = Arc::new(Mutex::new(SlowTokenCache::new()));
        let mut producer = slow_producer(Arc::clone(&tokens), 17);

        // Warm the cache so overwrites of occupied slots are exercised.
        for _ in 0..10 {
            producer.refresh_slot();
        }

        let before: Vec<_> = {
            let cache = tokens.lock();
            (0..SLOW_CACHE_SLOTS).map(|i| cache.get(i).cloned()).collect()
        };
        let slot = producer.refresh_slot();
        let cache = tokens.lock();
        for i in 0..SLOW_CACHE_SLOTS {
            if i == slot {
                assert_ne!(cache.get(i), before[i].as_ref());
            } else {
                assert_eq!(cache.get(i), before[i].as_ref());
            }
        }
    }

    #[test]
    fn tokens_are_fixed_length_and_stamped() {
        let tokens = Arc::new(Mutex::new(SlowTokenCache::new()));
        let mut producer = slow_producer(Arc::clone(&tokens), 4);
        producer.clock.set(77);
        let slot = producer.refresh_slot();

        let cache = tokens.lock();
        let stored = cache.get(slot).unwrap();
        assert_eq!(stored.token.len(), SLOW_TOKEN_LEN);
        assert!(stored.token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(stored.generated_at, 77);
    }

    #[tokio::test(start_paused = true)]
    async fn fast_producer_publishes_and_emits_each_tick() {
        let cell = Arc::new(FastValueCell::default());
        let (_handle, gate) = pause_channel();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let producer = FastValueProducer::new(
            Arc::clone(&cell),
            SeededRandom::from_seed(8),
            Duration::from_millis(250),
            gate,
            tx,
            shutdown.clone(),
        );
        let task = tokio::spawn(producer.run());

        let mut emitted = Vec::new();
        for _ in 0..4 {
            match rx.recv().await.unwrap() {
                OutputEvent::FastValue(v) => emitted.push(v),
                other => panic!("unexpected event: {other:?}"),
            }
        }
        // The cell holds the most recently emitted value.
        assert_eq!(cell.snapshot(), Some(*emitted.last().unwrap()));

        shutdown.cancel();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stream_halts_strictly_between_suspend_and_resume() {
        let cell = Arc::new(FastValueCell::default());
        let (mut handle, gate) = pause_channel();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let producer = FastValueProducer::new(
            Arc::clone(&cell),
            SeededRandom::from_seed(8),
            Duration::from_millis(250),
            gate,
            tx,
            shutdown.clone(),
        );
        let task = tokio::spawn(producer.run());

        // Let a few ticks through, then suspend and wait for the ack.
        let _ = rx.recv().await.unwrap();
        let _ = rx.recv().await.unwrap();
        handle.suspend().await.unwrap();

        // Drain anything emitted before the suspend took effect, then
        // confirm the stream stays silent while suspended.
        while rx.try_recv().is_ok() {}
        let paused_at = cell.snapshot();
        tokio::time::advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err(), "value emitted while suspended");
        assert_eq!(cell.snapshot(), paused_at, "cell advanced while suspended");

        // Resume: emission continues on the next tick boundary.
        handle.resume().unwrap();
        assert!(matches!(
            rx.recv().await.unwrap(),
            OutputEvent::FastValue(_)
        ));

        shutdown.cancel();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_terminates_a_suspended_producer() {
        let cell = Arc::new(FastValueCell::default());
        let (mut handle, gate) = pause_channel();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let producer = FastValueProducer::new(
            cell,
            SeededRandom::from_seed(8),
            Duration::from_millis(250),
            gate,
            tx,
            shutdown.clone(),
        );
        let task = tokio::spawn(producer.run());

        let _ = rx.recv().await.unwrap();
        handle.suspend().await.unwrap();
        shutdown.cancel();
        task.await.unwrap();
    }
}
