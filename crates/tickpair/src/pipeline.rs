use crate::{
    CaptureOutcome, DurableLog, Error, FastValue, FastValueCell, FastValueProducer,
    LookupCoordinator, LookupOutcome, MonotonicClock, RandSource, RecordCombiner, RecordStore,
    SeededRandom, SlowTokenCache, SlowTokenProducer, ThreadRandom, Trigger, TriggerSource,
    pause_channel,
};
use core::{fmt, time::Duration};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

/// Default fast-producer period.
pub const DEFAULT_FAST_PERIOD: Duration = Duration::from_millis(250);
/// Default slow-producer period.
pub const DEFAULT_SLOW_PERIOD: Duration = Duration::from_secs(5);

/// Everything the pipeline makes observable, in emission order.
#[derive(Debug)]
pub enum OutputEvent {
    /// The fast producer published a fresh value (once per tick).
    FastValue(FastValue),
    /// A capture trigger completed.
    Captured(CaptureOutcome),
    /// A capture trigger fired before any slow token existed.
    CaptureUnavailable,
    /// A lookup trigger completed.
    Lookup(LookupOutcome),
}

impl fmt::Display for OutputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FastValue(value) => write!(f, "fast value: {value}"),
            Self::Captured(outcome) => {
                write!(f, "captured: {} (slot {}", outcome.record, outcome.slot)?;
                match outcome.sequence {
                    Some(seq) => write!(f, ", line {seq})"),
                    None => write!(f, ", not logged)"),
                }
            }
            Self::CaptureUnavailable => write!(f, "capture unavailable: no slow token yet"),
            Self::Lookup(outcome) => write!(f, "{outcome}"),
        }
    }
}

/// Tunables for a pipeline run.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Fast-producer tick period.
    pub fast_period: Duration,
    /// Slow-producer tick period.
    pub slow_period: Duration,
    /// Fixed seed for reproducible runs; `None` uses the thread-local
    /// RNG.
    pub seed: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fast_period: DEFAULT_FAST_PERIOD,
            slow_period: DEFAULT_SLOW_PERIOD,
            seed: None,
        }
    }
}

impl PipelineConfig {
    /// Builds the random source for one of the pipeline's independent
    /// draw streams. Seeded runs derive a distinct seed per stream so the
    /// tasks do not mirror each other's draws.
    fn rand_for(&self, stream: u64) -> PipelineRandom {
        match self.seed {
            Some(seed) => PipelineRandom::Seeded(SeededRandom::from_seed(seed.wrapping_add(stream))),
            None => PipelineRandom::Thread(ThreadRandom),
        }
    }
}

/// A [`RandSource`] chosen at runtime: thread-local by default, seeded
/// when reproducibility is requested.
#[derive(Clone, Debug)]
pub enum PipelineRandom {
    Thread(ThreadRandom),
    Seeded(SeededRandom),
}

impl RandSource for PipelineRandom {
    fn uniform(&mut self, bound: u64) -> u64 {
        match self {
            Self::Thread(rand) => rand.uniform(bound),
            Self::Seeded(rand) => rand.uniform(bound),
        }
    }

    fn wide_bits(&mut self) -> u32 {
        match self {
            Self::Thread(rand) => rand.wide_bits(),
            Self::Seeded(rand) => rand.wide_bits(),
        }
    }

    fn alphanumeric(&mut self, len: usize) -> String {
        match self {
            Self::Thread(rand) => rand.alphanumeric(len),
            Self::Seeded(rand) => rand.alphanumeric(len),
        }
    }
}

/// A running pipeline: the two producers plus the trigger-dispatch task,
/// wired over shared state, with an output stream and a graceful
/// shutdown handle.
pub struct Pipeline {
    output: mpsc::UnboundedReceiver<OutputEvent>,
    shutdown: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl Pipeline {
    /// Builds the shared state and spawns the pipeline tasks onto the
    /// current tokio runtime.
    ///
    /// All timestamps come from one [`MonotonicClock`] constructed here,
    /// so token generation times and capture times are comparable.
    pub fn spawn<S, L>(config: PipelineConfig, source: S, log: L) -> Self
    where
        S: TriggerSource + Send + 'static,
        L: DurableLog + Send + 'static,
    {
        let clock = MonotonicClock::default();
        let fast = Arc::new(FastValueCell::default());
        let tokens = Arc::new(Mutex::new(SlowTokenCache::new()));
        let records = Arc::new(Mutex::new(RecordStore::new(log)));
        let (output_tx, output_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let (pause_handle, pause_gate) = pause_channel();

        let fast_producer = FastValueProducer::new(
            Arc::clone(&fast),
            config.rand_for(0),
            config.fast_period,
            pause_gate,
            output_tx.clone(),
            shutdown.clone(),
        );
        let slow_producer = SlowTokenProducer::new(
            Arc::clone(&tokens),
            clock.clone(),
            config.rand_for(1),
            config.slow_period,
            shutdown.clone(),
        );
        let combiner = RecordCombiner::new(
            fast,
            tokens,
            Arc::clone(&records),
            clock,
            config.rand_for(2),
        );
        let lookup = LookupCoordinator::new(records, pause_handle);

        let tasks = vec![
            tokio::spawn(fast_producer.run()),
            tokio::spawn(slow_producer.run()),
            tokio::spawn(dispatch_loop(
                source,
                combiner,
                lookup,
                output_tx,
                shutdown.clone(),
            )),
        ];

        Self {
            output: output_rx,
            shutdown,
            tasks,
        }
    }

    /// Receives the next observable event. `None` once the pipeline has
    /// shut down and the stream has drained.
    pub async fn next_event(&mut self) -> Option<OutputEvent> {
        self.output.recv().await
    }

    /// Cancels all pipeline tasks and waits for them to finish.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

/// Serializes trigger handling: receives events from the source and runs
/// the capture or lookup path to completion before taking the next one.
///
/// Because captures are executed one at a time on this task, the
/// five-step capture sequence is observably atomic with respect to other
/// captures.
pub async fn dispatch_loop<S, T, R, L>(
    mut source: S,
    mut combiner: RecordCombiner<T, R, L>,
    mut lookup: LookupCoordinator<L>,
    output: mpsc::UnboundedSender<OutputEvent>,
    shutdown: CancellationToken,
) where
    S: TriggerSource,
    T: crate::TimeSource<u64>,
    R: RandSource,
    L: DurableLog,
{
    loop {
        let trigger = tokio::select! {
            () = shutdown.cancelled() => break,
            trigger = source.next_trigger() => match trigger {
                Some(trigger) => trigger,
                None => break,
            },
        };

        match trigger {
            Trigger::Capture => match combiner.capture() {
                Ok(outcome) => {
                    let _ = output.send(OutputEvent::Captured(outcome));
                }
                Err(Error::CaptureUnavailable) => {
                    let _ = output.send(OutputEvent::CaptureUnavailable);
                }
                Err(err) => tracing::error!(%err, "capture failed"),
            },
            Trigger::Lookup => match lookup.lookup(&mut source).await {
                Ok(outcome) => {
                    let _ = output.send(OutputEvent::Lookup(outcome));
                }
                Err(err) => tracing::error!(%err, "lookup failed"),
            },
        }
    }
    tracing::trace!("trigger dispatch stopped");
}
