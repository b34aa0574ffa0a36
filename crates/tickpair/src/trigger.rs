use std::io;

/// A discrete external event, asynchronous with respect to both
/// producers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// Combine the current fast value with one slow token and make the
    /// pairing durable.
    Capture,
    /// Pause the fast producer and query the record cache by exact value.
    Lookup,
}

/// Delivers trigger events and, on demand, the operator's lookup query.
///
/// The dispatch loop blocks on [`next_trigger`]; delivery is event-driven
/// rather than polled, so dispatch latency does not depend on a polling
/// cadence. For a lookup, the query value is requested separately via
/// [`query_value`] — only *after* the fast producer's suspension has
/// taken effect.
///
/// The CLI implements this over stdin; tests script it.
///
/// [`next_trigger`]: TriggerSource::next_trigger
/// [`query_value`]: TriggerSource::query_value
pub trait TriggerSource {
    /// Waits for the next trigger. `None` means the source is exhausted
    /// (e.g., stdin closed) and the dispatch loop should exit.
    fn next_trigger(&mut self) -> impl Future<Output = Option<Trigger>> + Send;

    /// Obtains the raw 12-digit query string from the operator.
    fn query_value(&mut self) -> impl Future<Output = io::Result<String>> + Send;
}
