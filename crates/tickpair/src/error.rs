//! Error types for the capture pipeline.
//!
//! This module defines the central `Error` enum, which captures every
//! recoverable and reportable error case within the pipeline.
//!
//! ## Error Cases
//! - `CaptureUnavailable`: A capture trigger fired before any slow-token
//!   slot was ever populated.
//! - `MalformedQuery`: Operator input could not be parsed into a 12-digit
//!   value.
//! - `ChannelClosed`: An internal communication failure between tasks
//!   (e.g., the paused producer went away).
//! - `TriggerInput`: The trigger source failed to deliver the operator's
//!   query (distinct from *malformed* input, which is recovered locally).
//!
//! A generated fast value outside the 12-digit range is *not* represented
//! here: that is a programming-contract violation and halts the producer
//! task via `assert!` instead of surfacing as a recoverable error.

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the capture pipeline.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The slow-token cache has no occupied slot, so there is nothing to
    /// pair a capture with.
    #[error("capture unavailable: no slow token has been generated yet")]
    CaptureUnavailable,

    /// The operator-supplied lookup value was not a 12-digit number.
    #[error("malformed query: {input:?}")]
    MalformedQuery { input: String },

    /// Internal channel send/receive failure (e.g., closed channel).
    #[error("channel closed: {context}")]
    ChannelClosed { context: String },

    /// The trigger source failed while supplying the lookup query.
    #[error("trigger input failed: {0}")]
    TriggerInput(#[from] std::io::Error),
}
